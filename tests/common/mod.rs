//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use space_proxy::auth::Authenticator;
use space_proxy::config::{ConfigPatch, ConfigStore, MemoryConfigStore};
use space_proxy::http::{AppState, HttpServer};
use space_proxy::lifecycle::Shutdown;
use space_proxy::remote::RemoteClient;

/// A request as the mock origin saw it on the wire.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    /// Raw request target, escapes intact.
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

#[allow(dead_code)]
impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Canned reply from the mock origin.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    /// Pause before the status line.
    pub head_delay: Option<Duration>,
    /// Pause between the headers and the body.
    pub body_delay: Option<Duration>,
}

#[allow(dead_code)]
impl MockResponse {
    pub fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.to_string(),
            head_delay: None,
            body_delay: None,
        }
    }

    pub fn delay_head(mut self, delay: Duration) -> Self {
        self.head_delay = Some(delay);
        self
    }

    pub fn delay_body(mut self, delay: Duration) -> Self {
        self.body_delay = Some(delay);
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Raw-TCP origin that records every request and answers via `responder`.
pub struct MockOrigin {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

#[allow(dead_code)]
impl MockOrigin {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&Recorded) -> MockResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let responder = Arc::new(responder);

        let recorded = requests.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let recorded = recorded.clone();
                let responder = responder.clone();
                tokio::spawn(async move {
                    let (read, mut write) = socket.into_split();
                    let Some(request) = read_request(BufReader::new(read)).await else {
                        return;
                    };
                    let reply = responder(&request);
                    recorded.lock().unwrap().push(request);

                    let mut head = format!("HTTP/1.1 {} Mock\r\n", reply.status);
                    for (name, value) in &reply.headers {
                        head.push_str(&format!("{name}: {value}\r\n"));
                    }
                    head.push_str(&format!(
                        "Content-Length: {}\r\nConnection: close\r\n\r\n",
                        reply.body.len()
                    ));
                    if let Some(delay) = reply.head_delay {
                        tokio::time::sleep(delay).await;
                    }
                    let _ = write.write_all(head.as_bytes()).await;
                    let _ = write.flush().await;
                    if let Some(delay) = reply.body_delay {
                        tokio::time::sleep(delay).await;
                    }
                    let _ = write.write_all(reply.body.as_bytes()).await;
                    let _ = write.shutdown().await;
                });
            }
        });

        Self { addr, requests }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request<R: tokio::io::AsyncRead + Unpin>(mut reader: BufReader<R>) -> Option<Recorded> {
    let mut line = String::new();
    reader.read_line(&mut line).await.ok()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await.ok()? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    reader.read_exact(&mut body).await.ok()?;

    Some(Recorded {
        method,
        target,
        headers,
        body,
    })
}

/// In-memory config pointing at `origin`.
#[allow(dead_code)]
pub fn store_for(origin: &MockOrigin, token: Option<&str>) -> Arc<MemoryConfigStore> {
    let patch = ConfigPatch {
        target_server: Some(origin.url()),
        auth_token: token.map(str::to_string),
        ..ConfigPatch::default()
    };
    Arc::new(MemoryConfigStore::new(&patch).unwrap())
}

/// A running proxy on an ephemeral port.
#[allow(dead_code)]
pub struct TestProxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestProxy {
    pub async fn start(
        store: Arc<dyn ConfigStore>,
        authenticator: Arc<dyn Authenticator>,
        app_root: &Path,
    ) -> Self {
        let state = AppState::new(store, authenticator, RemoteClient::new().unwrap(), app_root);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Shutdown::new();
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = HttpServer::new(state).run(listener, server_shutdown).await;
        });
        Self { addr, shutdown }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Client that neither follows redirects nor uses a system proxy.
#[allow(dead_code)]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
