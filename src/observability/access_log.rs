//! Per-request access log.
//!
//! One line per request in the combined log format, emitted after the
//! response is produced. Requests pass through unchanged.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderMap, HeaderName, Request},
    middleware::Next,
    response::Response,
};
use std::fmt;
use std::net::SocketAddr;

/// Tracing target access lines are emitted on.
pub const ACCESS_TARGET: &str = "space_proxy::access";

/// Fields of one access log line.
#[derive(Debug, Clone)]
pub struct AccessRecord {
    pub remote_addr: String,
    pub time: String,
    pub method: String,
    pub uri: String,
    pub version: String,
    pub status: u16,
    pub bytes: String,
    pub referer: String,
    pub user_agent: String,
}

impl fmt::Display for AccessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - - [{}] \"{} {} {}\" {} {} \"{}\" \"{}\"",
            self.remote_addr,
            self.time,
            self.method,
            self.uri,
            self.version,
            self.status,
            self.bytes,
            self.referer,
            self.user_agent
        )
    }
}

fn header_or_dash(headers: &HeaderMap, name: HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string()
}

/// Middleware writing one access line per request.
pub async fn access_log(request: Request<Body>, next: Next) -> Response {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_string());
    let method = request.method().to_string();
    let uri = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    let version = format!("{:?}", request.version());
    let referer = header_or_dash(request.headers(), header::REFERER);
    let user_agent = header_or_dash(request.headers(), header::USER_AGENT);

    let response = next.run(request).await;

    let record = AccessRecord {
        remote_addr,
        time: chrono::Local::now().format("%d/%b/%Y:%H:%M:%S %z").to_string(),
        method,
        uri,
        version,
        status: response.status().as_u16(),
        bytes: header_or_dash(response.headers(), header::CONTENT_LENGTH),
        referer,
        user_agent,
    };
    tracing::info!(target: ACCESS_TARGET, "{record}");
    response
}
