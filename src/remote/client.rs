//! Outbound HTTP client for the remote origin.
//!
//! # Responsibilities
//! - Issue exactly one call per invocation with an explicit method
//! - Attach the session credential cookie when a token is supplied
//! - Turn 4xx/5xx responses into a typed `RemoteError`
//!
//! # Design Decisions
//! - Redirects are never followed; callers observe the raw 3xx response
//! - No retries: a failed call is reported, not repeated
//! - Per-call timeout bounds the wait for response headers only, so a
//!   healthy body can stream for as long as it takes

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method};
use std::time::Duration;

use crate::remote::types::{read_counted, OutboundBody, RemoteError, AUTH_COOKIE};

/// A single outbound call.
#[derive(Debug)]
pub struct RemoteCall {
    method: Method,
    uri: String,
    auth_token: Option<String>,
    content_type: Option<String>,
    headers: HeaderMap,
    timeout: Option<Duration>,
    body: OutboundBody,
}

impl RemoteCall {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            auth_token: None,
            content_type: None,
            headers: HeaderMap::new(),
            timeout: None,
            body: OutboundBody::Empty,
        }
    }

    /// Send the credential cookie, if a token is present.
    pub fn credential(mut self, token: Option<&str>) -> Self {
        self.auth_token = token.map(str::to_owned);
        self
    }

    /// Content type of the body. Ignored for DELETE.
    pub fn content_type(mut self, content_type: Option<&str>) -> Self {
        self.content_type = content_type.map(str::to_owned);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn body(mut self, body: OutboundBody) -> Self {
        self.body = body;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

async fn within<F: std::future::Future>(limit: Option<Duration>, fut: F) -> Result<F::Output, RemoteError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| RemoteError::Timeout(limit)),
        None => Ok(fut.await),
    }
}

/// Client for calls to the configured origin.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
}

impl RemoteClient {
    /// Create a client that never follows redirects.
    pub fn new() -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { http })
    }

    /// Perform `call` and return the response if its status is below 400.
    pub async fn send(&self, call: RemoteCall) -> Result<reqwest::Response, RemoteError> {
        let RemoteCall {
            method,
            uri,
            auth_token,
            content_type,
            headers,
            timeout,
            body,
        } = call;

        let url = reqwest::Url::parse(&uri).map_err(|e| RemoteError::InvalidUri {
            uri: uri.clone(),
            reason: e.to_string(),
        })?;

        let mut request = self.http.request(method.clone(), url).headers(headers);
        if let Some(token) = auth_token.as_deref() {
            request = request.header(header::COOKIE, format!("{AUTH_COOKIE}={token}"));
        }
        if method != Method::DELETE {
            if let Some(content_type) = content_type.as_deref() {
                request = request.header(header::CONTENT_TYPE, content_type);
            }
        }
        request = match body {
            OutboundBody::Empty => request,
            OutboundBody::Content(bytes) => request.body(bytes),
            OutboundBody::Counted { source, count } => request.body(read_counted(source, count).await?),
            OutboundBody::Form(fields) => request.form(&fields),
        };

        tracing::debug!(method = %method, upstream = %uri, "Calling origin");
        let response = within(timeout, request.send()).await??;
        let status = response.status();

        if status.is_client_error() || status.is_server_error() {
            let text = within(timeout, response.text()).await?.unwrap_or_default();
            let message = if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("error").to_string()
            } else {
                text
            };
            tracing::warn!(method = %method, upstream = %uri, status = %status, "Origin returned an error");
            return Err(RemoteError::Status { status, message });
        }

        Ok(response)
    }
}
