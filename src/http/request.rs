//! Inbound request extraction.
//!
//! # Responsibilities
//! - Decode the request path once, the form the routing layer works on
//! - Pick out the headers the proxy acts on
//! - Decide whether the body is forwarded, never for DELETE
//!
//! # Design Decisions
//! - An unreadable Content-Length means "no body", not an error
//! - Request ID assigned as early as possible for tracing

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, Method, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::routing::codec::{decode_path, encode_path};

/// Header name for request correlation.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Origin-specific header toggling the permission-check short-circuit.
pub const X_CONTROL_VIEW: HeaderName = HeaderName::from_static("x-controlview");

/// The parts of an inbound request the proxy routes on.
#[derive(Debug)]
pub struct InboundRequest {
    pub method: Method,
    /// Path after one pass of percent-decoding, as text for local lookups.
    pub path: String,
    /// The same path as exact bytes, for re-encoding toward the origin.
    pub path_bytes: Vec<u8>,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub accept: Option<HeaderValue>,
    pub control_view: bool,
}

impl InboundRequest {
    /// Split a request into its routing view and its (unread) body.
    pub fn from_request(request: Request<Body>) -> (Self, Body) {
        let (parts, body) = request.into_parts();
        let headers = &parts.headers;

        let header_str = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };

        let path_bytes = decode_path(parts.uri.path());
        let inbound = Self {
            path: String::from_utf8_lossy(&path_bytes).into_owned(),
            path_bytes,
            query: parts.uri.query().map(str::to_owned),
            content_type: header_str(header::CONTENT_TYPE),
            content_length: header_str(header::CONTENT_LENGTH).and_then(|v| v.trim().parse().ok()),
            accept: headers.get(header::ACCEPT).cloned(),
            control_view: headers.contains_key(X_CONTROL_VIEW),
            method: parts.method,
        };
        (inbound, body)
    }

    /// A bodiless GET for `path`.
    pub fn for_read(path: &str, query: Option<&str>) -> Self {
        Self {
            method: Method::GET,
            path: path.to_owned(),
            path_bytes: path.as_bytes().to_vec(),
            query: query.map(str::to_owned),
            content_type: None,
            content_length: None,
            accept: None,
            control_view: false,
        }
    }

    /// Path re-encoded for the origin.
    pub fn wire_path(&self, prefix: Option<&str>) -> String {
        encode_path(&self.path_bytes, prefix)
    }

    /// Pair `body` with its declared length if it should be read at all.
    ///
    /// Returns `None` for DELETE and when the length is missing or unreadable.
    pub fn forwardable_body(&self, body: Body) -> Option<(Body, u64)> {
        if self.method == Method::DELETE {
            return None;
        }
        self.content_length.map(|count| (body, count))
    }
}

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}
