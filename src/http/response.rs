//! Response construction.
//!
//! # Responsibilities
//! - Relay origin responses (status, selected headers, streamed body)
//! - Render origin failures with their exact status and message
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Only end-to-end headers the app depends on are relayed

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::remote::RemoteError;

/// Origin response headers passed back to the browser.
fn relayed_names() -> [HeaderName; 5] {
    [
        header::CONTENT_TYPE,
        header::ETAG,
        header::LOCATION,
        header::LAST_MODIFIED,
        header::CACHE_CONTROL,
    ]
}

pub fn relay_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in relayed_names() {
        if let Some(value) = upstream.get(&name) {
            headers.insert(name, value.clone());
        }
    }
    headers
}

/// Stream an origin response back unchanged in status.
pub fn relay(response: reqwest::Response) -> Response {
    let status = response.status();
    let headers = relay_headers(response.headers());
    (status, headers, Body::from_stream(response.bytes_stream())).into_response()
}

/// Render a failed origin call.
pub fn error_response(err: &RemoteError) -> Response {
    (err.status(), err.to_string()).into_response()
}

pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_relay_headers_filters() {
        let mut upstream = HeaderMap::new();
        upstream.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        upstream.insert(header::ETAG, HeaderValue::from_static("\"foo/bar/1:abc\""));
        upstream.insert(header::SET_COOKIE, HeaderValue::from_static("tiddlyweb_user=x"));
        upstream.insert(header::CONNECTION, HeaderValue::from_static("close"));

        let relayed = relay_headers(&upstream);
        assert_eq!(relayed.len(), 2);
        assert_eq!(relayed[header::ETAG], "\"foo/bar/1:abc\"");
        assert!(relayed.get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_error_response_keeps_status_and_message() {
        let err = RemoteError::Status {
            status: StatusCode::FORBIDDEN,
            message: "permission denied".into(),
        };
        let response = error_response(&err);
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"403 Forbidden: permission denied");
    }
}
