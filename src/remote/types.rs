//! Outbound call types and error definitions.

use axum::body::Body;
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use std::time::Duration;
use thiserror::Error;

/// Cookie carrying the session credential on authenticated calls.
pub const AUTH_COOKIE: &str = "tiddlyweb_user";

/// Upper bound on the initial buffer for counted reads.
const MAX_PREALLOCATE: usize = 64 * 1024;

/// Errors that can occur during an outbound call.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The origin answered with a client or server error.
    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },

    /// Connection, timeout or protocol failure.
    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The origin did not answer within the configured limit.
    #[error("Origin did not respond within {}s", .0.as_secs())]
    Timeout(Duration),

    /// The composed upstream URI could not be parsed.
    #[error("Invalid upstream URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    /// The inbound body could not be read for forwarding.
    #[error("Failed to read request body: {0}")]
    Body(#[from] axum::Error),
}

impl RemoteError {
    /// Status code to render this failure with.
    pub fn status(&self) -> StatusCode {
        match self {
            RemoteError::Status { status, .. } => *status,
            RemoteError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RemoteError::Transport(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            RemoteError::Transport(_) | RemoteError::InvalidUri { .. } => StatusCode::BAD_GATEWAY,
            RemoteError::Body(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == StatusCode::NOT_FOUND
    }
}

/// Body of an outbound call. Exactly one source is ever sent.
#[derive(Debug, Default)]
pub enum OutboundBody {
    #[default]
    Empty,
    /// Content already in memory (e.g., a local file being pushed).
    Content(Bytes),
    /// At most `count` bytes read from an inbound stream.
    Counted { source: Body, count: u64 },
    /// Fields sent as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
}

/// Read at most `count` bytes from `source`.
///
/// A body shorter than `count` yields what was available; bytes beyond
/// `count` are left unread.
pub async fn read_counted(source: Body, count: u64) -> Result<Bytes, axum::Error> {
    let count = usize::try_from(count).unwrap_or(usize::MAX);
    let mut buf = BytesMut::with_capacity(count.min(MAX_PREALLOCATE));
    let mut stream = source.into_data_stream();
    while buf.len() < count {
        let Some(chunk) = stream.next().await else {
            break;
        };
        let chunk = chunk?;
        let take = (count - buf.len()).min(chunk.len());
        buf.extend_from_slice(&chunk[..take]);
    }
    Ok(buf.freeze())
}
