//! Content source selection for read requests.
//!
//! # Responsibilities
//! - Map a read path to an ordered list of candidate sources
//! - Open the first local candidate that exists
//! - Fall back to the origin with the path re-encoded
//!
//! # Design Decisions
//! - Local sources always precede the origin; a local miss is never surfaced
//! - Exactly one source is opened and its stream is returned unconsumed
//! - Origin errors are returned as-is, never retried

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::config::SpaceConfig;
use crate::http::request::{InboundRequest, X_CONTROL_VIEW};
use crate::http::response::relay_headers;
use crate::remote::{RemoteCall, RemoteClient, RemoteError};
use crate::routing::codec::encode_path;
use crate::routing::content_type;

/// Directory, relative to the app root, holding local document overrides.
pub const ASSETS_DIR: &str = "assets";

/// Segment count of a canonical document address (`bags/<bag>/tiddlers/<title>`).
pub const DOCUMENT_SEGMENTS: usize = 4;

/// Where the content for a read request comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// A file relative to the app root.
    LocalFile(PathBuf),
    /// A file in the override directory.
    OverrideFile(PathBuf),
    /// The origin, at this encoded path (query included).
    Remote(String),
}

/// An opened source, ready to stream.
#[derive(Debug)]
pub struct ResolvedContent {
    pub decision: RouteDecision,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

impl IntoResponse for ResolvedContent {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}

/// Chooses between the app directory, its overrides and the origin.
#[derive(Debug, Clone)]
pub struct RouteResolver {
    app_root: PathBuf,
    override_dir: PathBuf,
}

impl RouteResolver {
    pub fn new(app_root: impl Into<PathBuf>) -> Self {
        let app_root = app_root.into();
        let override_dir = app_root.join(ASSETS_DIR);
        Self {
            app_root,
            override_dir,
        }
    }

    pub fn app_root(&self) -> &Path {
        &self.app_root
    }

    pub fn override_dir(&self) -> &Path {
        &self.override_dir
    }

    /// Local candidates for a decoded path, in the order they are tried.
    pub fn local_candidates(&self, path: &str, config: &SpaceConfig) -> Vec<RouteDecision> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let segments: Vec<&str> = trimmed.split('/').collect();

        match segments.as_slice() {
            [name] => vec![
                RouteDecision::LocalFile(self.app_root.join(name)),
                RouteDecision::OverrideFile(self.override_dir.join(name)),
            ],
            [first, .., last]
                if segments.len() == DOCUMENT_SEGMENTS || config.prefix() == Some(*first) =>
            {
                vec![RouteDecision::OverrideFile(self.override_dir.join(last))]
            }
            _ => Vec::new(),
        }
    }

    /// Origin fallback for a decoded path.
    pub fn remote_decision(path: impl AsRef<[u8]>, query: Option<&str>, config: &SpaceConfig) -> RouteDecision {
        RouteDecision::Remote(remote_target(path.as_ref(), query, config.prefix()))
    }

    /// Every candidate in order; the origin is always last.
    pub fn candidates(&self, path: &str, query: Option<&str>, config: &SpaceConfig) -> Vec<RouteDecision> {
        let mut candidates = self.local_candidates(path, config);
        candidates.push(Self::remote_decision(path, query, config));
        candidates
    }

    /// Open the first available source for a read request.
    pub async fn resolve(
        &self,
        request: &InboundRequest,
        config: &SpaceConfig,
        client: &RemoteClient,
    ) -> Result<ResolvedContent, RemoteError> {
        for decision in self.local_candidates(&request.path, config) {
            let (RouteDecision::LocalFile(file_path) | RouteDecision::OverrideFile(file_path)) = &decision
            else {
                continue;
            };
            match open_local(file_path).await {
                Ok((file, len)) => {
                    tracing::debug!(path = %request.path, source = ?decision, "Serving local file");
                    return Ok(ResolvedContent {
                        headers: local_headers(file_path, len),
                        decision,
                        status: StatusCode::OK,
                        body: Body::from_stream(ReaderStream::new(file)),
                    });
                }
                Err(e) => {
                    tracing::trace!(file = %file_path.display(), error = %e, "Local source unavailable");
                }
            }
        }

        let target = remote_target(&request.path_bytes, request.query.as_deref(), config.prefix());
        let mut call = RemoteCall::new(Method::GET, config.upstream_uri(&target, None))
            .credential(config.auth_token.as_deref())
            .timeout(config.remote_timeout());
        if let Some(accept) = &request.accept {
            call = call.header(header::ACCEPT, accept.clone());
        }
        if request.control_view {
            call = call.header(X_CONTROL_VIEW, HeaderValue::from_static("false"));
        }

        let response = client.send(call).await?;
        tracing::debug!(path = %request.path, upstream = %target, status = %response.status(), "Serving from origin");
        Ok(ResolvedContent {
            status: response.status(),
            headers: relay_headers(response.headers()),
            decision: RouteDecision::Remote(target),
            body: Body::from_stream(response.bytes_stream()),
        })
    }
}

fn remote_target(path: &[u8], query: Option<&str>, prefix: Option<&str>) -> String {
    let mut target = encode_path(path, prefix);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(query);
    }
    target
}

async fn open_local(path: &Path) -> io::Result<(File, u64)> {
    let file = File::open(path).await?;
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"));
    }
    Ok((file, metadata.len()))
}

fn local_headers(path: &Path, len: u64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&content_type::guess_or_octet_stream(path)) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    headers
}
