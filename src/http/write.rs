//! Write request forwarding.
//!
//! # Responsibilities
//! - Classify a write as login, logout or a plain forward
//! - Run the credential handshake for an unauthenticated login
//! - Forward everything else to the origin with the stored credential
//!
//! # Design Decisions
//! - Login and logout never reach the origin as-is
//! - Both interceptions answer 204 whatever the prior credential state
//! - A handshake failure other than 401 is not recoverable in-process

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::auth::{parse_login_form, AuthError, CHALLENGE_PATH, LOGOUT_PATH};
use crate::config::{ConfigKey, ConfigPatch, SpaceConfig};
use crate::http::request::InboundRequest;
use crate::http::response::{error_response, no_content, relay};
use crate::http::server::AppState;
use crate::remote::{read_counted, OutboundBody, RemoteCall};

/// What a write request turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteRoute {
    LoginIntercepted,
    LogoutIntercepted,
    Forwarded,
}

impl WriteRoute {
    /// Classify by the re-encoded path.
    pub fn classify(encoded_path: &str) -> Self {
        match encoded_path {
            CHALLENGE_PATH => WriteRoute::LoginIntercepted,
            LOGOUT_PATH => WriteRoute::LogoutIntercepted,
            _ => WriteRoute::Forwarded,
        }
    }
}

/// Handshake failure that leaves the credential state unknown.
#[derive(Debug, Error)]
#[error("Login handshake failed: {0}")]
pub struct FatalLoginError(#[from] pub AuthError);

/// Handle a non-read request against a fresh config snapshot.
pub async fn forward_write(
    state: &AppState,
    config: &SpaceConfig,
    request: InboundRequest,
    body: Body,
) -> Result<Response, FatalLoginError> {
    let encoded = request.wire_path(config.prefix());
    match WriteRoute::classify(&encoded) {
        WriteRoute::LoginIntercepted => login(state, config, &request, body).await,
        WriteRoute::LogoutIntercepted => Ok(logout(state, config)),
        WriteRoute::Forwarded => Ok(forward(state, config, &request, body, &encoded).await),
    }
}

async fn login(
    state: &AppState,
    config: &SpaceConfig,
    request: &InboundRequest,
    body: Body,
) -> Result<Response, FatalLoginError> {
    if config.auth_token.is_some() {
        tracing::debug!("Already authenticated, skipping challenge");
        return Ok(no_content());
    }

    let Some((source, count)) = request.forwardable_body(body) else {
        return Ok((StatusCode::BAD_REQUEST, "Login requires a form body").into_response());
    };
    let raw = match read_counted(source, count).await {
        Ok(raw) => raw,
        Err(e) => return Ok((StatusCode::BAD_REQUEST, e.to_string()).into_response()),
    };
    let Some(form) = parse_login_form(&raw) else {
        return Ok((StatusCode::BAD_REQUEST, "Login form needs user and password").into_response());
    };

    match state.authenticator.authenticate(config, &form.user, &form.password).await {
        Ok(token) => {
            if let Err(e) = state.store.write(&ConfigPatch::auth_token(token)) {
                tracing::error!(error = %e, "Failed to store credential");
                return Ok((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response());
            }
            tracing::info!(user = %form.user, "Logged in");
            Ok(no_content())
        }
        Err(e) if e.is_unauthorized() => {
            tracing::warn!(user = %form.user, error = %e, "Login rejected");
            Ok((StatusCode::UNAUTHORIZED, Body::empty()).into_response())
        }
        Err(e) => Err(FatalLoginError(e)),
    }
}

fn logout(state: &AppState, config: &SpaceConfig) -> Response {
    if config.auth_token.is_some() {
        if let Err(e) = state.store.delete(ConfigKey::AuthToken) {
            tracing::error!(error = %e, "Failed to remove credential");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
        tracing::info!("Logged out");
    }
    no_content()
}

async fn forward(
    state: &AppState,
    config: &SpaceConfig,
    request: &InboundRequest,
    body: Body,
    encoded: &str,
) -> Response {
    let uri = config.upstream_uri(encoded, request.query.as_deref());
    let body = match request.forwardable_body(body) {
        Some((source, count)) => OutboundBody::Counted { source, count },
        None => OutboundBody::Empty,
    };
    let call = RemoteCall::new(request.method.clone(), uri)
        .credential(config.auth_token.as_deref())
        .content_type(request.content_type.as_deref())
        .timeout(config.remote_timeout())
        .body(body);

    match state.client.send(call).await {
        Ok(response) => {
            tracing::debug!(method = %request.method, path = %encoded, status = %response.status(), "Write forwarded");
            relay(response)
        }
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::codec::encode_path;

    #[test]
    fn test_classify() {
        assert_eq!(
            WriteRoute::classify("/challenge/tiddlywebplugins.tiddlyspace.cookie_form"),
            WriteRoute::LoginIntercepted
        );
        assert_eq!(WriteRoute::classify("/logout"), WriteRoute::LogoutIntercepted);
        assert_eq!(WriteRoute::classify("/bags/b/tiddlers/logout"), WriteRoute::Forwarded);
        assert_eq!(WriteRoute::classify("/challenge/openid"), WriteRoute::Forwarded);
    }

    #[test]
    fn test_classify_after_encoding() {
        // An escaped separator in the form name keeps it from matching.
        let encoded = encode_path("/challenge/tiddlywebplugins.tiddlyspace.cookie_form/x", None);
        assert_eq!(WriteRoute::classify(&encoded), WriteRoute::Forwarded);
        assert_eq!(
            WriteRoute::classify(&encode_path("/challenge/tiddlywebplugins.tiddlyspace.cookie_form", None)),
            WriteRoute::LoginIntercepted
        );
    }
}
