//! Cookie-form challenge against the origin.

use async_trait::async_trait;
use axum::http::{header, HeaderMap, Method};

use crate::auth::{AuthError, Authenticator, CHALLENGE_PATH};
use crate::config::SpaceConfig;
use crate::remote::{OutboundBody, RemoteCall, RemoteClient, AUTH_COOKIE};

/// Authenticates by posting the cookie form and reading the session cookie
/// off the (unfollowed) redirect.
#[derive(Debug, Clone)]
pub struct ChallengeAuthenticator {
    client: RemoteClient,
}

impl ChallengeAuthenticator {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Authenticator for ChallengeAuthenticator {
    async fn authenticate(&self, config: &SpaceConfig, user: &str, password: &str) -> Result<String, AuthError> {
        let call = RemoteCall::new(Method::POST, config.upstream_uri(CHALLENGE_PATH, None))
            .timeout(config.remote_timeout())
            .body(OutboundBody::Form(vec![
                ("user".to_owned(), user.to_owned()),
                ("password".to_owned(), password.to_owned()),
            ]));

        let response = self.client.send(call).await?;
        let status = response.status();
        match session_cookie(response.headers()) {
            Some(token) => {
                tracing::info!(user = %user, status = %status, "Challenge accepted");
                Ok(token)
            }
            None => Err(AuthError::MissingCookie { status }),
        }
    }
}

/// Value of the session cookie among the response's `Set-Cookie` headers.
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookie| {
            let pair = cookie.split(';').next()?;
            let (name, value) = pair.split_once('=')?;
            (name.trim() == AUTH_COOKIE).then(|| unquote(value.trim()).to_owned())
        })
        .filter(|token| !token.is_empty())
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
