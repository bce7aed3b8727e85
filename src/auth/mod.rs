//! Credential exchange with the origin.
//!
//! # Data Flow
//! ```text
//! login form body (user=..&password=..)
//!     → form.rs (two ordered fields, no general decoder)
//!     → Authenticator::authenticate
//!     → challenge.rs: POST challenge path, redirect not followed
//!     → Set-Cookie: tiddlyweb_user=<token>
//!     → ConfigStore::write(auth_token)
//! ```

pub mod challenge;
pub mod form;

use async_trait::async_trait;
use axum::http::StatusCode;
use thiserror::Error;

use crate::config::SpaceConfig;
use crate::remote::RemoteError;

pub use challenge::ChallengeAuthenticator;
pub use form::{parse_login_form, LoginForm};

/// Origin endpoint that exchanges a user and password for a session cookie.
pub const CHALLENGE_PATH: &str = "/challenge/tiddlywebplugins.tiddlyspace.cookie_form";

/// Local path that drops the stored credential.
pub const LOGOUT_PATH: &str = "/logout";

/// Errors from the credential handshake.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The origin rejected the user or password.
    #[error("Authentication rejected: {0}")]
    Unauthorized(String),

    /// The challenge answered without issuing a session cookie.
    #[error("Challenge returned {status} without a tiddlyweb_user cookie")]
    MissingCookie { status: StatusCode },

    #[error(transparent)]
    Remote(RemoteError),
}

impl AuthError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AuthError::Unauthorized(_))
    }
}

impl From<RemoteError> for AuthError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Status { status, message } if status == StatusCode::UNAUTHORIZED => {
                AuthError::Unauthorized(message)
            }
            other => AuthError::Remote(other),
        }
    }
}

/// Exchanges credentials for a session token.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, config: &SpaceConfig, user: &str, password: &str) -> Result<String, AuthError>;
}
