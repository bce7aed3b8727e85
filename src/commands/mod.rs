//! One-shot commands run from the CLI.
//!
//! Each command reads its own config snapshot and reports failure through
//! `CommandError`; none of them touch a running proxy.

pub mod auth;
pub mod delete;
pub mod init;
pub mod push;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::remote::RemoteError;

pub use auth::login;
pub use delete::delete_document;
pub use init::create_app;
pub use push::{push_assets, PushOptions, PushReport};

/// Errors that abort a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Invalid app name '{0}': must be a single non-empty path component")]
    InvalidName(String),

    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Nothing to push matching '{0}'")]
    NothingToPush(String),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl CommandError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| CommandError::Io { path, source }
    }
}
