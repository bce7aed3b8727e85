//! Local development proxy for TiddlySpace apps.
//!
//! Serves an app directory on localhost and makes the space's
//! bags/recipes/tiddlers API appear same-origin: reads come from local
//! files when they exist and from the remote origin otherwise, and every
//! write is forwarded upstream with the stored session credential.

pub mod auth;
pub mod commands;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod remote;
pub mod routing;

pub use config::{ConfigStore, FileConfigStore, SpaceConfig};
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
