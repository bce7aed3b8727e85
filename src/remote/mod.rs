//! Remote origin subsystem.
//!
//! # Data Flow
//! ```text
//! resolver / write forwarder / authenticator / push
//!     → RemoteCall (method, uri, credential, body)
//!     → client.rs (single call, redirects disabled)
//!     → reqwest::Response (< 400) or RemoteError
//! ```

pub mod client;
pub mod types;

pub use client::{RemoteCall, RemoteClient};
pub use types::{read_counted, OutboundBody, RemoteError, AUTH_COOKIE};
