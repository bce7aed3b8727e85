//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, method dispatch)
//!     → request.rs (decode path, pick headers, request ID)
//!     → GET/HEAD: routing::resolver (local file, override, origin)
//!     → other methods: write.rs (login, logout, forward)
//!     → response.rs (relay or render error)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod write;

pub use request::{InboundRequest, UuidRequestId, X_CONTROL_VIEW, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
pub use write::{forward_write, FatalLoginError, WriteRoute};
