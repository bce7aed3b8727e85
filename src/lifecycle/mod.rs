//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Ctrl+C (signals.rs)
//!     → Shutdown::trigger (shutdown.rs)
//!     → HttpServer stops accepting, drains in-flight requests
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::trigger_on_ctrl_c;
