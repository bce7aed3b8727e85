//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → access_log.rs (one combined-format line per request)
//! ```

pub mod access_log;
pub mod logging;

pub use access_log::{access_log, AccessRecord, ACCESS_TARGET};
pub use logging::init_logging;
