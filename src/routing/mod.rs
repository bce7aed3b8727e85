//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Decoded read path (+ query)
//!     → resolver.rs (candidate list: app root, assets/, origin)
//!     → first local candidate that opens, else
//!     → codec.rs (restore escaped separators) → origin GET
//! ```
//!
//! # Design Decisions
//! - Candidate order is explicit and testable, not failure-driven
//! - Deterministic: same path and files always pick the same source
//! - The keyword grammar in codec.rs fixes which paths round-trip

pub mod codec;
pub mod content_type;
pub mod resolver;

pub use codec::{decode_path, document_path, encode_path, encode_segment};
pub use resolver::{ResolvedContent, RouteDecision, RouteResolver, ASSETS_DIR, DOCUMENT_SEGMENTS};
