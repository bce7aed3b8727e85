//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! $HOME/.tsapp, ./.tsapp (TOML)
//!     → loader.rs (parse, layer, apply defaults)
//!     → SpaceConfig (request-scoped snapshot)
//!
//! On login/logout:
//!     store.rs write/delete
//!     → ./.tsapp rewritten
//!     → next request reads the new state
//! ```
//!
//! # Design Decisions
//! - Config is re-read for every request instead of shared via Arc
//! - All fields have defaults to allow minimal (or absent) files
//! - The proxy mutates config only through `ConfigStore`

pub mod loader;
pub mod schema;
pub mod store;

pub use loader::ConfigError;
pub use schema::{ConfigKey, ConfigPatch, SpaceConfig};
pub use store::{ConfigStore, FileConfigStore, MemoryConfigStore};
