//! libvarnam crate root
//!
//! This crate wraps the `varnam-core` engine in a per-language handle that
//! locates the symbol table and learnings file, normalizes input and caches
//! results.
//!
//! Public API exported here:
//! - `Varnam` from `engine`
//! - `VarnamConfig` from `config`
//! - path helpers from `paths`

pub mod config;
pub mod engine;
pub mod paths;

pub use config::VarnamConfig;
pub use engine::Varnam;

// Convenience re-exports for common types used by callers.
pub use varnam_core::{Config, Result, Suggestion, TransliterationResult, VarnamError};
