//! veld - multi-model relational query engine.
//!
//! This crate is the facade over the engine's optimizer core: the
//! relational algebra IR, the rule-based planner, predicate inference,
//! and materialized-view substitution.

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

// Re-export core crates
pub use common_error as error;
pub use veld_algebra as algebra;
pub use veld_core as core;
pub use veld_optimizer as optimizer;

/// veld version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
