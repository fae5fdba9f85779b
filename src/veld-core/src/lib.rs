//! Core data model for the veld query engine.
//!
//! This crate provides the fundamental types shared by the algebra and
//! optimizer layers:
//! - `Value` and `DataType` for the scalar type system
//! - `Field` and `RowType` for operator output schemas
//! - `ColumnRef` for (optionally qualified) column references
//! - `Convention` and `TraitSet` for physical plan properties

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod schema;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use schema::{ColumnRef, Field, RowType};
pub use traits::{Convention, TraitSet};
pub use types::{DataType, Value};
