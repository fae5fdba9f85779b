//! Scalar expression system.
//!
//! Expressions are the smallest executable semantic units used in
//! predicates, projections, join conditions, and aggregate calls. Their
//! `Display` rendering is canonical: two expressions render identically
//! iff they are structurally identical, and the plan-node digest and the
//! mutable-tree comparison both build on that property.

mod agg;
mod binary;
mod scalar;
mod unary;

pub use agg::{AggCall, AggFunc};
pub use binary::BinaryOp;
pub use scalar::{col, lit, qualified_col, ScalarExpr};
pub use unary::UnaryOp;
