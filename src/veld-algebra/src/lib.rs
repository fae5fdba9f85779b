//! Relational algebra layer for the veld query engine.
//!
//! `veld-algebra` provides the canonical plan IR and expression system:
//!
//! - **Expression system**: typed scalar expressions for predicates,
//!   projections, join conditions, and aggregate calls
//! - **Algebra nodes**: the immutable operator set (Scan, Project, Filter,
//!   Join, Union, Minus, Delta, Aggregate) with row types derived and
//!   validated at construction
//! - **Structural identity**: a canonical digest over operator kind,
//!   payload, and children, excluding physical traits
//! - **Mutable tree**: a simplified mirror used for trait-blind structural
//!   equivalence tests (materialized-view matching)
//!
//! # Key design principles
//!
//! 1. Nodes are immutable; rewrites build new nodes over shared children
//! 2. Every invariant is enforced at construction, not discovered later
//! 3. Structurally identical trees are interchangeable everywhere
//!
//! # Example
//!
//! ```rust
//! use veld_algebra::{col, lit, PlanBuilder, ScanRel};
//! use veld_core::{DataType, Field, RowType};
//!
//! let plan = PlanBuilder::scan(
//!     ScanRel::table(["orders"]),
//!     RowType::new(vec![
//!         Field::new("id", DataType::Int64),
//!         Field::new("cust_id", DataType::Int64),
//!     ]),
//! )
//! .unwrap()
//! .filter(col("cust_id").eq(lit(5i64)))
//! .unwrap()
//! .build();
//!
//! println!("{}", plan.explain(0));
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

mod builder;
pub mod expr;
mod mutable;
pub mod rel;

// Re-export commonly used types at the crate root
pub use builder::PlanBuilder;
pub use mutable::MutableNode;
pub use rel::{
    equi_conjuncts, AggregateRel, FilterRel, JoinKind, JoinRel, ProjectRel, RelKind, RelNode,
    RelOp, ScanRel, SetRel,
};

// Re-export expression types and convenience functions
pub use expr::{col, lit, qualified_col, AggCall, AggFunc, BinaryOp, ScalarExpr, UnaryOp};
