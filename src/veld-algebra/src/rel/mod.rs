//! Relational operators and the immutable algebra node.

mod aggregate;
mod filter;
mod join;
mod node;
mod project;
mod scan;
mod setop;

pub use aggregate::AggregateRel;
pub use filter::FilterRel;
pub use join::{JoinKind, JoinRel};
pub use node::{equi_conjuncts, RelKind, RelNode, RelOp};
pub use project::ProjectRel;
pub use scan::ScanRel;
pub use setop::SetRel;
