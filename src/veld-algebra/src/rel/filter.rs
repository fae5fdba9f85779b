//! Filter operator payload.

use serde::{Deserialize, Serialize};

use crate::expr::ScalarExpr;

/// Filter payload: a boolean predicate over the input row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterRel {
    /// Filter predicate (must type-check to bool).
    pub predicate: ScalarExpr,
}

impl FilterRel {
    /// Create a new filter payload.
    pub const fn new(predicate: ScalarExpr) -> Self {
        Self { predicate }
    }
}

impl std::fmt::Display for FilterRel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.predicate)
    }
}
