//! Project operator payload.

use serde::{Deserialize, Serialize};

use crate::expr::ScalarExpr;

/// Project payload: the ordered list of output expressions and their
/// output names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectRel {
    /// Output expressions, one per output field.
    pub exprs: Vec<ScalarExpr>,
    /// Output field names, parallel to `exprs`.
    pub names: Vec<String>,
}

impl ProjectRel {
    /// Create a projection with names derived from the expressions.
    pub fn new(exprs: Vec<ScalarExpr>) -> Self {
        let names = exprs.iter().map(ScalarExpr::output_name).collect();
        Self { exprs, names }
    }

    /// Create a projection with explicit output names.
    pub fn named(exprs: Vec<ScalarExpr>, names: Vec<String>) -> Self {
        Self { exprs, names }
    }
}

impl std::fmt::Display for ProjectRel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (expr, name)) in self.exprs.iter().zip(self.names.iter()).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{expr} AS {name}")?;
        }
        Ok(())
    }
}
