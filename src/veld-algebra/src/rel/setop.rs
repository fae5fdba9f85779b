//! Set operator payload, shared by Union and Minus.

use serde::{Deserialize, Serialize};

/// Set-operation payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SetRel {
    /// Bag semantics (`UNION ALL` / `EXCEPT ALL`) when true, set semantics
    /// (duplicates eliminated) when false.
    pub all: bool,
}

impl SetRel {
    /// Bag-semantics variant.
    pub const fn all() -> Self {
        Self { all: true }
    }

    /// Set-semantics variant.
    pub const fn distinct() -> Self {
        Self { all: false }
    }
}

impl std::fmt::Display for SetRel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "all={}", self.all)
    }
}
