//! Aggregate operator payload.

use serde::{Deserialize, Serialize};
use veld_core::ColumnRef;

use crate::expr::AggCall;

/// Aggregate payload: grouping keys and aggregate calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregateRel {
    /// Grouping key columns, in output order.
    pub group_keys: Vec<ColumnRef>,
    /// Aggregate calls, in output order after the keys.
    pub calls: Vec<AggCall>,
}

impl AggregateRel {
    /// Create a new aggregate payload.
    pub const fn new(group_keys: Vec<ColumnRef>, calls: Vec<AggCall>) -> Self {
        Self { group_keys, calls }
    }
}

impl std::fmt::Display for AggregateRel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "keys=[")?;
        for (i, key) in self.group_keys.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}")?;
        }
        write!(f, "], calls=[")?;
        for (i, call) in self.calls.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{call}")?;
        }
        write!(f, "]")
    }
}
