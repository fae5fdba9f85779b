//! Aggregate function calls.

use serde::{Deserialize, Serialize};
use veld_core::{ColumnRef, DataType};

/// An aggregate function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggFunc {
    /// Row count.
    Count,
    /// Sum of a numeric column.
    Sum,
    /// Minimum.
    Min,
    /// Maximum.
    Max,
    /// Average.
    Avg,
}

impl AggFunc {
    /// Lower-case name used in output field names.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::Avg => "avg",
        }
    }
}

/// A single aggregate call in an `Aggregate` node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggCall {
    /// The aggregate function.
    pub func: AggFunc,
    /// Argument column; `None` means `count(*)`.
    pub arg: Option<ColumnRef>,
}

impl AggCall {
    /// Create an aggregate call over a column.
    pub fn new(func: AggFunc, arg: ColumnRef) -> Self {
        Self {
            func,
            arg: Some(arg),
        }
    }

    /// Create a `count(*)` call.
    pub const fn count_star() -> Self {
        Self {
            func: AggFunc::Count,
            arg: None,
        }
    }

    /// Output field name, e.g. `sum(amount)` or `count(*)`.
    pub fn output_name(&self) -> String {
        match &self.arg {
            Some(c) => format!("{}({c})", self.func.name()),
            None => format!("{}(*)", self.func.name()),
        }
    }

    /// Result type given the argument type.
    pub fn result_type(&self, arg_type: Option<&DataType>) -> DataType {
        match self.func {
            AggFunc::Count => DataType::Int64,
            AggFunc::Avg => DataType::Float64,
            AggFunc::Sum | AggFunc::Min | AggFunc::Max => {
                arg_type.cloned().unwrap_or(DataType::Null)
            }
        }
    }

    /// Whether the result can be null on empty input.
    pub const fn nullable(&self) -> bool {
        !matches!(self.func, AggFunc::Count)
    }
}

impl std::fmt::Display for AggCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.output_name())
    }
}
