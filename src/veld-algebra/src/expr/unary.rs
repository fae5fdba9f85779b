//! Unary operators.

use serde::{Deserialize, Serialize};
use veld_core::DataType;

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Logical NOT.
    Not,
    /// Arithmetic negation.
    Neg,
    /// IS NULL test.
    IsNull,
    /// IS NOT NULL test.
    IsNotNull,
}

impl UnaryOp {
    /// The display name for this operator.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Not => "NOT",
            Self::Neg => "-",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }

    /// Whether the operator renders before its operand.
    pub const fn is_prefix(&self) -> bool {
        matches!(self, Self::Not | Self::Neg)
    }

    /// Result type given the operand type, if the operation is well-typed.
    pub fn result_type(&self, operand: &DataType) -> Option<DataType> {
        match self {
            Self::Not => {
                matches!(operand, DataType::Bool | DataType::Null).then_some(DataType::Bool)
            }
            Self::Neg => operand.is_numeric().then(|| operand.clone()),
            Self::IsNull | Self::IsNotNull => Some(DataType::Bool),
        }
    }
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
