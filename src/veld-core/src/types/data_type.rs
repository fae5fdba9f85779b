//! Data type definitions for veld row types.

use serde::{Deserialize, Serialize};

/// Data type for row-type fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Null type (unknown or absent).
    Null,
    /// Boolean type.
    Bool,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Binary data.
    Binary,
    /// Timestamp with nanosecond precision.
    Timestamp,
    /// Date (days since epoch).
    Date,
}

impl DataType {
    /// Check if this type is numeric.
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }

    /// Check if this type is a temporal type.
    pub const fn is_temporal(&self) -> bool {
        matches!(self, Self::Timestamp | Self::Date)
    }

    /// Check if this type can be compared with another for equality.
    pub fn is_comparable_to(&self, other: &Self) -> bool {
        self == other
            || matches!(self, Self::Null)
            || matches!(other, Self::Null)
            || (self.is_numeric() && other.is_numeric())
    }

    /// Check if this type can be coerced to another type.
    pub fn can_coerce_to(&self, target: &Self) -> bool {
        if self == target {
            return true;
        }
        matches!((self, target), (Self::Null, _) | (Self::Int64, Self::Float64))
    }

    /// Get the common supertype of two types (for type inference).
    pub fn common_supertype(&self, other: &Self) -> Option<Self> {
        if self == other {
            return Some(self.clone());
        }

        match (self, other) {
            (Self::Null, t) | (t, Self::Null) => Some(t.clone()),
            (Self::Int64, Self::Float64) | (Self::Float64, Self::Int64) => Some(Self::Float64),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Null => "Null",
            Self::Bool => "Bool",
            Self::Int64 => "Int64",
            Self::Float64 => "Float64",
            Self::String => "String",
            Self::Binary => "Binary",
            Self::Timestamp => "Timestamp",
            Self::Date => "Date",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_coercion() {
        assert!(DataType::Int64.can_coerce_to(&DataType::Float64));
        assert!(DataType::Null.can_coerce_to(&DataType::String));
        assert!(!DataType::String.can_coerce_to(&DataType::Int64));
    }

    #[test]
    fn test_common_supertype() {
        assert_eq!(
            DataType::Int64.common_supertype(&DataType::Float64),
            Some(DataType::Float64)
        );
        assert_eq!(
            DataType::Null.common_supertype(&DataType::Bool),
            Some(DataType::Bool)
        );
        assert_eq!(DataType::String.common_supertype(&DataType::Int64), None);
    }

    #[test]
    fn test_comparability() {
        assert!(DataType::Int64.is_comparable_to(&DataType::Float64));
        assert!(DataType::String.is_comparable_to(&DataType::String));
        assert!(!DataType::String.is_comparable_to(&DataType::Date));
    }
}
