//! Column reference resolution.

use serde::{Deserialize, Serialize};

/// Reference to a column, possibly qualified by a relation name or alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Optional qualifier (table name or alias).
    pub qualifier: Option<String>,
    /// Column name.
    pub name: String,
}

impl ColumnRef {
    /// Create a new unqualified column reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            name: name.into(),
        }
    }

    /// Create a new qualified column reference.
    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            name: name.into(),
        }
    }

    /// Parse a column reference from a string.
    ///
    /// Supports formats:
    /// - `"column"` -> unqualified
    /// - `"relation.column"` -> qualified
    pub fn parse(s: &str) -> Self {
        if let Some((qualifier, name)) = s.split_once('.') {
            Self::qualified(qualifier, name)
        } else {
            Self::new(s)
        }
    }

    /// Check if this reference is qualified.
    pub const fn is_qualified(&self) -> bool {
        self.qualifier.is_some()
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{q}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let unqualified = ColumnRef::parse("age");
        assert!(!unqualified.is_qualified());
        assert_eq!(unqualified.name, "age");

        let qualified = ColumnRef::parse("orders.cust_id");
        assert_eq!(qualified.qualifier.as_deref(), Some("orders"));
        assert_eq!(qualified.name, "cust_id");
        assert_eq!(qualified.to_string(), "orders.cust_id");
    }
}
