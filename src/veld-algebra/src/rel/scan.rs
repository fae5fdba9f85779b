//! Scan operator payload.

use serde::{Deserialize, Serialize};

/// Scan payload: reads a named base relation (table, stream, or
/// materialized view).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanRel {
    /// Dotted path of the relation in the catalog, e.g. `["sales", "orders"]`.
    pub table: Vec<String>,
    /// Optional alias used to qualify output fields.
    pub alias: Option<String>,
}

impl ScanRel {
    /// Create a scan of a relation addressed by path segments.
    pub fn table<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: path.into_iter().map(Into::into).collect(),
            alias: None,
        }
    }

    /// Set the alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The qualifier applied to output fields: the alias if present,
    /// otherwise the relation's own name.
    pub fn qualifier(&self) -> Option<&str> {
        self.alias
            .as_deref()
            .or_else(|| self.table.last().map(String::as_str))
    }

    /// Full dotted relation path.
    pub fn table_path(&self) -> String {
        self.table.join(".")
    }
}

impl std::fmt::Display for ScanRel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.table_path())?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualifier_prefers_alias() {
        let scan = ScanRel::table(["sales", "orders"]);
        assert_eq!(scan.qualifier(), Some("orders"));
        assert_eq!(scan.table_path(), "sales.orders");

        let aliased = scan.with_alias("o");
        assert_eq!(aliased.qualifier(), Some("o"));
        assert_eq!(aliased.to_string(), "sales.orders AS o");
    }
}
