//! Metadata and statistics interfaces.
//!
//! The optimizer consumes catalog statistics through `MetadataProvider`.
//! Absent statistics are reported as `None`, never as an error; the cost
//! model substitutes conservative defaults.

use std::collections::HashMap;

use veld_algebra::{RelNode, RelOp};
use veld_core::Value;

/// Statistics for a single column of a node's output.
#[derive(Debug, Clone, Default)]
pub struct ColumnStatistics {
    /// Estimated number of distinct values.
    pub distinct_count: Option<f64>,
    /// Fraction of null values in [0, 1].
    pub null_fraction: Option<f64>,
    /// Minimum value, if known.
    pub min: Option<Value>,
    /// Maximum value, if known.
    pub max: Option<Value>,
}

impl ColumnStatistics {
    /// Statistics carrying only a distinct count.
    pub fn with_distinct_count(distinct_count: f64) -> Self {
        Self {
            distinct_count: Some(distinct_count),
            ..Self::default()
        }
    }
}

/// The catalog-statistics collaborator consumed by the cost model and the
/// predicate-inference engine.
///
/// Implementations must fail gracefully: unknown statistics are `None`.
pub trait MetadataProvider: Send + Sync {
    /// Estimated row count of a node's output.
    fn row_count(&self, node: &RelNode) -> Option<f64>;

    /// Statistics for one output column of a node.
    fn column_statistics(&self, node: &RelNode, column: usize) -> Option<ColumnStatistics>;

    /// Known unique keys of a node's output, as sets of column indexes.
    fn unique_keys(&self, node: &RelNode) -> Option<Vec<Vec<usize>>>;
}

/// A provider that knows nothing; every estimate falls back to defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyMetadata;

impl MetadataProvider for EmptyMetadata {
    fn row_count(&self, _node: &RelNode) -> Option<f64> {
        None
    }

    fn column_statistics(&self, _node: &RelNode, _column: usize) -> Option<ColumnStatistics> {
        None
    }

    fn unique_keys(&self, _node: &RelNode) -> Option<Vec<Vec<usize>>> {
        None
    }
}

/// Statistics for one base relation.
#[derive(Debug, Clone, Default)]
pub struct TableStatistics {
    /// Row count of the relation.
    pub row_count: f64,
    /// Per-column statistics, keyed by column name.
    pub columns: HashMap<String, ColumnStatistics>,
    /// Unique keys as sets of column indexes.
    pub unique_keys: Vec<Vec<usize>>,
}

impl TableStatistics {
    /// Create statistics with a row count only.
    pub fn with_row_count(row_count: f64) -> Self {
        Self {
            row_count,
            ..Self::default()
        }
    }

    /// Add statistics for a column.
    pub fn with_column(mut self, name: impl Into<String>, stats: ColumnStatistics) -> Self {
        self.columns.insert(name.into(), stats);
        self
    }

    /// Add a unique key.
    pub fn with_unique_key(mut self, key: Vec<usize>) -> Self {
        self.unique_keys.push(key);
        self
    }
}

/// A fixed, in-memory provider answering for base-relation scans only.
///
/// Composite nodes return `None` and are estimated by the cost model from
/// their children.
#[derive(Debug, Clone, Default)]
pub struct FixedMetadata {
    tables: HashMap<String, TableStatistics>,
}

impl FixedMetadata {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register statistics for a relation addressed by its dotted path.
    pub fn with_table(mut self, path: impl Into<String>, stats: TableStatistics) -> Self {
        self.tables.insert(path.into(), stats);
        self
    }

    fn scan_stats(&self, node: &RelNode) -> Option<&TableStatistics> {
        match node.op() {
            RelOp::Scan(scan) => self.tables.get(&scan.table_path()),
            _ => None,
        }
    }
}

impl MetadataProvider for FixedMetadata {
    fn row_count(&self, node: &RelNode) -> Option<f64> {
        self.scan_stats(node).map(|s| s.row_count)
    }

    fn column_statistics(&self, node: &RelNode, column: usize) -> Option<ColumnStatistics> {
        let stats = self.scan_stats(node)?;
        let field = node.row_type().field(column)?;
        stats.columns.get(&field.name).cloned()
    }

    fn unique_keys(&self, node: &RelNode) -> Option<Vec<Vec<usize>>> {
        self.scan_stats(node).map(|s| s.unique_keys.clone())
    }
}
