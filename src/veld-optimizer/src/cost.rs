//! Cost model.
//!
//! Costs compose bottom-up: a node's total cost is its local work plus the
//! already-computed costs of its children. The planner memoizes totals per
//! node digest, so structurally shared subtrees are costed once per
//! planning session.

use veld_algebra::{equi_conjuncts, BinaryOp, JoinKind, RelNode, RelOp, ScalarExpr, UnaryOp};

use crate::metadata::MetadataProvider;

/// Fallback row count when the catalog has no statistics for a relation.
pub const DEFAULT_ROW_COUNT: f64 = 1000.0;

/// Selectivity of an equality predicate without distinct-count statistics.
pub const DEFAULT_EQ_SELECTIVITY: f64 = 0.1;

/// Selectivity of a range predicate.
pub const DEFAULT_RANGE_SELECTIVITY: f64 = 0.33;

/// Selectivity of a predicate the model cannot classify.
pub const DEFAULT_SELECTIVITY: f64 = 0.25;

/// Per-row weight of evaluating a filter predicate, relative to producing
/// a row. Filters must stay cheap enough that pushing one below a join is
/// never estimated as a regression.
const FILTER_CPU_FACTOR: f64 = 0.1;

/// A totally ordered plan cost.
///
/// `cpu` is the cumulative work of the subtree and dominates the ordering;
/// `rows` is the node's output estimate and breaks ties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cost {
    /// Estimated output row count.
    pub rows: f64,
    /// Cumulative work estimate.
    pub cpu: f64,
}

impl Cost {
    /// Zero cost.
    pub const fn zero() -> Self {
        Self { rows: 0.0, cpu: 0.0 }
    }

    /// A cost greater than every finite cost.
    pub const fn infinite() -> Self {
        Self {
            rows: f64::INFINITY,
            cpu: f64::INFINITY,
        }
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.cpu
            .total_cmp(&other.cpu)
            .then_with(|| self.rows.total_cmp(&other.rows))
    }
}

impl std::fmt::Display for Cost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{rows: {:.1}, cpu: {:.1}}}", self.rows, self.cpu)
    }
}

/// Compose a subtree's cost bottom-up, memoized by node digest.
///
/// The memo belongs to one planning session; passing a fresh map costs the
/// tree from scratch.
pub fn cost_with_memo(
    node: &std::sync::Arc<RelNode>,
    model: &dyn CostModel,
    metadata: &dyn MetadataProvider,
    memo: &mut std::collections::HashMap<String, Cost>,
) -> Cost {
    if let Some(hit) = memo.get(node.digest()) {
        return *hit;
    }
    let mut child_rows = Vec::with_capacity(node.inputs().len());
    let mut child_cpu = 0.0;
    for input in node.inputs() {
        let cost = cost_with_memo(input, model, metadata, memo);
        child_rows.push(cost.rows);
        child_cpu += cost.cpu;
    }
    let rows = model.estimate_rows(node, &child_rows, metadata);
    let cost = Cost {
        rows,
        cpu: child_cpu + model.local_cpu(node, rows, &child_rows),
    };
    memo.insert(node.digest().to_string(), cost);
    cost
}

/// Node-local cost formulas, combined bottom-up by the planning session.
pub trait CostModel: Send + Sync {
    /// Estimated output rows of a node given its children's estimates.
    fn estimate_rows(
        &self,
        node: &RelNode,
        child_rows: &[f64],
        metadata: &dyn MetadataProvider,
    ) -> f64;

    /// Local work of a node given its output estimate and its children's.
    fn local_cpu(&self, node: &RelNode, rows: f64, child_rows: &[f64]) -> f64;
}

/// The standard heuristic cost model.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCostModel;

impl DefaultCostModel {
    /// Estimate the fraction of input rows passing a predicate.
    fn selectivity(
        &self,
        predicate: &ScalarExpr,
        input: &RelNode,
        metadata: &dyn MetadataProvider,
    ) -> f64 {
        match predicate {
            ScalarExpr::Literal(v) if v.is_true() => 1.0,
            ScalarExpr::Binary {
                left,
                op: BinaryOp::And,
                right,
            } => {
                // Independence assumption: P(A AND B) = P(A) * P(B).
                self.selectivity(left, input, metadata) * self.selectivity(right, input, metadata)
            }
            ScalarExpr::Binary {
                left,
                op: BinaryOp::Or,
                right,
            } => {
                // Inclusion-exclusion: P(A OR B) = 1 - (1 - P(A)) * (1 - P(B)).
                1.0 - (1.0 - self.selectivity(left, input, metadata))
                    * (1.0 - self.selectivity(right, input, metadata))
            }
            ScalarExpr::Binary {
                left,
                op: BinaryOp::Eq,
                right,
            } => {
                // Equality selectivity 1/NDV assumes a uniform distribution.
                let ndv = column_ndv(left, input, metadata)
                    .or_else(|| column_ndv(right, input, metadata));
                match ndv {
                    Some(ndv) if ndv > 1.0 => 1.0 / ndv,
                    _ => DEFAULT_EQ_SELECTIVITY,
                }
            }
            ScalarExpr::Binary {
                op: BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq,
                ..
            } => DEFAULT_RANGE_SELECTIVITY,
            ScalarExpr::Unary {
                op: UnaryOp::Not,
                expr,
            } => 1.0 - self.selectivity(expr, input, metadata),
            _ => DEFAULT_SELECTIVITY,
        }
    }
}

/// Distinct count of a column expression against a node's output, if the
/// expression is a plain column and statistics exist.
fn column_ndv(
    expr: &ScalarExpr,
    input: &RelNode,
    metadata: &dyn MetadataProvider,
) -> Option<f64> {
    let column = expr.as_column()?;
    let index = input.row_type().index_of(column).ok()?;
    metadata.column_statistics(input, index)?.distinct_count
}

impl CostModel for DefaultCostModel {
    fn estimate_rows(
        &self,
        node: &RelNode,
        child_rows: &[f64],
        metadata: &dyn MetadataProvider,
    ) -> f64 {
        let child = |i: usize| child_rows.get(i).copied().unwrap_or(DEFAULT_ROW_COUNT);
        match node.op() {
            RelOp::Scan(_) => metadata.row_count(node).unwrap_or(DEFAULT_ROW_COUNT),
            RelOp::Filter(filter) => {
                let input = match node.inputs().first() {
                    Some(input) => input,
                    None => return child(0),
                };
                child(0) * self.selectivity(&filter.predicate, input, metadata)
            }
            RelOp::Project(_) | RelOp::Delta => child(0),
            RelOp::Join(join) => {
                let (left_rows, right_rows) = (child(0), child(1));
                let cross = left_rows * right_rows;

                // |A JOIN B| = |A| * |B| / max(ndv) per equi pair, with
                // max(|A|, |B|) standing in when distinct counts are unknown.
                let mut joined = cross;
                for (left_col, right_col) in equi_conjuncts(&join.condition) {
                    let left_ndv = node.inputs().first().and_then(|input| {
                        column_ndv(&ScalarExpr::Column(left_col), input, metadata)
                    });
                    let right_ndv = node.inputs().get(1).and_then(|input| {
                        column_ndv(&ScalarExpr::Column(right_col), input, metadata)
                    });
                    let ndv = match (left_ndv, right_ndv) {
                        (Some(a), Some(b)) => a.max(b),
                        (Some(a), None) | (None, Some(a)) => a,
                        (None, None) => left_rows.max(right_rows).max(1.0),
                    };
                    joined /= ndv.max(1.0);
                }

                match join.kind {
                    JoinKind::Inner => joined,
                    JoinKind::Left => joined.max(left_rows),
                    JoinKind::Right => joined.max(right_rows),
                    JoinKind::Full => joined.max(left_rows + right_rows),
                    JoinKind::Semi | JoinKind::Anti => left_rows * 0.5,
                }
            }
            RelOp::Union(set) => {
                let total = child(0) + child(1);
                if set.all {
                    total
                } else {
                    total * 0.5
                }
            }
            RelOp::Minus(_) => child(0) * 0.5,
            RelOp::Aggregate(aggregate) => {
                if aggregate.group_keys.is_empty() {
                    1.0
                } else {
                    child(0) * 0.1
                }
            }
        }
        .max(0.0)
    }

    fn local_cpu(&self, node: &RelNode, rows: f64, child_rows: &[f64]) -> f64 {
        let child = |i: usize| child_rows.get(i).copied().unwrap_or(0.0);
        match node.op() {
            RelOp::Scan(_) => rows,
            RelOp::Filter(_) => FILTER_CPU_FACTOR * child(0),
            RelOp::Project(_) | RelOp::Aggregate(_) => child(0),
            RelOp::Join(_) => child(0) + child(1) + rows,
            RelOp::Union(_) | RelOp::Minus(_) => child(0) + child(1),
            RelOp::Delta => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ColumnStatistics, EmptyMetadata, FixedMetadata, TableStatistics};
    use veld_algebra::{col, lit, ScanRel};
    use veld_core::{DataType, Field, RowType};

    fn orders_scan() -> std::sync::Arc<RelNode> {
        RelNode::scan(
            ScanRel::table(["orders"]),
            RowType::new(vec![
                Field::new("id", DataType::Int64),
                Field::new("cust_id", DataType::Int64),
            ]),
        )
        .unwrap()
    }

    #[test]
    fn test_scan_falls_back_without_stats() {
        let model = DefaultCostModel;
        let rows = model.estimate_rows(&orders_scan(), &[], &EmptyMetadata);
        assert_eq!(rows, DEFAULT_ROW_COUNT);
    }

    #[test]
    fn test_equality_selectivity_uses_ndv() {
        let metadata = FixedMetadata::new().with_table(
            "orders",
            TableStatistics::with_row_count(1000.0)
                .with_column("cust_id", ColumnStatistics::with_distinct_count(200.0)),
        );
        let scan = orders_scan();
        let filter = RelNode::filter(scan, col("cust_id").eq(lit(5i64))).unwrap();

        let model = DefaultCostModel;
        let rows = model.estimate_rows(&filter, &[1000.0], &metadata);
        assert!((rows - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_cost_ordering_is_total() {
        let a = Cost { rows: 10.0, cpu: 100.0 };
        let b = Cost { rows: 10.0, cpu: 200.0 };
        assert!(a < b);
        assert!(a < Cost::infinite());
        assert_eq!(a.cmp(&a), std::cmp::Ordering::Equal);
    }
}
