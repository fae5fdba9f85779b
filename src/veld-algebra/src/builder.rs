//! Fluent builder for constructing algebra trees.

use std::sync::Arc;

use common_error::VeldResult;
use veld_core::{ColumnRef, RowType};

use crate::expr::{AggCall, ScalarExpr};
use crate::rel::{AggregateRel, JoinKind, ProjectRel, RelNode, ScanRel, SetRel};

/// Builder for constructing plans fluently.
///
/// Node constructors validate at every step, so builder methods are
/// fallible and chain with `?`.
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    node: Arc<RelNode>,
}

impl PlanBuilder {
    /// Start building from a scan.
    pub fn scan(scan: ScanRel, row_type: RowType) -> VeldResult<Self> {
        Ok(Self {
            node: RelNode::scan(scan, row_type)?,
        })
    }

    /// Start building from an existing subtree.
    pub const fn from_node(node: Arc<RelNode>) -> Self {
        Self { node }
    }

    /// Add a filter.
    pub fn filter(self, predicate: ScalarExpr) -> VeldResult<Self> {
        Ok(Self {
            node: RelNode::filter(self.node, predicate)?,
        })
    }

    /// Add a projection.
    pub fn project(self, exprs: Vec<ScalarExpr>) -> VeldResult<Self> {
        Ok(Self {
            node: RelNode::project(self.node, ProjectRel::new(exprs))?,
        })
    }

    /// Join with another plan.
    pub fn join(self, kind: JoinKind, right: Self, condition: ScalarExpr) -> VeldResult<Self> {
        Ok(Self {
            node: RelNode::join(kind, self.node, right.node, condition)?,
        })
    }

    /// Union with another plan.
    pub fn union(self, right: Self, set: SetRel) -> VeldResult<Self> {
        Ok(Self {
            node: RelNode::union(self.node, right.node, set)?,
        })
    }

    /// Minus (except) with another plan.
    pub fn minus(self, right: Self, set: SetRel) -> VeldResult<Self> {
        Ok(Self {
            node: RelNode::minus(self.node, right.node, set)?,
        })
    }

    /// Add a stream-delta marker.
    pub fn delta(self) -> VeldResult<Self> {
        Ok(Self {
            node: RelNode::delta(self.node)?,
        })
    }

    /// Add a grouped aggregation.
    pub fn aggregate(self, group_keys: Vec<ColumnRef>, calls: Vec<AggCall>) -> VeldResult<Self> {
        Ok(Self {
            node: RelNode::aggregate(self.node, AggregateRel::new(group_keys, calls))?,
        })
    }

    /// Build the final tree.
    pub fn build(self) -> Arc<RelNode> {
        self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{col, lit};
    use crate::rel::RelKind;
    use veld_core::{DataType, Field};

    #[test]
    fn test_builder_chain() {
        let plan = PlanBuilder::scan(
            ScanRel::table(["orders"]),
            RowType::new(vec![
                Field::new("id", DataType::Int64),
                Field::new("cust_id", DataType::Int64),
            ]),
        )
        .unwrap()
        .filter(col("cust_id").eq(lit(5i64)))
        .unwrap()
        .project(vec![col("id")])
        .unwrap()
        .build();

        assert_eq!(plan.kind(), RelKind::Project);
        assert_eq!(plan.node_count(), 3);
        assert_eq!(plan.row_type().field_count(), 1);
    }
}
