//! Filter-over-join pushdown rule.

use std::sync::Arc;

use common_error::VeldResult;
use veld_algebra::{JoinKind, RelKind, RelNode, RelOp, ScalarExpr};

use super::rule::{OperandPattern, Rule, RuleCall};

/// Push a filter above a join toward the join inputs.
///
/// Each conjunct is classified by the side whose columns it references:
/// side-local conjuncts move below the join onto that side's input (when
/// that side is not null-extended), cross-side conjuncts of an inner join
/// merge into the join condition, and everything else stays in a residual
/// filter above the join.
pub struct PushFilterThroughJoin;

impl Rule for PushFilterThroughJoin {
    fn name(&self) -> &'static str {
        "PushFilterThroughJoin"
    }

    fn description(&self) -> &'static str {
        "Split a filter above a join into side-local pushed filters"
    }

    fn pattern(&self) -> OperandPattern {
        OperandPattern::Exact(
            RelKind::Filter,
            vec![OperandPattern::AnyInputs(RelKind::Join)],
        )
    }

    fn on_match(&self, call: &mut RuleCall<'_>) -> VeldResult<()> {
        let (RelOp::Filter(filter), RelOp::Join(join)) =
            (call.node().op(), call.input(0)?.op())
        else {
            return Ok(());
        };

        let join_node = call.input(0)?;
        let left = join_node.input(0)?.clone();
        let right = join_node.input(1)?.clone();
        let kind = join.kind;
        let condition = join.condition.clone();

        let mut to_left: Vec<ScalarExpr> = Vec::new();
        let mut to_right: Vec<ScalarExpr> = Vec::new();
        let mut to_condition: Vec<ScalarExpr> = Vec::new();
        let mut residual: Vec<ScalarExpr> = Vec::new();

        for conjunct in filter.predicate.conjuncts() {
            let on_left = conjunct.references_only(left.row_type());
            let on_right =
                kind.emits_right_columns() && conjunct.references_only(right.row_type());

            match (on_left, on_right) {
                (true, false) if !kind.null_extends_left() => to_left.push(conjunct),
                (false, true) if !kind.null_extends_right() => to_right.push(conjunct),
                (false, false) if kind == JoinKind::Inner => to_condition.push(conjunct),
                _ => residual.push(conjunct),
            }
        }

        if to_left.is_empty() && to_right.is_empty() && to_condition.is_empty() {
            return Ok(());
        }

        let new_left = wrap_filter(left, to_left)?;
        let new_right = wrap_filter(right, to_right)?;
        let new_condition = if to_condition.is_empty() {
            condition
        } else {
            let mut conjuncts = condition.conjuncts();
            conjuncts.extend(to_condition);
            ScalarExpr::combine_conjuncts(conjuncts)
        };

        let new_join = RelNode::join(kind, new_left, new_right, new_condition)?;
        let replacement = if residual.is_empty() {
            new_join
        } else {
            RelNode::filter(new_join, ScalarExpr::combine_conjuncts(residual))?
        };
        call.transform_to(replacement);
        Ok(())
    }
}

fn wrap_filter(input: Arc<RelNode>, conjuncts: Vec<ScalarExpr>) -> VeldResult<Arc<RelNode>> {
    if conjuncts.is_empty() {
        Ok(input)
    } else {
        RelNode::filter(input, ScalarExpr::combine_conjuncts(conjuncts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::EmptyMetadata;
    use crate::predicates::PredicateInference;
    use crate::views::MaterializedViewRegistry;
    use veld_algebra::{col, lit, ScanRel};
    use veld_core::{DataType, Field, RowType};

    fn orders_scan() -> Arc<RelNode> {
        RelNode::scan(
            ScanRel::table(["orders"]),
            RowType::new(vec![
                Field::new("id", DataType::Int64),
                Field::new("cust_id", DataType::Int64),
            ]),
        )
        .unwrap()
    }

    fn customers_scan() -> Arc<RelNode> {
        RelNode::scan(
            ScanRel::table(["customers"]),
            RowType::new(vec![
                Field::new("id", DataType::Int64),
                Field::new("name", DataType::String),
            ]),
        )
        .unwrap()
    }

    fn apply(rule: &PushFilterThroughJoin, tree: &Arc<RelNode>) -> Vec<Arc<RelNode>> {
        let mut inference = PredicateInference::new();
        let views = MaterializedViewRegistry::new();
        let mut call = RuleCall::new(tree, &EmptyMetadata, &mut inference, &views);
        rule.on_match(&mut call).unwrap();
        call.into_transformed()
    }

    #[test]
    fn test_pushes_side_local_conjunct() {
        let join = RelNode::join(
            JoinKind::Inner,
            orders_scan(),
            customers_scan(),
            col("orders.cust_id").eq(col("customers.id")),
        )
        .unwrap();
        let tree = RelNode::filter(join, col("customers.id").eq(lit(5i64))).unwrap();

        let transformed = apply(&PushFilterThroughJoin, &tree);
        assert_eq!(transformed.len(), 1);

        let new_join = &transformed[0];
        assert_eq!(new_join.kind(), RelKind::Join);
        assert_eq!(new_join.row_type(), tree.row_type());
        // Filter landed on the customers side.
        assert_eq!(new_join.input(1).unwrap().kind(), RelKind::Filter);
        assert_eq!(new_join.input(0).unwrap().kind(), RelKind::Scan);
    }

    #[test]
    fn test_right_conjunct_not_pushed_below_left_join() {
        let join = RelNode::join(
            JoinKind::Left,
            orders_scan(),
            customers_scan(),
            col("orders.cust_id").eq(col("customers.id")),
        )
        .unwrap();
        let tree = RelNode::filter(join, col("customers.name").is_not_null()).unwrap();

        // The only conjunct references the null-extended side; nothing moves.
        assert!(apply(&PushFilterThroughJoin, &tree).is_empty());
    }

    #[test]
    fn test_cross_side_conjunct_merges_into_inner_condition() {
        let join = RelNode::join(
            JoinKind::Inner,
            orders_scan(),
            customers_scan(),
            col("orders.cust_id").eq(col("customers.id")),
        )
        .unwrap();
        let tree =
            RelNode::filter(join, col("orders.id").gt(col("customers.id"))).unwrap();

        let transformed = apply(&PushFilterThroughJoin, &tree);
        assert_eq!(transformed.len(), 1);
        assert_eq!(transformed[0].kind(), RelKind::Join);

        let RelOp::Join(j) = transformed[0].op() else {
            panic!("expected join");
        };
        assert_eq!(j.condition.conjuncts().len(), 2);
    }
}
