//! Transitive predicate pushdown rule.

use std::sync::Arc;

use common_error::VeldResult;
use veld_algebra::{RelKind, RelNode, RelOp, ScalarExpr};

use super::rule::{OperandPattern, Rule, RuleCall};

/// Push predicates one join side can infer from the other through the
/// equality conjuncts of the join condition.
///
/// When inference yields nothing for either side this rule is a no-op: it
/// never fabricates a trivial filter.
pub struct TransitivePredicates;

impl Rule for TransitivePredicates {
    fn name(&self) -> &'static str {
        "TransitivePredicates"
    }

    fn description(&self) -> &'static str {
        "Push inferred equi-join predicates onto join inputs"
    }

    fn pattern(&self) -> OperandPattern {
        OperandPattern::AnyInputs(RelKind::Join)
    }

    fn on_match(&self, call: &mut RuleCall<'_>) -> VeldResult<()> {
        let node = call.node().clone();
        let predicates = call.predicates(&node)?;
        if !predicates.has_inferences() {
            return Ok(());
        }

        let RelOp::Join(join) = node.op() else {
            return Ok(());
        };

        let new_left = wrap_inferred(node.input(0)?.clone(), predicates.left_inferred)?;
        let new_right = wrap_inferred(node.input(1)?.clone(), predicates.right_inferred)?;
        let replacement = RelNode::join(join.kind, new_left, new_right, join.condition.clone())?;
        call.transform_to(replacement);
        Ok(())
    }
}

fn wrap_inferred(
    input: Arc<RelNode>,
    inferred: Vec<ScalarExpr>,
) -> VeldResult<Arc<RelNode>> {
    if inferred.is_empty() {
        Ok(input)
    } else {
        RelNode::filter(input, ScalarExpr::combine_conjuncts(inferred))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::EmptyMetadata;
    use crate::predicates::PredicateInference;
    use crate::views::MaterializedViewRegistry;
    use veld_algebra::{col, lit, JoinKind, ScanRel};
    use veld_core::{DataType, Field, RowType};

    fn scan(name: &str, columns: &[&str]) -> Arc<RelNode> {
        RelNode::scan(
            ScanRel::table([name]),
            RowType::new(
                columns
                    .iter()
                    .map(|c| Field::new(*c, DataType::Int64))
                    .collect(),
            ),
        )
        .unwrap()
    }

    fn apply(tree: &Arc<RelNode>) -> Vec<Arc<RelNode>> {
        let mut inference = PredicateInference::new();
        let views = MaterializedViewRegistry::new();
        let mut call = RuleCall::new(tree, &EmptyMetadata, &mut inference, &views);
        TransitivePredicates.on_match(&mut call).unwrap();
        call.into_transformed()
    }

    #[test]
    fn test_pushes_inferred_predicate() {
        let left = scan("orders", &["id", "cust_id"]);
        let right = RelNode::filter(
            scan("customers", &["id"]),
            col("id").eq(lit(5i64)),
        )
        .unwrap();
        let join = RelNode::join(
            JoinKind::Inner,
            left,
            right,
            col("orders.cust_id").eq(col("customers.id")),
        )
        .unwrap();

        let transformed = apply(&join);
        assert_eq!(transformed.len(), 1);

        let new_left = transformed[0].input(0).unwrap();
        assert_eq!(new_left.kind(), RelKind::Filter);
        let RelOp::Filter(f) = new_left.op() else {
            panic!("expected filter");
        };
        assert_eq!(f.predicate.to_string(), "(orders.cust_id = Int64(5))");
    }

    #[test]
    fn test_noop_without_inferences() {
        let join = RelNode::join(
            JoinKind::Inner,
            scan("orders", &["id", "cust_id"]),
            scan("customers", &["id"]),
            col("orders.cust_id").eq(col("customers.id")),
        )
        .unwrap();

        assert!(apply(&join).is_empty());
    }
}
