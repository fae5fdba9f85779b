//! Filter-merging rule.

use common_error::VeldResult;
use veld_algebra::{RelKind, RelNode, RelOp, ScalarExpr};

use super::rule::{OperandPattern, Rule, RuleCall};

/// Collapse a filter stacked directly on another filter into a single
/// filter over the conjunction of both predicates.
pub struct MergeFilters;

impl Rule for MergeFilters {
    fn name(&self) -> &'static str {
        "MergeFilters"
    }

    fn description(&self) -> &'static str {
        "Collapse Filter(Filter(x)) into one conjunctive filter"
    }

    fn pattern(&self) -> OperandPattern {
        OperandPattern::Exact(
            RelKind::Filter,
            vec![OperandPattern::AnyInputs(RelKind::Filter)],
        )
    }

    fn on_match(&self, call: &mut RuleCall<'_>) -> VeldResult<()> {
        let (RelOp::Filter(outer), RelOp::Filter(inner)) =
            (call.node().op(), call.input(0)?.op())
        else {
            return Ok(());
        };

        let grandchild = call.input(0)?.input(0)?.clone();

        // Inner conjuncts first: evaluation order mirrors tree order.
        let mut conjuncts = inner.predicate.conjuncts();
        for conjunct in outer.predicate.conjuncts() {
            let canon = conjunct.to_string();
            if !conjuncts.iter().any(|c| c.to_string() == canon) {
                conjuncts.push(conjunct);
            }
        }

        let merged = RelNode::filter(grandchild, ScalarExpr::combine_conjuncts(conjuncts))?;
        call.transform_to(merged);
        Ok(())
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

    #[test]
    fn test_merges_stacked_filters() {
        let scan = RelNode::scan(
            ScanRel::table(["orders"]),
            RowType::new(vec![Field::new("cust_id", DataType::Int64)]),
        )
        .unwrap();
        let inner = RelNode::filter(scan, col("cust_id").gt(lit(0i64))).unwrap();
        let outer = RelNode::filter(inner, col("cust_id").lt(lit(100i64))).unwrap();

        let rule = MergeFilters;
        assert!(rule.pattern().matches(&outer));

        let mut inference = PredicateInference::new();
        let views = MaterializedViewRegistry::new();
        let mut call = RuleCall::new(&outer, &EmptyMetadata, &mut inference, &views);
        rule.on_match(&mut call).unwrap();

        let transformed = call.into_transformed();
        assert_eq!(transformed.len(), 1);
        let merged = &transformed[0];
        assert_eq!(merged.kind(), RelKind::Filter);
        assert_eq!(merged.node_count(), 2);
        assert_eq!(merged.row_type(), outer.row_type());

        let RelOp::Filter(f) = merged.op() else {
            panic!("expected filter");
        };
        assert_eq!(f.predicate.conjuncts().len(), 2);
    }
}
