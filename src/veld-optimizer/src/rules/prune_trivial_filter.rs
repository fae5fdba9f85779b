//! Trivial-filter pruning rule.

use common_error::VeldResult;
use veld_algebra::{RelKind, RelOp};

use super::rule::{OperandPattern, Rule, RuleCall};

/// Remove a filter whose predicate is the literal TRUE.
pub struct PruneTrivialFilter;

impl Rule for PruneTrivialFilter {
    fn name(&self) -> &'static str {
        "PruneTrivialFilter"
    }

    fn description(&self) -> &'static str {
        "Drop Filter(TRUE) nodes"
    }

    fn pattern(&self) -> OperandPattern {
        OperandPattern::AnyInputs(RelKind::Filter)
    }

    fn on_match(&self, call: &mut RuleCall<'_>) -> VeldResult<()> {
        let RelOp::Filter(filter) = call.node().op() else {
            return Ok(());
        };
        if filter.predicate.is_literal_true() {
            let input = call.input(0)?.clone();
            call.transform_to(input);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::EmptyMetadata;
    use crate::predicates::PredicateInference;
    use crate::views::MaterializedViewRegistry;
    use veld_algebra::{col, lit, RelNode, ScanRel};
    use veld_core::{DataType, Field, RowType};

    #[test]
    fn test_prunes_true_filter_only() {
        let scan = RelNode::scan(
            ScanRel::table(["orders"]),
            RowType::new(vec![Field::new("cust_id", DataType::Int64)]),
        )
        .unwrap();
        let trivial = RelNode::filter(scan.clone(), lit(true)).unwrap();
        let real = RelNode::filter(scan.clone(), col("cust_id").eq(lit(5i64))).unwrap();

        let rule = PruneTrivialFilter;
        let mut inference = PredicateInference::new();
        let views = MaterializedViewRegistry::new();

        let mut call = RuleCall::new(&trivial, &EmptyMetadata, &mut inference, &views);
        rule.on_match(&mut call).unwrap();
        let transformed = call.into_transformed();
        assert_eq!(transformed.len(), 1);
        assert_eq!(transformed[0].digest(), scan.digest());

        let mut call = RuleCall::new(&real, &EmptyMetadata, &mut inference, &views);
        rule.on_match(&mut call).unwrap();
        assert!(call.into_transformed().is_empty());
    }
}
