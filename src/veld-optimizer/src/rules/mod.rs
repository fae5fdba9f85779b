//! Rewrite rules for veld algebra trees.
//!
//! Every rule preserves semantic equivalence: the replacement it registers
//! produces the same relation (same row type, same rows) as the subtree it
//! matched. The stock set covers:
//!
//! - **MergeFilters**: collapse stacked filters
//! - **PruneTrivialFilter**: drop literal-TRUE filters
//! - **PushFilterThroughJoin**: move filters below joins where sound
//! - **TransitivePredicates**: push predicates inferred across join
//!   equalities
//! - **MaterializedViewSubstitution**: replace subtrees with view scans
//!
//! Rules are stateless values shared across planning sessions; all working
//! state lives in the session's `RuleCall`.

mod materialized_view;
mod merge_filters;
mod prune_trivial_filter;
mod push_filter_through_join;
mod rule;
mod transitive_predicates;

use std::sync::Arc;

pub use materialized_view::MaterializedViewSubstitution;
pub use merge_filters::MergeFilters;
pub use prune_trivial_filter::PruneTrivialFilter;
pub use push_filter_through_join::PushFilterThroughJoin;
pub use rule::{OperandPattern, Rule, RuleCall};
pub use transitive_predicates::TransitivePredicates;

/// The standard rule set, in deterministic application order.
pub fn standard_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(MergeFilters),
        Arc::new(PruneTrivialFilter),
        Arc::new(PushFilterThroughJoin),
        Arc::new(TransitivePredicates),
        Arc::new(MaterializedViewSubstitution),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_rules_have_unique_names() {
        let rules = standard_rules();
        let mut names: Vec<_> = rules.iter().map(|r| r.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), rules.len());
    }
}
