//! Rule-based relational-algebra optimizer for veld.
//!
//! The optimizer takes an immutable algebra tree, explores equivalent
//! alternatives by applying pattern-matched rewrite rules, and selects the
//! lowest-cost alternative satisfying the caller's required physical
//! traits. Predicate inference derives pushable filters across join
//! equalities, and structurally matching subtrees can be replaced by scans
//! of registered materialized views.
//!
//! # Modules
//!
//! - [`rules`]: the rule trait, operand patterns, and the stock rule set
//! - [`planner`](Planner): the session-local search engine
//! - [`cost`](CostModel): bottom-up cost estimation
//! - [`predicates`](PredicateInference): pull-up and transitive inference
//! - [`views`]: view expansion contexts and the materialized-view registry
//! - [`metadata`](MetadataProvider): catalog-statistics interfaces

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

mod cost;
mod metadata;
mod planner;
mod predicates;
pub mod rules;
mod views;

pub use cost::{cost_with_memo, Cost, CostModel, DefaultCostModel, DEFAULT_ROW_COUNT};
pub use metadata::{
    ColumnStatistics, EmptyMetadata, FixedMetadata, MetadataProvider, TableStatistics,
};
pub use planner::{Best, CancelPolicy, Planner, PlannerConfig, PlannerState};
pub use predicates::{PredicateInference, PredicateList};
pub use rules::{standard_rules, OperandPattern, Rule, RuleCall};
pub use views::{
    ExpandFn, MaterializedView, MaterializedViewRegistry, NoViewExpansion, PlanningCluster,
    ResolvedView, ViewExpander, ViewExpansionContext, ViewResolver,
};

use std::sync::Arc;

use common_error::VeldResult;
use veld_algebra::RelNode;
use veld_core::TraitSet;

/// Optimize a tree with the standard rule set and default configuration.
pub fn optimize(
    initial: Arc<RelNode>,
    metadata: Arc<dyn MetadataProvider>,
) -> VeldResult<Best> {
    let planner = Planner::new(standard_rules(), metadata);
    planner.optimize(initial, &TraitSet::any())
}
