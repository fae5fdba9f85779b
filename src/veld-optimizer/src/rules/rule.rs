//! The rule trait, operand patterns, and the rule-call capability.
//!
//! A rule is a stateless, side-effect-free value: it declares the node
//! shape it matches and, when invoked on a match, registers zero or more
//! equivalent replacement trees through its `RuleCall`. Rule instances are
//! shared by immutable reference across concurrent planning sessions.

use std::sync::Arc;

use common_error::VeldResult;
use veld_algebra::{RelKind, RelNode, ScalarExpr};

use crate::metadata::MetadataProvider;
use crate::predicates::{PredicateInference, PredicateList};
use crate::views::MaterializedViewRegistry;

/// The node-kind shape a rule matches against the expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperandPattern {
    /// A node of the given kind whose children match the given patterns
    /// positionally (arity must agree).
    Exact(RelKind, Vec<OperandPattern>),
    /// A node of the given kind with any children.
    AnyInputs(RelKind),
    /// Any node.
    Any,
    /// Any node without inputs.
    Leaf,
}

impl OperandPattern {
    /// Check whether a subtree matches this pattern.
    pub fn matches(&self, node: &RelNode) -> bool {
        match self {
            Self::Any => true,
            Self::Leaf => node.is_leaf(),
            Self::AnyInputs(kind) => node.kind() == *kind,
            Self::Exact(kind, children) => {
                node.kind() == *kind
                    && node.inputs().len() == children.len()
                    && node
                        .inputs()
                        .iter()
                        .zip(children.iter())
                        .all(|(input, pattern)| pattern.matches(input))
            }
        }
    }
}

/// Capability object handed to a rule body on a match.
///
/// Provides the matched subtree, the metadata collaborator, the session's
/// predicate-inference engine, the materialized-view registry, and the
/// `transform_to` registration method.
pub struct RuleCall<'a> {
    node: &'a Arc<RelNode>,
    metadata: &'a dyn MetadataProvider,
    inference: &'a mut PredicateInference,
    views: &'a MaterializedViewRegistry,
    transformed: Vec<Arc<RelNode>>,
}

impl<'a> RuleCall<'a> {
    pub(crate) fn new(
        node: &'a Arc<RelNode>,
        metadata: &'a dyn MetadataProvider,
        inference: &'a mut PredicateInference,
        views: &'a MaterializedViewRegistry,
    ) -> Self {
        Self {
            node,
            metadata,
            inference,
            views,
            transformed: Vec::new(),
        }
    }

    /// The matched subtree root.
    pub const fn node(&self) -> &Arc<RelNode> {
        self.node
    }

    /// A child of the matched subtree root.
    pub fn input(&self, index: usize) -> VeldResult<&Arc<RelNode>> {
        self.node.input(index)
    }

    /// The catalog-statistics collaborator.
    pub fn metadata(&self) -> &dyn MetadataProvider {
        self.metadata
    }

    /// The materialized views available for substitution.
    pub const fn views(&self) -> &MaterializedViewRegistry {
        self.views
    }

    /// Pulled-up predicates of a subtree, cached for this session.
    pub fn pulled_up(&mut self, node: &Arc<RelNode>) -> VeldResult<Vec<ScalarExpr>> {
        self.inference.pulled_up(node)
    }

    /// Full predicate snapshot of a subtree, including join inference.
    pub fn predicates(&mut self, node: &Arc<RelNode>) -> VeldResult<PredicateList> {
        self.inference.predicates(node)
    }

    /// Register a replacement tree as equivalent to the matched subtree.
    ///
    /// The replacement must produce the matched subtree's row type; the
    /// engine rejects (and logs) anything else as a rule contract
    /// violation.
    pub fn transform_to(&mut self, tree: Arc<RelNode>) {
        self.transformed.push(tree);
    }

    pub(crate) fn into_transformed(self) -> Vec<Arc<RelNode>> {
        self.transformed
    }
}

/// An equivalence-preserving transformation rule.
pub trait Rule: Send + Sync {
    /// Get the name of this rule.
    fn name(&self) -> &'static str;

    /// Get a description of what this rule does.
    fn description(&self) -> &'static str {
        "No description available"
    }

    /// The operand pattern this rule matches.
    fn pattern(&self) -> OperandPattern;

    /// Invoke the rule body on a matched subtree.
    ///
    /// Registering nothing means the rule does not apply to this match; an
    /// error is recovered by the engine (the match is skipped and logged).
    fn on_match(&self, call: &mut RuleCall<'_>) -> VeldResult<()>;
}
