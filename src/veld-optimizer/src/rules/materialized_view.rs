//! Materialized-view substitution rule.

use common_error::VeldResult;
use veld_algebra::{MutableNode, RelNode, ScanRel};

use super::rule::{OperandPattern, Rule, RuleCall};

/// Replace a subtree structurally equivalent to a registered view's
/// definition with a scan of that view.
///
/// Matching uses the trait-blind mutable-tree normal form; the engine
/// matches this rule at every position, so subtree containment falls out
/// of operand matching rather than a bespoke walk. The substituted scan
/// carries the replaced subtree's row type verbatim, preserving field
/// order.
pub struct MaterializedViewSubstitution;

impl Rule for MaterializedViewSubstitution {
    fn name(&self) -> &'static str {
        "MaterializedViewSubstitution"
    }

    fn description(&self) -> &'static str {
        "Replace subtrees matching a registered view with a view scan"
    }

    fn pattern(&self) -> OperandPattern {
        OperandPattern::Any
    }

    fn on_match(&self, call: &mut RuleCall<'_>) -> VeldResult<()> {
        if call.views().is_empty() {
            return Ok(());
        }

        let normalized = MutableNode::from_rel(call.node());
        let matched = call
            .views()
            .find_match(&normalized)
            .map(|view| view.name.clone());

        if let Some(name) = matched {
            let row_type = call.node().row_type().clone();
            let scan = RelNode::view_scan(ScanRel::table(name), row_type)?;
            // Substituting a node that already is the view scan would spin.
            if scan.digest() != call.node().digest() {
                call.transform_to(scan);
            }
        }
        Ok(())
    }
}
