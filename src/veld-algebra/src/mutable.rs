//! The mutable-tree representation used for structural equivalence.
//!
//! `MutableNode` is a simplified mirror of `RelNode` used transiently when
//! testing whether two subtrees compute the same relation, primarily for
//! materialized-view substitution. Equality and hashing are structural and
//! ignore physical traits entirely; payload lists compare by canonical
//! expression strings, so two expressions that serialize identically match
//! even when they were built through different code paths.

use common_error::{ensure, VeldResult};
use serde::{Deserialize, Serialize};
use veld_core::RowType;

use crate::rel::{RelKind, RelNode, RelOp};

/// A trait-blind structural mirror of a plan subtree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MutableNode {
    kind: RelKind,
    row_type: RowType,
    payload: Vec<String>,
    inputs: Vec<MutableNode>,
}

impl MutableNode {
    /// Construct a node from validated, type-compatible children.
    ///
    /// Payload arity must agree with the declared row type where the
    /// operator kind fixes that relationship (a projection has one payload
    /// entry per output field), and unary pass-through operators must carry
    /// their input's row type unchanged.
    pub fn of(
        kind: RelKind,
        row_type: RowType,
        payload: Vec<String>,
        inputs: Vec<MutableNode>,
    ) -> VeldResult<Self> {
        let arity = match kind {
            RelKind::Scan => 0,
            RelKind::Project | RelKind::Filter | RelKind::Delta | RelKind::Aggregate => 1,
            RelKind::Join | RelKind::Union | RelKind::Minus => 2,
        };
        ensure!(
            inputs.len() == arity,
            SchemaError: "{kind:?} expects {arity} inputs, got {}", inputs.len()
        );

        match kind {
            RelKind::Scan => {
                ensure!(payload.len() == 1, SchemaError: "scan payload must be the relation path");
            }
            RelKind::Project => {
                ensure!(
                    payload.len() == row_type.field_count(),
                    TypeError: "project payload has {} entries for {} output fields",
                    payload.len(),
                    row_type.field_count()
                );
            }
            RelKind::Filter | RelKind::Delta => {
                ensure!(
                    payload.len() == usize::from(kind == RelKind::Filter),
                    SchemaError: "{kind:?} payload arity mismatch"
                );
                ensure!(
                    row_type == *inputs[0].row_type(),
                    TypeError: "{kind:?} must preserve its input row type"
                );
            }
            RelKind::Join => {
                ensure!(payload.len() == 2, SchemaError: "join payload must be kind and condition");
            }
            RelKind::Union | RelKind::Minus => {
                ensure!(payload.len() == 1, SchemaError: "set-op payload must be the bag/set flag");
                ensure!(
                    inputs[0].row_type().is_compatible_with(inputs[1].row_type()),
                    TypeError: "{kind:?} inputs have incompatible row types"
                );
            }
            RelKind::Aggregate => {
                ensure!(
                    payload.len() == row_type.field_count(),
                    TypeError: "aggregate payload has {} entries for {} output fields",
                    payload.len(),
                    row_type.field_count()
                );
            }
        }

        Ok(Self {
            kind,
            row_type,
            payload,
            inputs,
        })
    }

    /// Convert an (already validated) algebra subtree into its mutable
    /// mirror, dropping trait sets.
    pub fn from_rel(node: &RelNode) -> Self {
        let payload = match node.op() {
            RelOp::Scan(scan) => vec![scan.to_string()],
            RelOp::Project(project) => project
                .exprs
                .iter()
                .zip(project.names.iter())
                .map(|(expr, name)| format!("{expr} AS {name}"))
                .collect(),
            RelOp::Filter(filter) => vec![filter.predicate.to_string()],
            RelOp::Join(join) => vec![join.kind.name().to_string(), join.condition.to_string()],
            RelOp::Union(set) | RelOp::Minus(set) => vec![set.to_string()],
            RelOp::Delta => vec![],
            RelOp::Aggregate(aggregate) => aggregate
                .group_keys
                .iter()
                .map(ToString::to_string)
                .chain(aggregate.calls.iter().map(ToString::to_string))
                .collect(),
        };
        Self {
            kind: node.kind(),
            row_type: node.row_type().clone(),
            payload,
            inputs: node.inputs().iter().map(|i| Self::from_rel(i)).collect(),
        }
    }

    /// Operator kind.
    pub const fn kind(&self) -> RelKind {
        self.kind
    }

    /// Output row type.
    pub const fn row_type(&self) -> &RowType {
        &self.row_type
    }

    /// Child nodes.
    pub fn inputs(&self) -> &[MutableNode] {
        &self.inputs
    }

    /// Subtree containment: whether `other` equals this node or any node
    /// below it.
    pub fn contains(&self, other: &Self) -> bool {
        self == other || self.inputs.iter().any(|i| i.contains(other))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::expr::{col, lit};
    use crate::rel::ScanRel;
    use common_error::VeldError;
    use veld_core::{Convention, DataType, Field, TraitSet};

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

    #[test]
    fn test_equality_ignores_traits() {
        let filter = RelNode::filter(orders_scan(), col("cust_id").eq(lit(5i64))).unwrap();
        let retraited = filter.with_traits(TraitSet::logical().with_convention(Convention::Batch));

        assert_eq!(MutableNode::from_rel(&filter), MutableNode::from_rel(&retraited));
    }

    #[test]
    fn test_equality_distinguishes_payload() {
        let a = RelNode::filter(orders_scan(), col("cust_id").eq(lit(5i64))).unwrap();
        let b = RelNode::filter(orders_scan(), col("cust_id").eq(lit(6i64))).unwrap();
        assert_ne!(MutableNode::from_rel(&a), MutableNode::from_rel(&b));
    }

    #[test]
    fn test_containment() {
        let scan = orders_scan();
        let filter = RelNode::filter(Arc::clone(&scan), col("cust_id").eq(lit(5i64))).unwrap();

        let tree = MutableNode::from_rel(&filter);
        let sub = MutableNode::from_rel(&scan);
        assert!(tree.contains(&sub));
        assert!(!sub.contains(&tree));
    }

    #[test]
    fn test_of_validates_payload_arity() {
        let scan = MutableNode::from_rel(&orders_scan());
        let row = scan.row_type().clone();

        // A projection must carry one payload entry per output field.
        let bad = MutableNode::of(
            RelKind::Project,
            row,
            vec!["only one".to_string()],
            vec![scan],
        );
        assert!(matches!(bad, Err(VeldError::TypeError(_))));
    }

    #[test]
    fn test_of_validates_pass_through_row_type() {
        let scan = MutableNode::from_rel(&orders_scan());
        let wrong_row = RowType::new(vec![Field::new("other", DataType::String)]);

        let bad = MutableNode::of(
            RelKind::Filter,
            wrong_row,
            vec!["(x = Int64(1))".to_string()],
            vec![scan],
        );
        assert!(matches!(bad, Err(VeldError::TypeError(_))));
    }
}
