//! The immutable algebra node.
//!
//! A `RelNode` is constructed once, validated at construction, and never
//! mutated; every rewrite builds a new node over `Arc`-shared children.
//! Structural identity is a canonical string digest over operator kind,
//! payload, and child digests. Physical traits are deliberately excluded
//! from the digest so that logically identical alternatives collapse into
//! one search node regardless of their trait sets.

use std::sync::Arc;

use common_error::{ensure, VeldError, VeldResult};
use serde::{Deserialize, Serialize};
use veld_core::{ColumnRef, DataType, Field, RowType, TraitSet};

use crate::expr::ScalarExpr;

use super::{AggregateRel, FilterRel, JoinKind, JoinRel, ProjectRel, ScanRel, SetRel};

/// Operator kind discriminant, used by operand patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelKind {
    /// Base relation scan.
    Scan,
    /// Projection.
    Project,
    /// Predicate filter.
    Filter,
    /// Join of two inputs.
    Join,
    /// Bag/set union.
    Union,
    /// Bag/set difference.
    Minus,
    /// Stream delta marker.
    Delta,
    /// Grouped aggregation.
    Aggregate,
}

/// Operator-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelOp {
    /// Base relation scan.
    Scan(ScanRel),
    /// Projection.
    Project(ProjectRel),
    /// Predicate filter.
    Filter(FilterRel),
    /// Join of two inputs.
    Join(JoinRel),
    /// Bag/set union.
    Union(SetRel),
    /// Bag/set difference.
    Minus(SetRel),
    /// Stream delta marker.
    Delta,
    /// Grouped aggregation.
    Aggregate(AggregateRel),
}

impl RelOp {
    /// The operator kind.
    pub const fn kind(&self) -> RelKind {
        match self {
            Self::Scan(_) => RelKind::Scan,
            Self::Project(_) => RelKind::Project,
            Self::Filter(_) => RelKind::Filter,
            Self::Join(_) => RelKind::Join,
            Self::Union(_) => RelKind::Union,
            Self::Minus(_) => RelKind::Minus,
            Self::Delta => RelKind::Delta,
            Self::Aggregate(_) => RelKind::Aggregate,
        }
    }

    /// The operator name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Scan(_) => "Scan",
            Self::Project(_) => "Project",
            Self::Filter(_) => "Filter",
            Self::Join(_) => "Join",
            Self::Union(_) => "Union",
            Self::Minus(_) => "Minus",
            Self::Delta => "Delta",
            Self::Aggregate(_) => "Aggregate",
        }
    }

    /// Canonical payload rendering used by the digest.
    pub fn canon(&self) -> String {
        match self {
            Self::Scan(op) => op.to_string(),
            Self::Project(op) => op.to_string(),
            Self::Filter(op) => op.to_string(),
            Self::Join(op) => op.to_string(),
            Self::Union(op) | Self::Minus(op) => op.to_string(),
            Self::Delta => String::new(),
            Self::Aggregate(op) => op.to_string(),
        }
    }

    /// Expected number of inputs for this operator.
    pub const fn arity(&self) -> usize {
        match self {
            Self::Scan(_) => 0,
            Self::Project(_) | Self::Filter(_) | Self::Delta | Self::Aggregate(_) => 1,
            Self::Join(_) | Self::Union(_) | Self::Minus(_) => 2,
        }
    }
}

/// An immutable relational algebra node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelNode {
    op: RelOp,
    inputs: Vec<Arc<RelNode>>,
    row_type: RowType,
    traits: TraitSet,
    digest: String,
}

impl RelNode {
    fn new_internal(op: RelOp, inputs: Vec<Arc<Self>>, row_type: RowType) -> Arc<Self> {
        let digest = Self::compute_digest(&op, &inputs, &row_type);
        Arc::new(Self {
            op,
            inputs,
            row_type,
            traits: TraitSet::logical(),
            digest,
        })
    }

    fn compute_digest(op: &RelOp, inputs: &[Arc<Self>], row_type: &RowType) -> String {
        if inputs.is_empty() {
            // Leaves fold their row type in: two scans of different shape
            // must never collapse into one search node.
            format!("{}({}; {})", op.name(), op.canon(), row_type)
        } else {
            let children: Vec<&str> = inputs.iter().map(|i| i.digest.as_str()).collect();
            format!("{}({})[{}]", op.name(), op.canon(), children.join(", "))
        }
    }

    // ========== Constructors ==========

    /// Create a scan node over a base relation.
    ///
    /// Output fields are qualified by the scan's alias (or the relation
    /// name) so that join outputs stay resolvable.
    pub fn scan(scan: ScanRel, row_type: RowType) -> VeldResult<Arc<Self>> {
        ensure!(
            row_type.field_count() > 0,
            SchemaError: "scan of {} has an empty row type", scan.table_path()
        );
        let qualified = match scan.qualifier() {
            Some(q) => row_type.qualify(q),
            None => row_type,
        };
        Ok(Self::new_internal(RelOp::Scan(scan), vec![], qualified))
    }

    /// Create a scan node whose output row type is taken verbatim, without
    /// re-qualifying fields.
    ///
    /// Used when a subtree is replaced by a scan of a materialized view:
    /// the replacement must preserve the replaced subtree's row type and
    /// field order exactly.
    pub fn view_scan(scan: ScanRel, row_type: RowType) -> VeldResult<Arc<Self>> {
        ensure!(
            row_type.field_count() > 0,
            SchemaError: "scan of {} has an empty row type", scan.table_path()
        );
        Ok(Self::new_internal(RelOp::Scan(scan), vec![], row_type))
    }

    /// Create a filter node.
    pub fn filter(input: Arc<Self>, predicate: ScalarExpr) -> VeldResult<Arc<Self>> {
        let predicate_type = predicate.resolve_type(input.row_type())?;
        ensure!(
            matches!(predicate_type, DataType::Bool | DataType::Null),
            TypeError: "filter predicate {predicate} has type {predicate_type}, expected Bool"
        );
        let row_type = input.row_type().clone();
        Ok(Self::new_internal(
            RelOp::Filter(FilterRel::new(predicate)),
            vec![input],
            row_type,
        ))
    }

    /// Create a project node; the output row type is derived from the
    /// expression list at construction time.
    pub fn project(input: Arc<Self>, project: ProjectRel) -> VeldResult<Arc<Self>> {
        ensure!(
            project.exprs.len() == project.names.len(),
            SchemaError: "project has {} expressions but {} names",
            project.exprs.len(),
            project.names.len()
        );
        let mut fields = Vec::with_capacity(project.exprs.len());
        for (expr, name) in project.exprs.iter().zip(project.names.iter()) {
            let data_type = expr.resolve_type(input.row_type())?;
            let field = match expr.as_column() {
                Some(column) => {
                    let source = input.row_type().resolve(column)?;
                    Field::new(name.clone(), data_type)
                        .with_nullable(source.nullable)
                        .with_qualifier_opt(source.qualifier.clone())
                }
                None => Field::new(name.clone(), data_type),
            };
            fields.push(field);
        }
        Ok(Self::new_internal(
            RelOp::Project(project),
            vec![input],
            RowType::new(fields),
        ))
    }

    /// Create a join node.
    ///
    /// The output row type concatenates both sides (null-extended sides
    /// become nullable); semi and anti joins emit only the left side.
    pub fn join(
        kind: JoinKind,
        left: Arc<Self>,
        right: Arc<Self>,
        condition: ScalarExpr,
    ) -> VeldResult<Arc<Self>> {
        let combined = left.row_type().concat(right.row_type());
        let condition_type = condition.resolve_type(&combined)?;
        ensure!(
            matches!(condition_type, DataType::Bool | DataType::Null),
            TypeError: "join condition {condition} has type {condition_type}, expected Bool"
        );

        let row_type = if kind.emits_right_columns() {
            let left_side = if kind.null_extends_left() {
                left.row_type().as_nullable()
            } else {
                left.row_type().clone()
            };
            let right_side = if kind.null_extends_right() {
                right.row_type().as_nullable()
            } else {
                right.row_type().clone()
            };
            left_side.concat(&right_side)
        } else {
            left.row_type().clone()
        };

        Ok(Self::new_internal(
            RelOp::Join(JoinRel::new(kind, condition)),
            vec![left, right],
            row_type,
        ))
    }

    /// Create a union node.
    pub fn union(left: Arc<Self>, right: Arc<Self>, set: SetRel) -> VeldResult<Arc<Self>> {
        Self::set_op(RelOp::Union(set), left, right)
    }

    /// Create a minus (except) node.
    pub fn minus(left: Arc<Self>, right: Arc<Self>, set: SetRel) -> VeldResult<Arc<Self>> {
        Self::set_op(RelOp::Minus(set), left, right)
    }

    fn set_op(op: RelOp, left: Arc<Self>, right: Arc<Self>) -> VeldResult<Arc<Self>> {
        ensure!(
            left.row_type().is_compatible_with(right.row_type()),
            SchemaError: "{} inputs have incompatible row types {} and {}",
            op.name(),
            left.row_type(),
            right.row_type()
        );
        let row_type = if matches!(op, RelOp::Union(_)) {
            // A union row is nullable if either branch's field is.
            RowType::new(
                left.row_type()
                    .fields()
                    .iter()
                    .zip(right.row_type().fields())
                    .map(|(l, r)| l.clone().with_nullable(l.nullable || r.nullable))
                    .collect(),
            )
        } else {
            left.row_type().clone()
        };
        Ok(Self::new_internal(op, vec![left, right], row_type))
    }

    /// Create a delta node marking a stream-delta subtree.
    pub fn delta(input: Arc<Self>) -> VeldResult<Arc<Self>> {
        let row_type = input.row_type().clone();
        Ok(Self::new_internal(RelOp::Delta, vec![input], row_type))
    }

    /// Create an aggregate node.
    pub fn aggregate(input: Arc<Self>, aggregate: AggregateRel) -> VeldResult<Arc<Self>> {
        let mut fields = Vec::with_capacity(aggregate.group_keys.len() + aggregate.calls.len());
        for key in &aggregate.group_keys {
            fields.push(input.row_type().resolve(key)?.clone());
        }
        for call in &aggregate.calls {
            let arg_type = match &call.arg {
                Some(arg) => Some(input.row_type().resolve(arg)?.data_type.clone()),
                None => None,
            };
            fields.push(
                Field::new(call.output_name(), call.result_type(arg_type.as_ref()))
                    .with_nullable(call.nullable()),
            );
        }
        Ok(Self::new_internal(
            RelOp::Aggregate(aggregate),
            vec![input],
            RowType::new(fields),
        ))
    }

    // ========== Accessors ==========

    /// Operator payload.
    pub const fn op(&self) -> &RelOp {
        &self.op
    }

    /// Operator kind.
    pub const fn kind(&self) -> RelKind {
        self.op.kind()
    }

    /// Child nodes.
    pub fn inputs(&self) -> &[Arc<Self>] {
        &self.inputs
    }

    /// Child node at an index.
    pub fn input(&self, index: usize) -> VeldResult<&Arc<Self>> {
        self.inputs.get(index).ok_or_else(|| {
            VeldError::internal(format!(
                "{} node has {} inputs, requested index {index}",
                self.op.name(),
                self.inputs.len()
            ))
        })
    }

    /// Whether this node has no inputs.
    pub fn is_leaf(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Output row type.
    pub const fn row_type(&self) -> &RowType {
        &self.row_type
    }

    /// Physical trait set.
    pub const fn traits(&self) -> &TraitSet {
        &self.traits
    }

    /// Canonical digest: two nodes are structurally equal iff their digests
    /// are equal. Traits are excluded.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self.inputs.iter().map(|i| i.node_count()).sum::<usize>()
    }

    // ========== Copy contract ==========

    /// Copy this node with new children, preserving the payload and traits.
    ///
    /// The row type is re-derived through the ordinary constructor, so a
    /// child substitution that breaks an invariant fails here rather than
    /// producing an inconsistent node.
    pub fn with_children(self: &Arc<Self>, children: Vec<Arc<Self>>) -> VeldResult<Arc<Self>> {
        ensure!(
            children.len() == self.op.arity(),
            PlanError: "{} expects {} inputs, got {}",
            self.op.name(),
            self.op.arity(),
            children.len()
        );
        let mut children = children;
        let rebuilt = match &self.op {
            RelOp::Scan(_) => return Ok(Arc::clone(self)),
            RelOp::Project(p) => Self::project(children.remove(0), p.clone())?,
            RelOp::Filter(f) => Self::filter(children.remove(0), f.predicate.clone())?,
            RelOp::Join(j) => {
                let left = children.remove(0);
                let right = children.remove(0);
                Self::join(j.kind, left, right, j.condition.clone())?
            }
            RelOp::Union(s) => {
                let left = children.remove(0);
                let right = children.remove(0);
                Self::union(left, right, *s)?
            }
            RelOp::Minus(s) => {
                let left = children.remove(0);
                let right = children.remove(0);
                Self::minus(left, right, *s)?
            }
            RelOp::Delta => Self::delta(children.remove(0))?,
            RelOp::Aggregate(a) => Self::aggregate(children.remove(0), a.clone())?,
        };
        if self.traits == TraitSet::logical() {
            Ok(rebuilt)
        } else {
            Ok(rebuilt.with_traits(self.traits.clone()))
        }
    }

    /// Copy this node with a new trait set. Payload, children, row type,
    /// and digest are unchanged.
    pub fn with_traits(self: &Arc<Self>, traits: TraitSet) -> Arc<Self> {
        Arc::new(Self {
            op: self.op.clone(),
            inputs: self.inputs.clone(),
            row_type: self.row_type.clone(),
            traits,
            digest: self.digest.clone(),
        })
    }

    // ========== Structural comparison ==========

    /// Deep structural equality, independent of the digest machinery.
    ///
    /// `PartialEq` compares digests; this walks the tree field by field and
    /// exists so the digest's soundness is itself checkable.
    pub fn structural_eq(&self, other: &Self) -> bool {
        self.op == other.op
            && self.row_type == other.row_type
            && self.inputs.len() == other.inputs.len()
            && self
                .inputs
                .iter()
                .zip(other.inputs.iter())
                .all(|(a, b)| a.structural_eq(b))
    }

    // ========== Rendering ==========

    /// Tree-formatted explanation of this subtree.
    pub fn explain(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        let mut out = format!("{prefix}{}", self.explain_self());
        for input in &self.inputs {
            out.push('\n');
            out.push_str(&input.explain(indent + 1));
        }
        out
    }

    fn explain_self(&self) -> String {
        let payload = self.op.canon();
        if payload.is_empty() {
            self.op.name().to_string()
        } else {
            format!("{}({payload})", self.op.name())
        }
    }
}

impl PartialEq for RelNode {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest
    }
}

impl Eq for RelNode {}

impl std::hash::Hash for RelNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.digest.hash(state);
    }
}

impl std::fmt::Display for RelNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.explain(0))
    }
}

/// Collect equality conjuncts of a join condition as column pairs.
///
/// Only `column = column` conjuncts qualify; everything else is left to the
/// caller as a residual conjunct.
pub fn equi_conjuncts(condition: &ScalarExpr) -> Vec<(ColumnRef, ColumnRef)> {
    use crate::expr::BinaryOp;

    condition
        .conjuncts()
        .into_iter()
        .filter_map(|conjunct| match conjunct {
            ScalarExpr::Binary {
                left,
                op: BinaryOp::Eq,
                right,
            } => match (left.as_column(), right.as_column()) {
                (Some(l), Some(r)) => Some((l.clone(), r.clone())),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{col, lit};
    use veld_core::Convention;

    fn orders_scan() -> Arc<RelNode> {
        RelNode::scan(
            ScanRel::table(["orders"]),
            RowType::new(vec![
                Field::new("id", DataType::Int64).with_nullable(false),
                Field::new("cust_id", DataType::Int64),
            ]),
        )
        .unwrap()
    }

    fn customers_scan() -> Arc<RelNode> {
        RelNode::scan(
            ScanRel::table(["customers"]),
            RowType::new(vec![
                Field::new("id", DataType::Int64).with_nullable(false),
                Field::new("name", DataType::String),
            ]),
        )
        .unwrap()
    }

    #[test]
    fn test_scan_qualifies_fields() {
        let scan = orders_scan();
        assert_eq!(scan.row_type().fields()[0].qualified_name(), "orders.id");
        assert!(scan.is_leaf());
    }

    #[test]
    fn test_filter_construction_validates() {
        let scan = orders_scan();
        let ok = RelNode::filter(Arc::clone(&scan), col("cust_id").eq(lit(5i64)));
        assert!(ok.is_ok());

        let missing = RelNode::filter(Arc::clone(&scan), col("nope").eq(lit(5i64)));
        assert!(matches!(missing, Err(VeldError::ColumnNotFound(_))));

        let not_bool = RelNode::filter(scan, col("cust_id").add_expr(lit(1i64)));
        assert!(matches!(not_bool, Err(VeldError::TypeError(_))));
    }

    #[test]
    fn test_join_row_type_and_nullability() {
        let join = RelNode::join(
            JoinKind::Left,
            orders_scan(),
            customers_scan(),
            col("orders.cust_id").eq(col("customers.id")),
        )
        .unwrap();

        assert_eq!(join.row_type().field_count(), 4);
        // Right side of a left join is null-extended.
        assert!(join.row_type().fields()[2].nullable);
        assert!(!join.row_type().fields()[0].nullable);
    }

    #[test]
    fn test_semi_join_emits_left_only() {
        let join = RelNode::join(
            JoinKind::Semi,
            orders_scan(),
            customers_scan(),
            col("orders.cust_id").eq(col("customers.id")),
        )
        .unwrap();
        assert_eq!(join.row_type().field_count(), 2);
    }

    #[test]
    fn test_digest_ignores_traits() {
        let a = orders_scan();
        let b = a.with_traits(TraitSet::logical().with_convention(Convention::Batch));
        assert_eq!(a.digest(), b.digest());
        assert_eq!(*a, *b);
        assert_ne!(a.traits(), b.traits());
    }

    #[test]
    fn test_digest_distinguishes_payload() {
        let scan = orders_scan();
        let f1 = RelNode::filter(Arc::clone(&scan), col("cust_id").eq(lit(5i64))).unwrap();
        let f2 = RelNode::filter(scan, col("cust_id").eq(lit(6i64))).unwrap();
        assert_ne!(f1.digest(), f2.digest());
    }

    #[test]
    fn test_with_children_preserves_payload() {
        let join = RelNode::join(
            JoinKind::Inner,
            orders_scan(),
            customers_scan(),
            col("orders.cust_id").eq(col("customers.id")),
        )
        .unwrap();

        let filtered_left =
            RelNode::filter(orders_scan(), col("cust_id").eq(lit(5i64))).unwrap();
        let rebuilt = join
            .with_children(vec![filtered_left, customers_scan()])
            .unwrap();

        assert_eq!(rebuilt.kind(), RelKind::Join);
        assert_eq!(rebuilt.row_type(), join.row_type());
        assert_ne!(rebuilt.digest(), join.digest());
    }

    #[test]
    fn test_union_requires_compatible_rows() {
        let result = RelNode::union(orders_scan(), customers_scan(), SetRel::all());
        assert!(matches!(result, Err(VeldError::SchemaError(_))));
    }

    #[test]
    fn test_equi_conjuncts() {
        let condition = col("a.x")
            .eq(col("b.y"))
            .and(col("a.z").gt(lit(5i64)))
            .and(col("a.w").eq(col("b.v")));
        let pairs = equi_conjuncts(&condition);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, ColumnRef::parse("a.x"));
        assert_eq!(pairs[1].1, ColumnRef::parse("b.v"));
    }
}
