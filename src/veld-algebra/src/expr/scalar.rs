//! The scalar expression tree.

use std::collections::{HashMap, HashSet};

use common_error::{VeldError, VeldResult};
use serde::{Deserialize, Serialize};
use veld_core::{ColumnRef, DataType, RowType, Value};

use super::{BinaryOp, UnaryOp};

/// A scalar expression over columns and constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarExpr {
    /// A literal constant value.
    Literal(Value),

    /// A column reference (unqualified or qualified).
    Column(ColumnRef),

    /// A binary operation.
    Binary {
        /// Left operand.
        left: Box<Self>,
        /// Binary operator.
        op: BinaryOp,
        /// Right operand.
        right: Box<Self>,
    },

    /// A unary operation.
    Unary {
        /// Unary operator.
        op: UnaryOp,
        /// Operand.
        expr: Box<Self>,
    },
}

/// Create a column reference expression. Accepts `"name"` or `"rel.name"`.
pub fn col(name: &str) -> ScalarExpr {
    ScalarExpr::Column(ColumnRef::parse(name))
}

/// Create a qualified column reference expression.
pub fn qualified_col(qualifier: &str, name: &str) -> ScalarExpr {
    ScalarExpr::Column(ColumnRef::qualified(qualifier, name))
}

/// Create a literal expression.
pub fn lit(value: impl Into<Value>) -> ScalarExpr {
    ScalarExpr::Literal(value.into())
}

impl ScalarExpr {
    /// Create a binary expression.
    pub fn binary(left: Self, op: BinaryOp, right: Self) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create a unary expression.
    pub fn unary(op: UnaryOp, expr: Self) -> Self {
        Self::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    // ========== Convenience builders ==========

    /// Create an AND expression.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::And, other)
    }

    /// Create an OR expression.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Or, other)
    }

    /// Create a NOT expression.
    #[must_use]
    pub fn logical_not(self) -> Self {
        Self::unary(UnaryOp::Not, self)
    }

    /// Create an equality expression.
    #[must_use]
    pub fn eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Eq, other)
    }

    /// Create an inequality expression.
    #[must_use]
    pub fn not_eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::NotEq, other)
    }

    /// Create a less than expression.
    #[must_use]
    pub fn lt(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Lt, other)
    }

    /// Create a less than or equal expression.
    #[must_use]
    pub fn lt_eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::LtEq, other)
    }

    /// Create a greater than expression.
    #[must_use]
    pub fn gt(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Gt, other)
    }

    /// Create a greater than or equal expression.
    #[must_use]
    pub fn gt_eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::GtEq, other)
    }

    /// Create an IS NULL expression.
    #[must_use]
    pub fn is_null(self) -> Self {
        Self::unary(UnaryOp::IsNull, self)
    }

    /// Create an IS NOT NULL expression.
    #[must_use]
    pub fn is_not_null(self) -> Self {
        Self::unary(UnaryOp::IsNotNull, self)
    }

    /// Create an addition expression.
    #[must_use]
    pub fn add_expr(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Add, other)
    }

    /// Create a multiplication expression.
    #[must_use]
    pub fn mul_expr(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Multiply, other)
    }

    // ========== Analysis methods ==========

    /// Check if this expression is a simple column reference.
    pub const fn is_column(&self) -> bool {
        matches!(self, Self::Column(_))
    }

    /// Check if this expression is a literal.
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Check if this expression is the literal TRUE.
    pub const fn is_literal_true(&self) -> bool {
        matches!(self, Self::Literal(Value::Bool(true)))
    }

    /// Get the column reference if this is a column expression.
    pub const fn as_column(&self) -> Option<&ColumnRef> {
        match self {
            Self::Column(c) => Some(c),
            _ => None,
        }
    }

    /// Get all column references in this expression.
    pub fn column_refs(&self) -> HashSet<ColumnRef> {
        let mut refs = HashSet::new();
        self.collect_column_refs(&mut refs);
        refs
    }

    fn collect_column_refs(&self, refs: &mut HashSet<ColumnRef>) {
        match self {
            Self::Column(c) => {
                refs.insert(c.clone());
            }
            Self::Binary { left, right, .. } => {
                left.collect_column_refs(refs);
                right.collect_column_refs(refs);
            }
            Self::Unary { expr, .. } => expr.collect_column_refs(refs),
            Self::Literal(_) => {}
        }
    }

    /// Check whether every column reference resolves in the given row type.
    pub fn references_only(&self, row: &RowType) -> bool {
        self.column_refs().iter().all(|c| row.contains(c))
    }

    /// Split this expression into its AND-ed conjuncts.
    ///
    /// A non-AND expression is a single conjunct; nested ANDs flatten.
    pub fn conjuncts(&self) -> Vec<Self> {
        let mut out = Vec::new();
        self.collect_conjuncts(&mut out);
        out
    }

    fn collect_conjuncts(&self, out: &mut Vec<Self>) {
        match self {
            Self::Binary {
                left,
                op: BinaryOp::And,
                right,
            } => {
                left.collect_conjuncts(out);
                right.collect_conjuncts(out);
            }
            other => out.push(other.clone()),
        }
    }

    /// Combine conjuncts back into a single predicate.
    ///
    /// An empty list combines to the literal TRUE.
    pub fn combine_conjuncts(conjuncts: Vec<Self>) -> Self {
        conjuncts
            .into_iter()
            .reduce(Self::and)
            .unwrap_or(Self::Literal(Value::Bool(true)))
    }

    /// Replace column references according to a mapping, leaving unmapped
    /// references unchanged.
    #[must_use]
    pub fn substitute(&self, mapping: &HashMap<ColumnRef, ColumnRef>) -> Self {
        match self {
            Self::Column(c) => match mapping.get(c) {
                Some(replacement) => Self::Column(replacement.clone()),
                None => self.clone(),
            },
            Self::Binary { left, op, right } => Self::Binary {
                left: Box::new(left.substitute(mapping)),
                op: *op,
                right: Box::new(right.substitute(mapping)),
            },
            Self::Unary { op, expr } => Self::Unary {
                op: *op,
                expr: Box::new(expr.substitute(mapping)),
            },
            Self::Literal(_) => self.clone(),
        }
    }

    /// Output field name when this expression appears in a projection.
    pub fn output_name(&self) -> String {
        match self {
            Self::Column(c) => c.name.clone(),
            other => other.to_string(),
        }
    }

    /// Resolve the result type of this expression against a row type.
    pub fn resolve_type(&self, row: &RowType) -> VeldResult<DataType> {
        match self {
            Self::Literal(v) => Ok(v.data_type()),
            Self::Column(c) => Ok(row.resolve(c)?.data_type.clone()),
            Self::Binary { left, op, right } => {
                let lt = left.resolve_type(row)?;
                let rt = right.resolve_type(row)?;
                op.result_type(&lt, &rt).ok_or_else(|| {
                    VeldError::type_error(format!("cannot apply {op} to {lt} and {rt}"))
                })
            }
            Self::Unary { op, expr } => {
                let t = expr.resolve_type(row)?;
                op.result_type(&t)
                    .ok_or_else(|| VeldError::type_error(format!("cannot apply {op} to {t}")))
            }
        }
    }
}

impl std::fmt::Display for ScalarExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(v) => write!(f, "{v}"),
            Self::Column(c) => write!(f, "{c}"),
            Self::Binary { left, op, right } => write!(f, "({left} {op} {right})"),
            Self::Unary { op, expr } => {
                if op.is_prefix() {
                    write!(f, "{op} {expr}")
                } else {
                    write!(f, "{expr} {op}")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veld_core::Field;

    #[test]
    fn test_display_is_canonical() {
        let expr = col("age").gt_eq(lit(18i64));
        assert_eq!(expr.to_string(), "(age >= Int64(18))");

        let expr = col("name").is_null();
        assert_eq!(expr.to_string(), "name IS NULL");
    }

    #[test]
    fn test_conjunct_split_and_combine() {
        let pred = col("a").eq(lit(1i64)).and(col("b").gt(lit(2i64)).and(col("c").lt(lit(3i64))));
        let parts = pred.conjuncts();
        assert_eq!(parts.len(), 3);

        let recombined = ScalarExpr::combine_conjuncts(parts);
        assert_eq!(recombined.conjuncts().len(), 3);

        assert!(ScalarExpr::combine_conjuncts(vec![]).is_literal_true());
    }

    #[test]
    fn test_column_refs_collection() {
        let expr = col("orders.cust_id").eq(col("customers.id"));
        let refs = expr.column_refs();
        assert_eq!(refs.len(), 2);
        assert!(refs.contains(&ColumnRef::parse("orders.cust_id")));
    }

    #[test]
    fn test_substitute() {
        let mut mapping = HashMap::new();
        mapping.insert(
            ColumnRef::parse("customers.id"),
            ColumnRef::parse("orders.cust_id"),
        );

        let pred = col("customers.id").eq(lit(5i64));
        let rewritten = pred.substitute(&mapping);
        assert_eq!(rewritten.to_string(), "(orders.cust_id = Int64(5))");
    }

    #[test]
    fn test_resolve_type() {
        let row = RowType::new(vec![
            Field::new("age", DataType::Int64),
            Field::new("name", DataType::String),
        ]);

        let pred = col("age").gt(lit(18i64));
        assert_eq!(pred.resolve_type(&row).unwrap(), DataType::Bool);

        let bad = col("name").add_expr(lit(1i64));
        assert!(bad.resolve_type(&row).is_err());

        let missing = col("nope").eq(lit(1i64));
        assert!(missing.resolve_type(&row).is_err());
    }
}
