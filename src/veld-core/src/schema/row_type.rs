//! Row type definitions: the ordered, named, typed output of an operator.

use common_error::{VeldError, VeldResult};
use serde::{Deserialize, Serialize};

use crate::types::DataType;

use super::ColumnRef;

/// A single field in a row type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Relation qualifier (table name or alias), if any.
    pub qualifier: Option<String>,
    /// Data type.
    pub data_type: DataType,
    /// Whether this field can contain nulls.
    pub nullable: bool,
}

impl Field {
    /// Create a new unqualified, nullable field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            qualifier: None,
            data_type,
            nullable: true,
        }
    }

    /// Set the qualifier for this field.
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Set the qualifier from an optional value, clearing it on `None`.
    pub fn with_qualifier_opt(mut self, qualifier: Option<String>) -> Self {
        self.qualifier = qualifier;
        self
    }

    /// Set nullability for this field.
    pub const fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Get the full qualified name.
    pub fn qualified_name(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("{q}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Check whether a column reference names this field.
    pub fn matches(&self, column: &ColumnRef) -> bool {
        if column.name != self.name {
            return false;
        }
        match &column.qualifier {
            Some(q) => self.qualifier.as_deref() == Some(q.as_str()),
            None => true,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.qualified_name(), self.data_type)?;
        if self.nullable {
            write!(f, "?")?;
        }
        Ok(())
    }
}

/// The ordered sequence of named, typed fields produced by an operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowType {
    fields: Vec<Field>,
}

impl RowType {
    /// Create a row type from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// All fields in order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Field at an index.
    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Resolve a column reference to a field index.
    ///
    /// Unqualified references must match exactly one field name; qualified
    /// references must match exactly one (qualifier, name) pair.
    pub fn index_of(&self, column: &ColumnRef) -> VeldResult<usize> {
        let mut found: Option<usize> = None;
        for (i, field) in self.fields.iter().enumerate() {
            if field.matches(column) {
                if found.is_some() {
                    return Err(VeldError::AmbiguousColumn(column.to_string()));
                }
                found = Some(i);
            }
        }
        found.ok_or_else(|| VeldError::ColumnNotFound(column.to_string()))
    }

    /// Resolve a column reference to a field.
    pub fn resolve(&self, column: &ColumnRef) -> VeldResult<&Field> {
        let index = self.index_of(column)?;
        Ok(&self.fields[index])
    }

    /// Check whether a column reference resolves uniquely in this row type.
    pub fn contains(&self, column: &ColumnRef) -> bool {
        self.index_of(column).is_ok()
    }

    /// Check set-operation compatibility: same arity and pairwise-coercible
    /// field types (names may differ).
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(other.fields.iter())
                .all(|(a, b)| a.data_type.common_supertype(&b.data_type).is_some())
    }

    /// A copy of this row type with every field qualified.
    pub fn qualify(&self, qualifier: &str) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .map(|f| f.clone().with_qualifier(qualifier))
                .collect(),
        }
    }

    /// A copy of this row type with every field nullable, as produced by the
    /// null-extending side of an outer join.
    pub fn as_nullable(&self) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .map(|f| f.clone().with_nullable(true))
                .collect(),
        }
    }

    /// Concatenate two row types (for join outputs).
    pub fn concat(&self, other: &Self) -> Self {
        let mut fields = self.fields.clone();
        fields.extend(other.fields.iter().cloned());
        Self { fields }
    }
}

impl std::fmt::Display for RowType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}")?;
        }
        write!(f, ")")
    }
}

impl FromIterator<Field> for RowType {
    fn from_iter<T: IntoIterator<Item = Field>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders_row() -> RowType {
        RowType::new(vec![
            Field::new("id", DataType::Int64).with_qualifier("orders"),
            Field::new("cust_id", DataType::Int64).with_qualifier("orders"),
        ])
    }

    #[test]
    fn test_resolve_qualified() {
        let row = orders_row();
        assert_eq!(row.index_of(&ColumnRef::parse("orders.cust_id")).unwrap(), 1);
        assert_eq!(row.index_of(&ColumnRef::parse("id")).unwrap(), 0);
    }

    #[test]
    fn test_resolve_missing() {
        let row = orders_row();
        let err = row.index_of(&ColumnRef::parse("missing")).unwrap_err();
        assert!(matches!(err, VeldError::ColumnNotFound(_)));
    }

    #[test]
    fn test_resolve_ambiguous() {
        let row = RowType::new(vec![
            Field::new("id", DataType::Int64).with_qualifier("a"),
            Field::new("id", DataType::Int64).with_qualifier("b"),
        ]);
        let err = row.index_of(&ColumnRef::parse("id")).unwrap_err();
        assert!(matches!(err, VeldError::AmbiguousColumn(_)));
        assert!(row.contains(&ColumnRef::parse("a.id")));
    }

    #[test]
    fn test_concat_and_nullable() {
        let left = orders_row();
        let right = RowType::new(vec![Field::new("id", DataType::Int64)
            .with_qualifier("customers")
            .with_nullable(false)]);

        let joined = left.concat(&right.as_nullable());
        assert_eq!(joined.field_count(), 3);
        assert!(joined.field(2).unwrap().nullable);
    }

    #[test]
    fn test_compatibility() {
        let a = RowType::new(vec![Field::new("x", DataType::Int64)]);
        let b = RowType::new(vec![Field::new("y", DataType::Float64)]);
        let c = RowType::new(vec![Field::new("z", DataType::String)]);
        assert!(a.is_compatible_with(&b));
        assert!(!a.is_compatible_with(&c));
    }
}
