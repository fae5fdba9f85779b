//! Row types and column references.

mod column_ref;
mod row_type;

pub use column_ref::ColumnRef;
pub use row_type::{Field, RowType};
