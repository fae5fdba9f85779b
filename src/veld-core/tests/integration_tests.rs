//! Integration tests for veld-core
//!
//! These tests cover the crate's cross-module behavior without duplicating
//! the unit tests in individual modules.

use proptest::prelude::*;
use veld_core::*;

#[test]
fn test_value_equality_and_display() {
    assert_eq!(Value::Int64(42), Value::Int64(42));
    assert_ne!(Value::Int64(42), Value::Int64(43));
    assert_eq!(
        Value::String("hello".to_string()),
        Value::String("hello".to_string())
    );

    assert_eq!(format!("{:?}", Value::Int64(42)), "Int64(42)");
    assert_eq!(format!("{}", Value::Bool(true)), "Bool(true)");
    assert_eq!(format!("{:?}", Value::Null), "Null");
}

#[test]
fn test_row_type_round_trips_through_json() {
    let row = RowType::new(vec![
        Field::new("id", DataType::Int64)
            .with_qualifier("orders")
            .with_nullable(false),
        Field::new("name", DataType::String),
    ]);

    let json = serde_json::to_string(&row).unwrap();
    let back: RowType = serde_json::from_str(&json).unwrap();
    assert_eq!(row, back);
}

#[test]
fn test_trait_set_round_trips_through_json() {
    let traits = TraitSet::logical()
        .with_convention(Convention::Batch)
        .with_sorted_by(vec!["id".to_string()]);

    let json = serde_json::to_string(&traits).unwrap();
    let back: TraitSet = serde_json::from_str(&json).unwrap();
    assert_eq!(traits, back);
}

fn arb_data_type() -> impl Strategy<Value = DataType> {
    prop_oneof![
        Just(DataType::Null),
        Just(DataType::Bool),
        Just(DataType::Int64),
        Just(DataType::Float64),
        Just(DataType::String),
        Just(DataType::Binary),
        Just(DataType::Timestamp),
        Just(DataType::Date),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int64),
        // Integer-representable floats keep JSON round trips exact.
        any::<i32>().prop_map(|i| Value::Float64(f64::from(i))),
        "[a-zA-Z0-9]{0,20}".prop_map(Value::String),
        any::<i64>().prop_map(Value::Timestamp),
        any::<i32>().prop_map(Value::Date),
    ]
}

proptest! {
    #[test]
    fn common_supertype_is_commutative(a in arb_data_type(), b in arb_data_type()) {
        prop_assert_eq!(a.common_supertype(&b), b.common_supertype(&a));
    }

    #[test]
    fn coercion_to_self_always_holds(t in arb_data_type()) {
        prop_assert!(t.can_coerce_to(&t));
        prop_assert_eq!(t.common_supertype(&t), Some(t.clone()));
    }

    #[test]
    fn value_round_trips_through_json(v in arb_value()) {
        let json = serde_json::to_string(&v).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(v, back);
    }

    #[test]
    fn column_ref_parse_display_round_trip(
        qualifier in "[a-z][a-z0-9]{0,8}",
        name in "[a-z][a-z0-9]{0,8}",
    ) {
        let column = ColumnRef::qualified(qualifier, name);
        prop_assert_eq!(ColumnRef::parse(&column.to_string()), column);
    }
}
