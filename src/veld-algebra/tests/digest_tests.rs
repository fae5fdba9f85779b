//! Property tests for digest-based structural identity.
//!
//! The digest is the planner's notion of node identity, so the two
//! directions of consistency both matter: structurally equal trees must
//! collapse to one digest, and equal digests must never merge trees that
//! differ structurally.

use std::sync::Arc;

use proptest::prelude::*;
use veld_algebra::{col, lit, JoinKind, RelNode, ScanRel};
use veld_core::{DataType, Field, RowType};

#[derive(Debug, Clone)]
enum Wrap {
    FilterEq(i64),
    FilterGt(i64),
    Delta,
}

#[derive(Debug, Clone)]
struct Recipe {
    a_wraps: Vec<Wrap>,
    b_wraps: Option<Vec<Wrap>>,
}

fn scan_a() -> Arc<RelNode> {
    RelNode::scan(
        ScanRel::table(["a"]),
        RowType::new(vec![
            Field::new("x", DataType::Int64),
            Field::new("w", DataType::Int64),
        ]),
    )
    .unwrap()
}

fn scan_b() -> Arc<RelNode> {
    RelNode::scan(
        ScanRel::table(["b"]),
        RowType::new(vec![Field::new("z", DataType::Int64)]),
    )
    .unwrap()
}

fn build_side(base: Arc<RelNode>, column: &str, wraps: &[Wrap]) -> Arc<RelNode> {
    wraps.iter().fold(base, |tree, wrap| match wrap {
        Wrap::FilterEq(k) => RelNode::filter(tree, col(column).eq(lit(*k))).unwrap(),
        Wrap::FilterGt(k) => RelNode::filter(tree, col(column).gt(lit(*k))).unwrap(),
        Wrap::Delta => RelNode::delta(tree).unwrap(),
    })
}

fn build(recipe: &Recipe) -> Arc<RelNode> {
    let left = build_side(scan_a(), "x", &recipe.a_wraps);
    match &recipe.b_wraps {
        None => left,
        Some(wraps) => {
            let right = build_side(scan_b(), "z", wraps);
            RelNode::join(JoinKind::Inner, left, right, col("a.x").eq(col("b.z"))).unwrap()
        }
    }
}

fn arb_wrap() -> impl Strategy<Value = Wrap> {
    prop_oneof![
        (0..4i64).prop_map(Wrap::FilterEq),
        (0..4i64).prop_map(Wrap::FilterGt),
        Just(Wrap::Delta),
    ]
}

fn arb_recipe() -> impl Strategy<Value = Recipe> {
    (
        prop::collection::vec(arb_wrap(), 0..4),
        prop::option::of(prop::collection::vec(arb_wrap(), 0..3)),
    )
        .prop_map(|(a_wraps, b_wraps)| Recipe { a_wraps, b_wraps })
}

proptest! {
    #[test]
    fn digest_equal_iff_structurally_equal(r1 in arb_recipe(), r2 in arb_recipe()) {
        let t1 = build(&r1);
        let t2 = build(&r2);
        prop_assert_eq!(t1.digest() == t2.digest(), t1.structural_eq(&t2));
    }

    #[test]
    fn rebuilding_a_recipe_reproduces_the_digest(r in arb_recipe()) {
        let t1 = build(&r);
        let t2 = build(&r);
        prop_assert_eq!(t1.digest(), t2.digest());
        prop_assert!(t1.structural_eq(&t2));
    }
}
