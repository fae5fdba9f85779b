//! Predicate pull-up and transitive inference.
//!
//! For any subtree the engine computes the predicates provably true of
//! every output row ("pulled-up predicates"). For a join it additionally
//! derives predicates one side can learn from the other through the
//! equality conjuncts of the join condition ("inferred predicates"),
//! suitable for pushdown. Inference never proposes a predicate already
//! pulled up on the target side, and it is suppressed entirely for join
//! kinds where a pushed filter could reject null-extended rows.

use std::collections::HashMap;
use std::sync::Arc;

use common_error::VeldResult;
use veld_algebra::{equi_conjuncts, JoinKind, JoinRel, ProjectRel, RelNode, RelOp, ScalarExpr};
use veld_core::{ColumnRef, RowType};

/// Predicate snapshot for one node.
#[derive(Debug, Clone, Default)]
pub struct PredicateList {
    /// Predicates provably true of every output row.
    pub pulled_up: Vec<ScalarExpr>,
    /// New predicates inferable for the left input (join nodes only).
    pub left_inferred: Vec<ScalarExpr>,
    /// New predicates inferable for the right input (join nodes only).
    pub right_inferred: Vec<ScalarExpr>,
}

impl PredicateList {
    /// Whether inference produced anything for either side.
    pub fn has_inferences(&self) -> bool {
        !self.left_inferred.is_empty() || !self.right_inferred.is_empty()
    }
}

/// Session-scoped predicate computation with a digest-keyed cache.
///
/// The cache key is the node digest, so replacing a subtree naturally
/// misses; entries for dropped subtrees are inert. One instance belongs to
/// exactly one planning session and is never shared.
#[derive(Debug, Default)]
pub struct PredicateInference {
    cache: HashMap<String, PredicateList>,
}

impl PredicateInference {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all cached entries.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Predicate snapshot for a node, cached for the planning pass.
    pub fn predicates(&mut self, node: &Arc<RelNode>) -> VeldResult<PredicateList> {
        if let Some(hit) = self.cache.get(node.digest()) {
            return Ok(hit.clone());
        }
        let computed = self.compute(node)?;
        self.cache
            .insert(node.digest().to_string(), computed.clone());
        Ok(computed)
    }

    /// Pulled-up predicates of a node.
    pub fn pulled_up(&mut self, node: &Arc<RelNode>) -> VeldResult<Vec<ScalarExpr>> {
        Ok(self.predicates(node)?.pulled_up)
    }

    fn compute(&mut self, node: &Arc<RelNode>) -> VeldResult<PredicateList> {
        let pulled_up = match node.op() {
            RelOp::Scan(_) => Vec::new(),
            RelOp::Filter(filter) => {
                let mut preds = self.pulled_up(node.input(0)?)?;
                push_unique(&mut preds, filter.predicate.conjuncts());
                preds
            }
            RelOp::Project(project) => {
                let input = node.input(0)?.clone();
                let inherited = self.pulled_up(&input)?;
                inherited
                    .into_iter()
                    .filter(|pred| survives_projection(pred, project, &input, node.row_type()))
                    .collect()
            }
            RelOp::Join(join) => {
                let left = self.pulled_up(node.input(0)?)?;
                let right = self.pulled_up(node.input(1)?)?;
                match join.kind {
                    JoinKind::Inner => {
                        let mut preds = left;
                        push_unique(&mut preds, right);
                        push_unique(&mut preds, join.condition.conjuncts());
                        preds
                    }
                    // Only the preserved side's predicates survive
                    // null extension.
                    JoinKind::Left | JoinKind::Semi | JoinKind::Anti => left,
                    JoinKind::Right => right,
                    JoinKind::Full => Vec::new(),
                }
            }
            RelOp::Union(_) => {
                let left = self.pulled_up(node.input(0)?)?;
                let right = self.pulled_up(node.input(1)?)?;
                let right_canon: Vec<String> =
                    right.iter().map(ToString::to_string).collect();
                left.into_iter()
                    .filter(|p| right_canon.contains(&p.to_string()))
                    .collect()
            }
            RelOp::Minus(_) => self.pulled_up(node.input(0)?)?,
            RelOp::Delta => self.pulled_up(node.input(0)?)?,
            RelOp::Aggregate(aggregate) => {
                let inherited = self.pulled_up(node.input(0)?)?;
                let key_count = aggregate.group_keys.len();
                inherited
                    .into_iter()
                    .filter(|pred| {
                        pred.column_refs().iter().all(|r| {
                            node.row_type()
                                .index_of(r)
                                .is_ok_and(|i| i < key_count)
                        })
                    })
                    .collect()
            }
        };

        let (left_inferred, right_inferred) = match node.op() {
            RelOp::Join(join) => self.infer_for_join(node, join)?,
            _ => (Vec::new(), Vec::new()),
        };

        Ok(PredicateList {
            pulled_up,
            left_inferred,
            right_inferred,
        })
    }

    /// Transitive inference across a join's equality conjuncts.
    fn infer_for_join(
        &mut self,
        node: &Arc<RelNode>,
        join: &JoinRel,
    ) -> VeldResult<(Vec<ScalarExpr>, Vec<ScalarExpr>)> {
        // Never weaken null-extension semantics: an inferred filter on a
        // null-generating side would drop rows the outer join must keep,
        // and predicates of a null-generating side do not hold for the
        // join's null-extended output. Anti joins invert matching, so
        // filtering either input changes the result.
        if !matches!(join.kind, JoinKind::Inner | JoinKind::Semi) {
            return Ok((Vec::new(), Vec::new()));
        }

        let left = node.input(0)?.clone();
        let right = node.input(1)?.clone();
        let left_preds = self.pulled_up(&left)?;
        let right_preds = self.pulled_up(&right)?;
        let classes = equivalence_classes(&join.condition);

        let left_inferred = infer_side(
            &right_preds,
            &left_preds,
            &classes,
            right.row_type(),
            left.row_type(),
        );
        let right_inferred = infer_side(
            &left_preds,
            &right_preds,
            &classes,
            left.row_type(),
            right.row_type(),
        );
        Ok((left_inferred, right_inferred))
    }
}

/// Append predicates not already present (by canonical rendering).
fn push_unique(preds: &mut Vec<ScalarExpr>, extra: Vec<ScalarExpr>) {
    for candidate in extra {
        let canon = candidate.to_string();
        if !preds.iter().any(|p| p.to_string() == canon) {
            preds.push(candidate);
        }
    }
}

/// Whether an inherited predicate still holds, unrewritten, above a
/// projection: every referenced column must resolve in the projection
/// output to a pass-through column carrying the same input field.
fn survives_projection(
    pred: &ScalarExpr,
    project: &ProjectRel,
    input: &Arc<RelNode>,
    output_row: &RowType,
) -> bool {
    pred.column_refs().iter().all(|r| {
        let Ok(output_index) = output_row.index_of(r) else {
            return false;
        };
        let Some(source) = project.exprs[output_index].as_column() else {
            return false;
        };
        match (input.row_type().index_of(source), input.row_type().index_of(r)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    })
}

/// Group column references into equivalence classes induced by the
/// equality conjuncts of a join condition.
fn equivalence_classes(condition: &ScalarExpr) -> Vec<Vec<ColumnRef>> {
    let mut classes: Vec<Vec<ColumnRef>> = Vec::new();
    for (a, b) in equi_conjuncts(condition) {
        let ia = classes.iter().position(|c| c.contains(&a));
        let ib = classes.iter().position(|c| c.contains(&b));
        match (ia, ib) {
            (None, None) => classes.push(vec![a, b]),
            (Some(i), None) => classes[i].push(b),
            (None, Some(i)) => classes[i].push(a),
            (Some(i), Some(j)) if i != j => {
                let donor = classes.remove(i.max(j));
                let keep = i.min(j);
                for member in donor {
                    if !classes[keep].contains(&member) {
                        classes[keep].push(member);
                    }
                }
            }
            _ => {}
        }
    }
    classes
}

/// Rewrite source-side predicates into target-side predicates through the
/// equivalence classes. A predicate transfers only when every referenced
/// column has an equivalent column resolvable on the target side, and only
/// when the rewritten predicate is genuinely new there.
///
/// Class members come from the join condition and are usually qualified;
/// child predicates may reference the same columns unqualified. Membership
/// is therefore decided by resolved field index on the source side, not by
/// textual equality.
fn infer_side(
    source_preds: &[ScalarExpr],
    target_preds: &[ScalarExpr],
    classes: &[Vec<ColumnRef>],
    source_row: &RowType,
    target_row: &RowType,
) -> Vec<ScalarExpr> {
    let mut inferred: Vec<ScalarExpr> = Vec::new();

    for pred in source_preds {
        let refs = pred.column_refs();
        if refs.is_empty() {
            continue;
        }

        let mut mapping = HashMap::new();
        let mut transferable = true;
        for r in &refs {
            let Ok(source_index) = source_row.index_of(r) else {
                transferable = false;
                break;
            };
            let counterpart = classes
                .iter()
                .find(|class| {
                    class
                        .iter()
                        .any(|m| source_row.index_of(m).is_ok_and(|i| i == source_index))
                })
                .and_then(|class| {
                    class.iter().find(|&m| {
                        target_row.contains(m)
                            && source_row
                                .index_of(m)
                                .map_or(true, |i| i != source_index)
                    })
                });
            match counterpart {
                Some(m) => {
                    mapping.insert(r.clone(), m.clone());
                }
                None => {
                    transferable = false;
                    break;
                }
            }
        }
        if !transferable {
            continue;
        }

        let candidate = pred.substitute(&mapping);
        if !candidate.references_only(target_row) {
            continue;
        }
        let canon = candidate.to_string();
        if target_preds.iter().any(|p| p.to_string() == canon) {
            continue;
        }
        if inferred.iter().any(|p| p.to_string() == canon) {
            continue;
        }
        inferred.push(candidate);
    }

    inferred
}
