//! The planning session: equivalence-class search over rewrite rules.
//!
//! A `Planner` holds the immutable ingredients of planning (rule set,
//! metadata, cost model, views, configuration); each `optimize` call runs
//! an isolated session owning all working state, so independent queries
//! plan concurrently against shared planner ingredients with no locks.
//!
//! The session proceeds Seeded -> Exploring -> Converged -> Selected. The
//! search set is the discovery-ordered list of root alternatives, deduped
//! by digest; each registered subtree replacement also lands in the
//! equivalence class of the subtree it matched, keyed by that subtree's
//! digest. A (tree, node, rule) triple fires at most once, which together
//! with digest dedup guarantees forward progress: a rule rediscovering an
//! existing alternative is a no-op.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use common_error::{VeldError, VeldResult};
use log::{debug, warn};
use veld_algebra::RelNode;
use veld_core::TraitSet;

use crate::cost::{Cost, CostModel, DefaultCostModel};
use crate::metadata::MetadataProvider;
use crate::predicates::PredicateInference;
use crate::rules::{Rule, RuleCall};
use crate::views::MaterializedViewRegistry;

/// Session life-cycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerState {
    /// Initial tree registered.
    Seeded,
    /// Rules being matched and applied.
    Exploring,
    /// No further alternatives, or budget exhausted.
    Converged,
    /// Winner extracted.
    Selected,
}

/// What `optimize` returns when the cancellation flag is raised
/// mid-search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelPolicy {
    /// Select among the alternatives found so far.
    #[default]
    BestSoFar,
    /// Fail with a distinguished cancellation error.
    Error,
}

/// Configuration for a planning session.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Upper bound on rule applications across the session.
    pub max_rule_applications: usize,
    /// Optional wall-clock budget for the exploring phase.
    pub timeout: Option<Duration>,
    /// Behavior when the cancellation flag is raised.
    pub on_cancel: CancelPolicy,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_rule_applications: 10_000,
            timeout: None,
            on_cancel: CancelPolicy::BestSoFar,
        }
    }
}

impl PlannerConfig {
    /// Set the rule-application budget.
    pub const fn with_max_rule_applications(mut self, max: usize) -> Self {
        self.max_rule_applications = max;
        self
    }

    /// Set the wall-clock budget.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the cancellation behavior.
    pub const fn with_cancel_policy(mut self, policy: CancelPolicy) -> Self {
        self.on_cancel = policy;
        self
    }
}

/// The selected plan and its cost.
#[derive(Debug, Clone)]
pub struct Best {
    /// Lowest-cost alternative satisfying the required traits.
    pub tree: Arc<RelNode>,
    /// Its estimated cost.
    pub cost: Cost,
}

/// The rule engine.
pub struct Planner {
    rules: Vec<Arc<dyn Rule>>,
    metadata: Arc<dyn MetadataProvider>,
    cost_model: Arc<dyn CostModel>,
    views: Arc<MaterializedViewRegistry>,
    config: PlannerConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl Planner {
    /// Create a planner over an explicit rule set and metadata provider.
    pub fn new(rules: Vec<Arc<dyn Rule>>, metadata: Arc<dyn MetadataProvider>) -> Self {
        Self {
            rules,
            metadata,
            cost_model: Arc::new(DefaultCostModel),
            views: Arc::new(MaterializedViewRegistry::new()),
            config: PlannerConfig::default(),
            cancel: None,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the cost model.
    pub fn with_cost_model(mut self, cost_model: Arc<dyn CostModel>) -> Self {
        self.cost_model = cost_model;
        self
    }

    /// Attach a materialized-view registry.
    pub fn with_views(mut self, views: Arc<MaterializedViewRegistry>) -> Self {
        self.views = views;
        self
    }

    /// Attach a cancellation flag, checked between rule-match iterations.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Optimize a tree: explore equivalent alternatives until a fixed
    /// point or budget exhaustion, then select the lowest-cost alternative
    /// satisfying the required traits.
    pub fn optimize(&self, initial: Arc<RelNode>, required: &TraitSet) -> VeldResult<Best> {
        Session::new(self).run(initial, required)
    }
}

/// All working state of one planning pass. Never shared across sessions.
struct Session<'a> {
    planner: &'a Planner,
    alternatives: Vec<Arc<RelNode>>,
    seen: HashSet<String>,
    classes: HashMap<String, Vec<Arc<RelNode>>>,
    fired: HashSet<(String, String, &'static str)>,
    inference: PredicateInference,
    cost_memo: HashMap<String, Cost>,
    applications: usize,
    state: PlannerState,
    deadline: Option<Instant>,
}

impl<'a> Session<'a> {
    fn new(planner: &'a Planner) -> Self {
        Self {
            planner,
            alternatives: Vec::new(),
            seen: HashSet::new(),
            classes: HashMap::new(),
            fired: HashSet::new(),
            inference: PredicateInference::new(),
            cost_memo: HashMap::new(),
            applications: 0,
            state: PlannerState::Seeded,
            deadline: None,
        }
    }

    fn run(mut self, initial: Arc<RelNode>, required: &TraitSet) -> VeldResult<Best> {
        let planner = self.planner;
        self.deadline = planner.config.timeout.map(|t| Instant::now() + t);
        self.seen.insert(initial.digest().to_string());
        self.alternatives.push(initial);
        debug!("planner state: {:?}", self.state);

        self.state = PlannerState::Exploring;
        let mut cancelled = false;
        let mut index = 0;

        'explore: while index < self.alternatives.len() {
            let tree = Arc::clone(&self.alternatives[index]);
            index += 1;

            for path in positions(&tree) {
                // Cooperative checks sit between match iterations, never
                // inside a rule body.
                if self.is_cancelled() {
                    if planner.config.on_cancel == CancelPolicy::Error {
                        return Err(VeldError::cancelled(format!(
                            "planning cancelled after {} rule applications",
                            self.applications
                        )));
                    }
                    debug!("planning cancelled, selecting among alternatives found so far");
                    cancelled = true;
                    break 'explore;
                }
                if self.budget_exhausted() {
                    break 'explore;
                }

                let node = Arc::clone(node_at(&tree, &path));
                for rule in &planner.rules {
                    if !rule.pattern().matches(&node) {
                        continue;
                    }
                    let key = (
                        tree.digest().to_string(),
                        node.digest().to_string(),
                        rule.name(),
                    );
                    if !self.fired.insert(key) {
                        continue;
                    }
                    self.applications += 1;

                    let mut call = RuleCall::new(
                        &node,
                        planner.metadata.as_ref(),
                        &mut self.inference,
                        planner.views.as_ref(),
                    );
                    if let Err(err) = rule.on_match(&mut call) {
                        // A failing rule body means "does not apply here".
                        warn!("rule {} failed on a match, skipping: {err}", rule.name());
                        continue;
                    }

                    for replacement in call.into_transformed() {
                        self.register(&tree, &path, &node, rule.name(), replacement);
                    }
                }
            }
        }

        self.state = PlannerState::Converged;
        debug!(
            "planner state: {:?} ({} alternatives, {} rule applications)",
            self.state,
            self.alternatives.len(),
            self.applications
        );
        self.select(required, cancelled)
    }

    /// Record one registered replacement: into the matched subtree's
    /// equivalence class, and as a new root alternative if the resulting
    /// tree is structurally new.
    fn register(
        &mut self,
        tree: &Arc<RelNode>,
        path: &[usize],
        node: &Arc<RelNode>,
        rule_name: &'static str,
        replacement: Arc<RelNode>,
    ) {
        if replacement.digest() == node.digest() {
            return;
        }
        if replacement.row_type() != node.row_type() {
            warn!(
                "rule {rule_name} registered a replacement with a different row type, skipping"
            );
            return;
        }

        let class = self.classes.entry(node.digest().to_string()).or_default();
        if !class.iter().any(|m| m.digest() == replacement.digest()) {
            class.push(Arc::clone(&replacement));
        }

        let rebuilt = match replace_at(tree, path, replacement) {
            Ok(rebuilt) => rebuilt,
            Err(err) => {
                warn!("rule {rule_name} replacement failed to splice, skipping: {err}");
                return;
            }
        };
        if self.seen.insert(rebuilt.digest().to_string()) {
            debug!("rule {rule_name} produced a new alternative");
            self.alternatives.push(rebuilt);
        }
    }

    fn select(&mut self, required: &TraitSet, cancelled: bool) -> VeldResult<Best> {
        let mut best: Option<Best> = None;
        let alternatives = self.alternatives.clone();
        for alternative in &alternatives {
            if !alternative.traits().satisfies(required) {
                continue;
            }
            let cost = self.cost_of(alternative);
            // Strict comparison: equal costs keep the earlier discovery,
            // so planning stays reproducible.
            if best.as_ref().is_none_or(|b| cost < b.cost) {
                best = Some(Best {
                    tree: Arc::clone(alternative),
                    cost,
                });
            }
        }

        self.state = PlannerState::Selected;
        debug!("planner state: {:?}", self.state);
        match best {
            Some(best) => Ok(best),
            None if cancelled => Err(VeldError::cancelled(
                "planning cancelled before any alternative satisfied the required traits",
            )),
            None => Err(VeldError::no_plan(format!(
                "no alternative satisfies required traits {required}"
            ))),
        }
    }

    /// Bottom-up cost with a digest-keyed memo owned by this session.
    fn cost_of(&mut self, node: &Arc<RelNode>) -> Cost {
        crate::cost::cost_with_memo(
            node,
            self.planner.cost_model.as_ref(),
            self.planner.metadata.as_ref(),
            &mut self.cost_memo,
        )
    }

    fn is_cancelled(&self) -> bool {
        self.planner
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn budget_exhausted(&self) -> bool {
        if self.applications >= self.planner.config.max_rule_applications {
            debug!(
                "rule budget ({}) exhausted, converging",
                self.planner.config.max_rule_applications
            );
            return true;
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                debug!("planning timeout reached, converging");
                return true;
            }
        }
        false
    }
}

/// Pre-order paths (child-index sequences) of every node in a tree.
fn positions(tree: &Arc<RelNode>) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    collect_positions(tree, &mut path, &mut out);
    out
}

fn collect_positions(node: &Arc<RelNode>, path: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
    out.push(path.clone());
    for (index, input) in node.inputs().iter().enumerate() {
        path.push(index);
        collect_positions(input, path, out);
        path.pop();
    }
}

/// The node at a path produced by `positions` over the same tree.
fn node_at<'t>(tree: &'t Arc<RelNode>, path: &[usize]) -> &'t Arc<RelNode> {
    let mut current = tree;
    for &index in path {
        current = &current.inputs()[index];
    }
    current
}

/// Rebuild a tree with the subtree at `path` replaced, re-deriving row
/// types on the spine above the splice point.
fn replace_at(
    tree: &Arc<RelNode>,
    path: &[usize],
    replacement: Arc<RelNode>,
) -> VeldResult<Arc<RelNode>> {
    match path.split_first() {
        None => Ok(replacement),
        Some((&index, rest)) => {
            let child = tree.input(index)?;
            let new_child = replace_at(child, rest, replacement)?;
            let mut children: Vec<Arc<RelNode>> = tree.inputs().to_vec();
            children[index] = new_child;
            tree.with_children(children)
        }
    }
}
