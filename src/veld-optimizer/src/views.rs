//! View resolution, expansion contexts, and the materialized-view registry.

use std::sync::Arc;

use common_error::{VeldError, VeldResult};
use veld_algebra::{MutableNode, RelNode};
use veld_core::{RowType, TraitSet};

/// Shared construction context handed to view expansion: the defaults a
/// freshly expanded subtree is built with.
#[derive(Debug, Clone, Default)]
pub struct PlanningCluster {
    /// Trait set applied to nodes built during expansion.
    pub default_traits: TraitSet,
}

/// A resolved view definition.
#[derive(Debug, Clone)]
pub struct ResolvedView {
    /// Declared output row type of the view.
    pub row_type: RowType,
    /// The view's defining query text.
    pub query_text: String,
}

/// The view-resolution collaborator: maps a view path to its declared row
/// type and defining query text.
pub trait ViewResolver: Send + Sync {
    /// Resolve a view by schema path and view path.
    fn resolve(&self, schema_path: &[String], view_path: &[String]) -> VeldResult<ResolvedView>;
}

/// Capability to turn a named view into its defining expression tree on
/// demand during planning.
pub trait ViewExpansionContext: Send + Sync {
    /// The construction context expansion builds with.
    fn cluster(&self) -> &PlanningCluster;

    /// Expand a view into its defining expression tree.
    fn expand_view(
        &self,
        row_type: &RowType,
        query_text: &str,
        schema_path: &[String],
        view_path: &[String],
    ) -> VeldResult<Arc<RelNode>>;
}

/// Signature of a view-expanding callback (typically a parser hook).
pub type ExpandFn =
    dyn Fn(&RowType, &str, &[String], &[String]) -> VeldResult<Arc<RelNode>> + Send + Sync;

/// Adapter wrapping any view-expanding capability, reusing the caller's
/// planning cluster.
pub struct ViewExpander {
    cluster: PlanningCluster,
    expand: Box<ExpandFn>,
}

impl ViewExpander {
    /// Wrap an expansion callback.
    pub fn new(cluster: PlanningCluster, expand: Box<ExpandFn>) -> Self {
        Self { cluster, expand }
    }
}

impl ViewExpansionContext for ViewExpander {
    fn cluster(&self) -> &PlanningCluster {
        &self.cluster
    }

    fn expand_view(
        &self,
        row_type: &RowType,
        query_text: &str,
        schema_path: &[String],
        view_path: &[String],
    ) -> VeldResult<Arc<RelNode>> {
        (self.expand)(row_type, query_text, schema_path, view_path)
    }
}

/// A context for callers that guarantee the tree is already fully
/// expanded: any expansion request indicates a logic error upstream and
/// fails with a distinguished error.
#[derive(Debug, Clone, Default)]
pub struct NoViewExpansion {
    cluster: PlanningCluster,
}

impl NoViewExpansion {
    /// Create a non-expanding context.
    pub fn new(cluster: PlanningCluster) -> Self {
        Self { cluster }
    }
}

impl ViewExpansionContext for NoViewExpansion {
    fn cluster(&self) -> &PlanningCluster {
        &self.cluster
    }

    fn expand_view(
        &self,
        _row_type: &RowType,
        _query_text: &str,
        schema_path: &[String],
        view_path: &[String],
    ) -> VeldResult<Arc<RelNode>> {
        Err(VeldError::view_expansion(format!(
            "views unsupported in this context: {}.{}",
            schema_path.join("."),
            view_path.join(".")
        )))
    }
}

/// A registered materialized view: a name and its defining tree, with the
/// normalized form precomputed for matching.
#[derive(Debug, Clone)]
pub struct MaterializedView {
    /// Catalog path of the materialization.
    pub name: Vec<String>,
    /// The view's defining expression tree.
    pub definition: Arc<RelNode>,
    normalized: MutableNode,
}

impl MaterializedView {
    /// The trait-blind normal form of the definition.
    pub const fn normalized(&self) -> &MutableNode {
        &self.normalized
    }
}

/// Immutable set of materialized views available for substitution.
///
/// Built once, then shared read-only across planning sessions.
#[derive(Debug, Clone, Default)]
pub struct MaterializedViewRegistry {
    views: Vec<MaterializedView>,
}

impl MaterializedViewRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view definition under a catalog path.
    pub fn with_view<I, S>(mut self, name: I, definition: Arc<RelNode>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let normalized = MutableNode::from_rel(&definition);
        self.views.push(MaterializedView {
            name: name.into_iter().map(Into::into).collect(),
            definition,
            normalized,
        });
        self
    }

    /// Whether no views are registered.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// All registered views.
    pub fn views(&self) -> &[MaterializedView] {
        &self.views
    }

    /// Find a view whose normalized definition equals the candidate.
    pub fn find_match(&self, candidate: &MutableNode) -> Option<&MaterializedView> {
        self.views.iter().find(|v| v.normalized == *candidate)
    }
}
