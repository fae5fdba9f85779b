//! Physical trait sets carried by plan nodes.
//!
//! A trait set records the physical properties a plan alternative provides;
//! a required trait set records what the caller demands of the final plan.
//! Logical rewrites never change trait sets, so structural identity of
//! alternatives is computed without them.

use serde::{Deserialize, Serialize};

/// Calling convention of a plan node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Convention {
    /// Purely logical node, not yet bound to an execution style.
    Logical,
    /// Row-at-a-time execution.
    Row,
    /// Vectorized batch execution.
    Batch,
}

/// The set of physical properties a plan alternative provides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraitSet {
    /// Calling convention; `None` in a *required* set means "any".
    pub convention: Option<Convention>,
    /// Field names the output is sorted by, outermost first. Empty means
    /// unsorted (or, in a required set, "no ordering demanded").
    pub sorted_by: Vec<String>,
}

impl TraitSet {
    /// The default trait set of a freshly built logical node.
    pub const fn logical() -> Self {
        Self {
            convention: Some(Convention::Logical),
            sorted_by: Vec::new(),
        }
    }

    /// A required trait set that any alternative satisfies.
    pub const fn any() -> Self {
        Self {
            convention: None,
            sorted_by: Vec::new(),
        }
    }

    /// Require a specific convention.
    pub fn with_convention(mut self, convention: Convention) -> Self {
        self.convention = Some(convention);
        self
    }

    /// Require (or provide) a sort order.
    pub fn with_sorted_by(mut self, fields: Vec<String>) -> Self {
        self.sorted_by = fields;
        self
    }

    /// Check whether this (provided) trait set satisfies a required one.
    pub fn satisfies(&self, required: &Self) -> bool {
        let convention_ok = match required.convention {
            None => true,
            Some(c) => self.convention == Some(c),
        };
        let sort_ok =
            required.sorted_by.is_empty() || self.sorted_by.starts_with(&required.sorted_by);
        convention_ok && sort_ok
    }
}

impl Default for TraitSet {
    fn default() -> Self {
        Self::logical()
    }
}

impl std::fmt::Display for TraitSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.convention {
            Some(c) => write!(f, "[{c:?}")?,
            None => write!(f, "[*")?,
        }
        if !self.sorted_by.is_empty() {
            write!(f, ", sorted by {}", self.sorted_by.join(", "))?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_is_satisfied_by_everything() {
        let provided = TraitSet::logical();
        assert!(provided.satisfies(&TraitSet::any()));
    }

    #[test]
    fn test_convention_mismatch() {
        let provided = TraitSet::logical();
        let required = TraitSet::any().with_convention(Convention::Batch);
        assert!(!provided.satisfies(&required));
    }

    #[test]
    fn test_sort_prefix() {
        let provided =
            TraitSet::logical().with_sorted_by(vec!["a".to_string(), "b".to_string()]);
        let required = TraitSet::any().with_sorted_by(vec!["a".to_string()]);
        assert!(provided.satisfies(&required));

        let stricter = TraitSet::any().with_sorted_by(vec!["b".to_string()]);
        assert!(!provided.satisfies(&stricter));
    }
}
