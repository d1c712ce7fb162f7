//! Partial, mergeable creator output.

use super::{GraphLayout, LayoutNode, PlanNode};
use crate::document::Fqn;
use crate::errors::AssemblyIssue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A forward reference to a node some creator declared but did not resolve.
///
/// Lives only until a creator converts it into a [`PlanNode`]; at that point
/// it is removed from the pending set, metadata included, in one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    /// The id the eventual plan node must carry.
    pub node_id: String,
    /// The document location of the unresolved node.
    pub yaml_path: Fqn,
    /// Creator-supplied hints attached to the reference.
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Dependency {
    /// Creates a dependency with no metadata.
    #[must_use]
    pub fn new(node_id: impl Into<String>, yaml_path: impl Into<Fqn>) -> Self {
        Self {
            node_id: node_id.into(),
            yaml_path: yaml_path.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attaches a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// The partial output of one creator invocation.
///
/// Fragments are always merged into the accumulator, never consumed
/// standalone. A fragment contributing zero nodes and zero dependencies is a
/// legal no-op merge, e.g. a creator that only emits layout or context info.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanFragment {
    /// Newly resolved plan nodes.
    pub nodes: Vec<PlanNode>,
    /// Forward references left for other creators.
    pub dependencies: Vec<Dependency>,
    /// Starting-node candidate, if this creator knows it.
    pub starting_node_id: Option<String>,
    /// Shared context values, first writer wins on merge.
    pub context: BTreeMap<String, serde_json::Value>,
    /// Presentation-layer layout contribution.
    pub layout: GraphLayout,
    /// Textual patches keyed by fqn, last writer wins on merge.
    pub yaml_patches: BTreeMap<Fqn, String>,
    /// Node ids to re-resolve live instead of replaying in rollback mode.
    pub preserved_rollback_ids: Vec<String>,
    /// Per-unit failures attributed to this creator's scope.
    pub issues: Vec<AssemblyIssue>,
}

impl PlanFragment {
    /// Creates an empty fragment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resolved plan node.
    #[must_use]
    pub fn with_node(mut self, node: PlanNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Adds an unresolved dependency.
    #[must_use]
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Declares the starting-node candidate.
    #[must_use]
    pub fn with_starting_node(mut self, id: impl Into<String>) -> Self {
        self.starting_node_id = Some(id.into());
        self
    }

    /// Adds a shared context value.
    #[must_use]
    pub fn with_context_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Adds a layout node.
    #[must_use]
    pub fn with_layout_node(mut self, node: LayoutNode) -> Self {
        self.layout.insert(node);
        self
    }

    /// Adds a textual patch for the document location `fqn`.
    #[must_use]
    pub fn with_yaml_patch(mut self, fqn: impl Into<Fqn>, replacement: impl Into<String>) -> Self {
        self.yaml_patches.insert(fqn.into(), replacement.into());
        self
    }

    /// Marks a node id for live re-resolution in rollback mode.
    #[must_use]
    pub fn with_preserved_rollback_id(mut self, id: impl Into<String>) -> Self {
        self.preserved_rollback_ids.push(id.into());
        self
    }

    /// Records a per-unit failure.
    #[must_use]
    pub fn with_issue(mut self, issue: AssemblyIssue) -> Self {
        self.issues.push(issue);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fragment_builder() {
        let fragment = PlanFragment::new()
            .with_node(PlanNode::new("deploy", "step", "pipeline/deploy").with_id("n1"))
            .with_dependency(Dependency::new("n2", "pipeline/verify"))
            .with_starting_node("n1")
            .with_context_value("env", json!("prod"))
            .with_yaml_patch("pipeline/deploy", "replaced: true");

        assert_eq!(fragment.nodes.len(), 1);
        assert_eq!(fragment.dependencies.len(), 1);
        assert_eq!(fragment.starting_node_id.as_deref(), Some("n1"));
        assert_eq!(fragment.context.get("env"), Some(&json!("prod")));
    }

    #[test]
    fn test_empty_fragment_is_default() {
        assert_eq!(PlanFragment::new(), PlanFragment::default());
    }
}
