//! The fragment merger: accumulates partial results from many independent
//! creator invocations into one consistent plan.
//!
//! The accumulator is the only shared mutable state of an assembly pass and
//! must be mutated from a single critical section; the driver owns it and
//! merges completed fragments serially between awaits.

use super::layout::merge_starting_node;
use super::{Dependency, GraphLayout, PlanFragment, PlanNode};
use crate::document::Fqn;
use crate::errors::{AssemblyIssue, PlanweaveError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The final merged plan handed to the plan consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembledPlan {
    /// All resolved plan nodes, keyed by id.
    pub nodes: BTreeMap<String, PlanNode>,
    /// The plan's starting node, if any fragment declared one.
    pub starting_node_id: Option<String>,
    /// Shared context values.
    pub context: BTreeMap<String, serde_json::Value>,
    /// The merged graph layout.
    pub layout: GraphLayout,
    /// Textual document patches keyed by fqn.
    pub yaml_patches: BTreeMap<Fqn, String>,
    /// Per-unit failures recorded during the pass.
    pub issues: Vec<AssemblyIssue>,
}

/// Running accumulator for one assembly pass.
#[derive(Debug, Default)]
pub struct PlanAccumulator {
    nodes: BTreeMap<String, PlanNode>,
    /// Pending forward references keyed by node id; keying by id makes the
    /// resolve-removes-metadata step atomic by construction.
    dependencies: BTreeMap<String, Dependency>,
    starting_node_id: Option<String>,
    context: BTreeMap<String, serde_json::Value>,
    layout: GraphLayout,
    yaml_patches: BTreeMap<Fqn, String>,
    preserved_rollback_ids: Vec<String>,
    issues: Vec<AssemblyIssue>,
}

impl PlanAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one fragment into the accumulator.
    ///
    /// Total except for the starting-node consistency invariant: a fragment
    /// declaring a starting node different from the one already adopted
    /// aborts the pass with both values named.
    pub fn merge(&mut self, fragment: PlanFragment) -> Result<(), PlanweaveError> {
        // A node definition always wins over, and extinguishes, any pending
        // dependency with the same id.
        for node in fragment.nodes {
            self.dependencies.remove(&node.id);
            self.nodes.insert(node.id.clone(), node);
        }

        // Idempotent union, first-seen wins.
        for dependency in fragment.dependencies {
            if !self.nodes.contains_key(&dependency.node_id)
                && !self.dependencies.contains_key(&dependency.node_id)
            {
                self.dependencies
                    .insert(dependency.node_id.clone(), dependency);
            }
        }

        merge_starting_node(&mut self.starting_node_id, fragment.starting_node_id)?;

        // First writer wins per context key.
        for (key, value) in fragment.context {
            self.context.entry(key).or_insert(value);
        }

        self.layout.merge(fragment.layout)?;

        // Last writer wins per fqn.
        self.yaml_patches.extend(fragment.yaml_patches);

        // Duplicates allowed; consumers dedupe downstream.
        self.preserved_rollback_ids
            .extend(fragment.preserved_rollback_ids);

        self.issues.extend(fragment.issues);
        Ok(())
    }

    /// Returns the resolved nodes.
    #[must_use]
    pub fn nodes(&self) -> &BTreeMap<String, PlanNode> {
        &self.nodes
    }

    /// Returns true if unresolved dependencies remain.
    #[must_use]
    pub fn has_pending_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }

    /// Snapshots the pending dependencies for one dispatch round.
    #[must_use]
    pub fn pending_dependencies(&self) -> Vec<Dependency> {
        self.dependencies.values().cloned().collect()
    }

    /// Retires a dispatched dependency, metadata included.
    pub fn retire_dependency(&mut self, node_id: &str) {
        self.dependencies.remove(node_id);
    }

    /// Snapshots the shared context for a creator invocation.
    #[must_use]
    pub fn context_snapshot(&self) -> BTreeMap<String, serde_json::Value> {
        self.context.clone()
    }

    /// Returns the node ids marked for live re-resolution in rollback mode.
    #[must_use]
    pub fn preserved_rollback_ids(&self) -> &[String] {
        &self.preserved_rollback_ids
    }

    /// Records a per-unit failure against an fqn or node id.
    pub fn record_issue(&mut self, issue: AssemblyIssue) {
        self.issues.push(issue);
    }

    /// Finalizes the accumulator into the plan handed to consumers.
    ///
    /// Callers must only invoke this once the dependency set is empty; the
    /// driver enforces that before finalizing a pass.
    #[must_use]
    pub fn into_plan(self) -> AssembledPlan {
        AssembledPlan {
            nodes: self.nodes,
            starting_node_id: self.starting_node_id,
            context: self.context,
            layout: self.layout,
            yaml_patches: self.yaml_patches,
            issues: self.issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::LayoutNode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn node(id: &str) -> PlanNode {
        PlanNode::new(id, "step", format!("pipeline/{id}")).with_id(id)
    }

    #[test]
    fn test_node_extinguishes_pending_dependency() {
        let mut acc = PlanAccumulator::new();
        acc.merge(
            PlanFragment::new().with_dependency(
                Dependency::new("n1", "pipeline/n1").with_metadata("hint", json!(true)),
            ),
        )
        .unwrap();
        assert!(acc.has_pending_dependencies());

        acc.merge(PlanFragment::new().with_node(node("n1"))).unwrap();
        assert!(!acc.has_pending_dependencies());
        assert!(acc.nodes().contains_key("n1"));
    }

    #[test]
    fn test_dependency_union_is_first_seen() {
        let mut acc = PlanAccumulator::new();
        acc.merge(PlanFragment::new().with_node(node("n1"))).unwrap();

        // A dependency for an already-resolved node is ignored.
        acc.merge(PlanFragment::new().with_dependency(Dependency::new("n1", "pipeline/n1")))
            .unwrap();
        assert!(!acc.has_pending_dependencies());

        acc.merge(
            PlanFragment::new()
                .with_dependency(Dependency::new("n2", "pipeline/n2").with_metadata("a", json!(1))),
        )
        .unwrap();
        acc.merge(PlanFragment::new().with_dependency(Dependency::new("n2", "pipeline/other")))
            .unwrap();
        let pending = acc.pending_dependencies();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].yaml_path, Fqn::new("pipeline/n2"));
    }

    #[test]
    fn test_merging_same_fragment_twice_is_idempotent() {
        let fragment = PlanFragment::new()
            .with_node(node("n1"))
            .with_node(node("n2"))
            .with_dependency(Dependency::new("n3", "pipeline/n3"));

        let mut acc = PlanAccumulator::new();
        acc.merge(fragment.clone()).unwrap();
        acc.merge(fragment).unwrap();

        assert_eq!(acc.nodes().len(), 2);
        assert_eq!(acc.pending_dependencies().len(), 1);
    }

    #[test]
    fn test_starting_node_consistency() {
        let mut acc = PlanAccumulator::new();
        acc.merge(PlanFragment::new().with_starting_node("s1"))
            .unwrap();
        acc.merge(PlanFragment::new().with_starting_node("s1"))
            .unwrap();

        let err = acc
            .merge(PlanFragment::new().with_starting_node("s2"))
            .unwrap_err();
        match err {
            PlanweaveError::StartingNodeConflict(conflict) => {
                assert_eq!(conflict.existing, "s1");
                assert_eq!(conflict.incoming, "s2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_context_first_writer_wins() {
        let mut acc = PlanAccumulator::new();
        acc.merge(PlanFragment::new().with_context_value("k", json!("v1")))
            .unwrap();
        acc.merge(PlanFragment::new().with_context_value("k", json!("v2")))
            .unwrap();
        assert_eq!(acc.context_snapshot().get("k"), Some(&json!("v1")));
    }

    #[test]
    fn test_yaml_patches_last_writer_wins() {
        let mut acc = PlanAccumulator::new();
        acc.merge(PlanFragment::new().with_yaml_patch("pipeline/a", "first"))
            .unwrap();
        acc.merge(PlanFragment::new().with_yaml_patch("pipeline/a", "second"))
            .unwrap();
        let plan = acc.into_plan();
        assert_eq!(
            plan.yaml_patches.get(&Fqn::new("pipeline/a")),
            Some(&"second".to_string())
        );
    }

    #[test]
    fn test_empty_fragment_is_a_noop_merge() {
        let mut acc = PlanAccumulator::new();
        acc.merge(PlanFragment::new().with_node(node("n1"))).unwrap();
        acc.merge(
            PlanFragment::new().with_layout_node(LayoutNode::new("n1", "Node 1")),
        )
        .unwrap();

        assert_eq!(acc.nodes().len(), 1);
        let plan = acc.into_plan();
        assert_eq!(plan.layout.nodes.len(), 1);
    }

    #[test]
    fn test_preserved_ids_concatenate_with_duplicates() {
        let mut acc = PlanAccumulator::new();
        acc.merge(PlanFragment::new().with_preserved_rollback_id("n1"))
            .unwrap();
        acc.merge(
            PlanFragment::new()
                .with_preserved_rollback_id("n1")
                .with_preserved_rollback_id("n2"),
        )
        .unwrap();
        assert_eq!(acc.preserved_rollback_ids(), ["n1", "n1", "n2"]);
    }
}
