//! Resolved plan nodes.

use crate::document::Fqn;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fully resolved, executable unit of the final plan graph.
///
/// Owned collectively by the accumulator once merged; never re-derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanNode {
    /// Stable identifier, unique within one plan.
    pub id: String,
    /// Display name.
    pub name: String,
    /// The node's type, matching the creator that produced it.
    pub node_type: String,
    /// The document location this node was resolved from.
    pub yaml_path: Fqn,
    /// Opaque execution parameters.
    pub spec: serde_json::Value,
}

impl PlanNode {
    /// Creates a plan node with a generated uuid id.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        node_type: impl Into<String>,
        yaml_path: impl Into<Fqn>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            node_type: node_type.into(),
            yaml_path: yaml_path.into(),
            spec: serde_json::Value::Null,
        }
    }

    /// Sets an explicit id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the execution parameters.
    #[must_use]
    pub fn with_spec(mut self, spec: serde_json::Value) -> Self {
        self.spec = spec;
        self
    }

    /// Creates an identity node for a prior-run node replayed in rollback mode.
    #[must_use]
    pub fn identity(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            node_type: "identity".to_string(),
            yaml_path: Fqn::new(""),
            spec: serde_json::Value::Null,
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = PlanNode::new("a", "step", "pipeline/a");
        let b = PlanNode::new("b", "step", "pipeline/b");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_identity_node() {
        let node = PlanNode::identity("prior-1");
        assert_eq!(node.id, "prior-1");
        assert_eq!(node.node_type, "identity");
    }
}
