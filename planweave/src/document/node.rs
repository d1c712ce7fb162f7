//! Immutable, already-parsed document model.
//!
//! The node tree is a read-only input supplied by the document provider.
//! This module only models what the engine needs: typed nodes, an ordered
//! field map, fqn-based navigation, and the expression-token test the
//! expansion walk uses to discriminate unresolved values from literals.

use super::Fqn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The value held by one document field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// A literal or expression scalar.
    Scalar(serde_json::Value),
    /// A nested node.
    Node(DocumentNode),
    /// An ordered list of values, addressed as `[i]` in fqns.
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Renders the value as plain JSON, flattening nested nodes to objects.
    ///
    /// Used as the raw payload of an expansion request when an expandable
    /// field holds a structured value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Scalar(v) => v.clone(),
            Self::Node(node) => {
                let map: serde_json::Map<String, serde_json::Value> = node
                    .fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                serde_json::Value::Object(map)
            }
            Self::List(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
        }
    }
}

/// One node in the parsed document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    /// The node's type, e.g. `stage` or `step`; drives creator routing.
    pub node_type: String,
    /// The node's fields in deterministic order.
    pub fields: BTreeMap<String, FieldValue>,
}

impl DocumentNode {
    /// Creates an empty node of the given type.
    #[must_use]
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Adds a scalar field.
    #[must_use]
    pub fn with_scalar(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.fields.insert(name.into(), FieldValue::Scalar(value));
        self
    }

    /// Adds a child node field.
    #[must_use]
    pub fn with_child(mut self, name: impl Into<String>, node: DocumentNode) -> Self {
        self.fields.insert(name.into(), FieldValue::Node(node));
        self
    }

    /// Adds a list field.
    #[must_use]
    pub fn with_list(mut self, name: impl Into<String>, items: Vec<FieldValue>) -> Self {
        self.fields.insert(name.into(), FieldValue::List(items));
        self
    }

    /// Looks up the node addressed by a path relative to this node.
    ///
    /// Returns `None` if the path does not resolve to a node (e.g. it ends
    /// on a scalar field, or a list index is out of range).
    #[must_use]
    pub fn node_at(&self, path: &Fqn) -> Option<&Self> {
        let mut current = self;
        let mut segments = path.segments();

        while let Some(segment) = segments.next() {
            let value = current.fields.get(segment)?;
            current = match value {
                FieldValue::Node(node) => node,
                FieldValue::List(items) => {
                    let idx = parse_index(segments.next()?)?;
                    match items.get(idx)? {
                        FieldValue::Node(node) => node,
                        FieldValue::Scalar(_) | FieldValue::List(_) => return None,
                    }
                }
                FieldValue::Scalar(_) => return None,
            };
        }
        Some(current)
    }
}

/// Returns true if a scalar value is an unresolved expression token.
///
/// Expression tokens are strings of the shape `<+...>`; everything else,
/// including already-resolved strings, counts as a literal.
#[must_use]
pub fn is_expression_token(value: &serde_json::Value) -> bool {
    matches!(value, serde_json::Value::String(s) if s.starts_with("<+") && s.ends_with('>'))
}

fn parse_index(segment: &str) -> Option<usize> {
    segment
        .strip_prefix('[')?
        .strip_suffix(']')?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_tree() -> DocumentNode {
        DocumentNode::new("pipeline").with_list(
            "stages",
            vec![FieldValue::Node(
                DocumentNode::new("stage")
                    .with_scalar("name", json!("deploy"))
                    .with_child(
                        "spec",
                        DocumentNode::new("spec").with_scalar("serviceRef", json!("svc1")),
                    ),
            )],
        )
    }

    #[test]
    fn test_node_at_traverses_lists_and_children() {
        let tree = sample_tree();
        let spec = tree.node_at(&Fqn::new("stages/[0]/spec")).unwrap();
        assert_eq!(spec.node_type, "spec");
        assert_eq!(
            spec.fields.get("serviceRef"),
            Some(&FieldValue::Scalar(json!("svc1")))
        );
    }

    #[test]
    fn test_node_at_empty_path_is_self() {
        let tree = sample_tree();
        assert_eq!(tree.node_at(&Fqn::new("")).unwrap().node_type, "pipeline");
    }

    #[test]
    fn test_node_at_scalar_is_not_a_node() {
        let tree = sample_tree();
        assert!(tree.node_at(&Fqn::new("stages/[0]/name")).is_none());
        assert!(tree.node_at(&Fqn::new("stages/[7]")).is_none());
    }

    #[test]
    fn test_expression_token_detection() {
        assert!(is_expression_token(&json!("<+input>")));
        assert!(is_expression_token(&json!("<+pipeline.vars.env>")));
        assert!(!is_expression_token(&json!("literal")));
        assert!(!is_expression_token(&json!(42)));
        assert!(!is_expression_token(&json!("<unclosed")));
    }

    #[test]
    fn test_to_json_flattens_nodes() {
        let tree = sample_tree();
        let rendered = tree.fields.get("stages").unwrap().to_json();
        assert_eq!(
            rendered,
            json!([{"name": "deploy", "spec": {"serviceRef": "svc1"}}])
        );
    }
}
