//! Presentation-layer graph layout, accumulated alongside the executable
//! node set but never consulted by it.

use crate::errors::StartingNodeConflictError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One node of the rendered plan graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutNode {
    /// Matches the plan node id it renders.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Outgoing edges, by target layout-node id.
    pub edges_to: Vec<String>,
}

impl LayoutNode {
    /// Creates a layout node with no edges.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            edges_to: Vec::new(),
        }
    }

    /// Adds an outgoing edge.
    #[must_use]
    pub fn with_edge_to(mut self, target: impl Into<String>) -> Self {
        self.edges_to.push(target.into());
        self
    }
}

/// A mergeable view of the plan graph layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLayout {
    /// Layout nodes keyed by id.
    pub nodes: BTreeMap<String, LayoutNode>,
    /// The layout's starting node, if declared.
    pub starting_node_id: Option<String>,
}

impl GraphLayout {
    /// Creates an empty layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a layout node, replacing any previous node with the same id.
    pub fn insert(&mut self, node: LayoutNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Merges another layout into this one.
    ///
    /// Node entries are a pure map union, last writer wins per id (layout is
    /// presentation-only, a duplicate id never aborts a pass). Starting-node
    /// ids follow the same fatal-mismatch rule as the plan itself.
    pub fn merge(&mut self, other: GraphLayout) -> Result<(), StartingNodeConflictError> {
        merge_starting_node(&mut self.starting_node_id, other.starting_node_id)?;
        self.nodes.extend(other.nodes);
        Ok(())
    }

    /// Returns true if the layout carries no information.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.starting_node_id.is_none()
    }
}

/// Adopts `incoming` into `existing` if unset; equal values are a no-op and
/// differing values are a fatal conflict naming both ids.
pub(crate) fn merge_starting_node(
    existing: &mut Option<String>,
    incoming: Option<String>,
) -> Result<(), StartingNodeConflictError> {
    let Some(incoming) = incoming else {
        return Ok(());
    };
    match existing {
        None => {
            *existing = Some(incoming);
            Ok(())
        }
        Some(current) if *current == incoming => Ok(()),
        Some(current) => Err(StartingNodeConflictError {
            existing: current.clone(),
            incoming,
        }),
    }
}
