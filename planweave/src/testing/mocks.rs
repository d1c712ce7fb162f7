//! Mock creators and endpoints for testing.

use crate::assembly::{CreatorContext, PlanCreator};
use crate::errors::{CreatorError, ExpansionError};
use crate::expansion::{ExpansionEndpoint, ExpansionRequest, ExpansionResponse};
use crate::plan::{Dependency, PlanFragment, PlanNode};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeSet;

type CreatorBehavior =
    Box<dyn Fn(&CreatorContext, &Dependency) -> Result<PlanFragment, CreatorError> + Send + Sync>;

/// A mock creator that records calls and runs a configurable behavior.
///
/// The default behavior resolves the dependency into a single plan node
/// typed after the document node at its location.
pub struct MockCreator {
    name: String,
    supported: BTreeSet<String>,
    behavior: CreatorBehavior,
    handled: Mutex<Vec<String>>,
}

impl MockCreator {
    /// Creates a mock creator claiming the given node types.
    #[must_use]
    pub fn new(name: impl Into<String>, node_types: &[&str]) -> Self {
        Self {
            name: name.into(),
            supported: node_types.iter().map(|t| (*t).to_string()).collect(),
            behavior: Box::new(|ctx, dep| {
                let node_type = ctx
                    .node_for(dep)
                    .map_or_else(|| "unknown".to_string(), |n| n.node_type.clone());
                Ok(PlanFragment::new().with_node(
                    PlanNode::new(dep.node_id.clone(), node_type, dep.yaml_path.clone())
                        .with_id(dep.node_id.clone()),
                ))
            }),
            handled: Mutex::new(Vec::new()),
        }
    }

    /// Replaces the creation behavior.
    #[must_use]
    pub fn with_behavior<F>(mut self, behavior: F) -> Self
    where
        F: Fn(&CreatorContext, &Dependency) -> Result<PlanFragment, CreatorError>
            + Send
            + Sync
            + 'static,
    {
        self.behavior = Box::new(behavior);
        self
    }

    /// Returns the number of invocations.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.handled.lock().len()
    }

    /// Returns the dependency ids handled, in call order.
    #[must_use]
    pub fn handled_ids(&self) -> Vec<String> {
        self.handled.lock().clone()
    }
}

#[async_trait]
impl PlanCreator for MockCreator {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, node_type: &str) -> bool {
        self.supported.contains(node_type)
    }

    async fn create(
        &self,
        ctx: &CreatorContext,
        dependency: &Dependency,
    ) -> Result<PlanFragment, CreatorError> {
        self.handled.lock().push(dependency.node_id.clone());
        (self.behavior)(ctx, dependency)
    }
}

impl std::fmt::Debug for MockCreator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCreator")
            .field("name", &self.name)
            .field("supported", &self.supported)
            .finish()
    }
}

/// A mock expansion endpoint with canned responses and call recording.
///
/// Returns every canned response on each call; responses for fqns outside
/// the batch exercise the router's ignore path, and batch fqns without a
/// canned response exercise the missing-response path.
#[derive(Debug, Default)]
pub struct MockEndpoint {
    responses: Vec<ExpansionResponse>,
    failure: Option<String>,
    calls: Mutex<Vec<Vec<ExpansionRequest>>>,
}

impl MockEndpoint {
    /// Creates an endpoint with no canned responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a canned response.
    #[must_use]
    pub fn with_response(mut self, response: ExpansionResponse) -> Self {
        self.responses.push(response);
        self
    }

    /// Makes every call fail at the batch level.
    #[must_use]
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Returns the number of batched calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the recorded batches.
    #[must_use]
    pub fn recorded_batches(&self) -> Vec<Vec<ExpansionRequest>> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ExpansionEndpoint for MockEndpoint {
    async fn expand(
        &self,
        batch: Vec<ExpansionRequest>,
    ) -> Result<Vec<ExpansionResponse>, ExpansionError> {
        self.calls.lock().push(batch);
        match &self.failure {
            Some(message) => Err(ExpansionError::new("mock", message.clone())),
            None => Ok(self.responses.clone()),
        }
    }
}
