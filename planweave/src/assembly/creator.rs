//! The creator seam: pluggable components that resolve one dependency into
//! a plan fragment.

use crate::document::{DocumentNode, Fqn};
use crate::errors::CreatorError;
use crate::expansion::ExpansionSet;
use crate::plan::{Dependency, PlanFragment};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Read-only context handed to every creator invocation.
///
/// Passed explicitly down the call chain rather than held in ambient state:
/// creators may run concurrently and must not observe each other's in-flight
/// context writes, so the shared context is a snapshot taken at round start.
#[derive(Debug, Clone)]
pub struct CreatorContext {
    /// The parsed document tree.
    pub document: Arc<DocumentNode>,
    /// The fqn of the document root.
    pub root_fqn: Fqn,
    /// Snapshot of the accumulator's shared context values.
    pub context: BTreeMap<String, serde_json::Value>,
    /// The pass's merged expansion results.
    pub expansions: Arc<ExpansionSet>,
}

impl CreatorContext {
    /// Looks up the document node a dependency points at.
    #[must_use]
    pub fn node_for(&self, dependency: &Dependency) -> Option<&DocumentNode> {
        let relative = dependency.yaml_path.strip_prefix(&self.root_fqn)?;
        self.document.node_at(&relative)
    }
}

/// A component able to resolve dependencies of the node types it owns.
///
/// Creators are pure with respect to the accumulator: they receive an
/// immutable context and return a fragment, and never merge anything
/// themselves.
#[async_trait]
pub trait PlanCreator: Send + Sync {
    /// The creator's name, used in diagnostics.
    fn name(&self) -> &str;

    /// Returns true if this creator can resolve the given node type.
    fn supports(&self, node_type: &str) -> bool;

    /// Resolves one dependency into a plan fragment.
    async fn create(
        &self,
        ctx: &CreatorContext,
        dependency: &Dependency,
    ) -> Result<PlanFragment, CreatorError>;
}
