//! The plan assembly driver: a round-based fixpoint loop over the pending
//! dependency set.
//!
//! Each round snapshots the pending dependencies, dispatches every claimed
//! one to its creator on a parallel task, and merges completed fragments
//! serially — the accumulator is only ever touched from this loop, which is
//! the single-writer critical section the merge invariants require.

use super::{CreatorContext, CreatorRegistry, PlanCreator};
use crate::cancellation::CancellationToken;
use crate::document::{DocumentNode, Fqn};
use crate::errors::{AssemblyIssue, PlanweaveError, UnresolvableDependencyError};
use crate::expansion::{ExpansionSet, ModuleRegistry};
use crate::plan::{AssembledPlan, Dependency, PlanAccumulator, PlanFragment, PlanNode};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Options for one assembly pass.
#[derive(Debug, Clone, Default)]
pub struct AssemblyOptions {
    /// Whether this pass re-executes a prior run in rollback mode.
    pub rollback: bool,
    /// Nodes inherited from the prior execution, as dependencies carrying
    /// their original id and document location. Only read in rollback mode.
    pub inherited_nodes: Vec<Dependency>,
}

impl AssemblyOptions {
    /// Options for an ordinary assembly pass.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a rollback-mode pass over inherited prior-run nodes.
    #[must_use]
    pub fn rollback(inherited_nodes: Vec<Dependency>) -> Self {
        Self {
            rollback: true,
            inherited_nodes,
        }
    }
}

/// The scheduling loop that drives plan assembly to its fixpoint.
#[derive(Debug)]
pub struct AssemblyDriver {
    creators: Arc<CreatorRegistry>,
    modules: Arc<ModuleRegistry>,
}

impl AssemblyDriver {
    /// Creates a driver over the given registries.
    #[must_use]
    pub fn new(creators: Arc<CreatorRegistry>, modules: Arc<ModuleRegistry>) -> Self {
        Self { creators, modules }
    }

    /// Runs one assembly pass to completion.
    ///
    /// Starts from the seed fragment, repeatedly dispatches pending
    /// dependencies to their creators, and merges the returned fragments
    /// until no dependencies remain. A round in which no creator claims any
    /// pending dependency is a fatal unresolvable-dependency condition.
    /// Cancellation is observed between rounds, never mid-merge.
    pub async fn assemble(
        &self,
        document: Arc<DocumentNode>,
        root_fqn: Fqn,
        seed: PlanFragment,
        expansions: Arc<ExpansionSet>,
        options: &AssemblyOptions,
        token: &CancellationToken,
    ) -> Result<AssembledPlan, PlanweaveError> {
        let mut acc = PlanAccumulator::new();
        acc.merge(seed)?;

        for issue in expansions.issues() {
            acc.record_issue(issue);
        }

        if options.rollback {
            acc.merge(rollback_seed(&acc, &options.inherited_nodes))?;
        }

        let mut round = 0_usize;
        while acc.has_pending_dependencies() {
            if token.is_cancelled() {
                let reason = token.reason().unwrap_or_else(|| "cancelled".to_string());
                return Err(PlanweaveError::Cancelled(reason));
            }
            round += 1;

            let ctx = Arc::new(CreatorContext {
                document: Arc::clone(&document),
                root_fqn: root_fqn.clone(),
                context: acc.context_snapshot(),
                expansions: Arc::clone(&expansions),
            });

            let mut tasks = FuturesUnordered::new();
            let mut unclaimed = Vec::new();
            for dependency in acc.pending_dependencies() {
                match self.claim(&ctx, &dependency) {
                    Some(creator) => {
                        let ctx = Arc::clone(&ctx);
                        tasks.push(tokio::spawn(async move {
                            let result = creator.create(&ctx, &dependency).await;
                            (dependency, result)
                        }));
                    }
                    None => unclaimed.push(dependency),
                }
            }

            if tasks.is_empty() {
                return Err(self.unresolvable(&ctx, unclaimed).into());
            }

            debug!(
                round,
                dispatched = tasks.len(),
                unclaimed = unclaimed.len(),
                "dispatching assembly round"
            );

            while let Some(joined) = tasks.next().await {
                let (dependency, result) = joined
                    .map_err(|e| PlanweaveError::Internal(format!("creator task failed: {e}")))?;
                // A dispatched dependency is retired whether or not its
                // creator produced the node; re-queuing it would amount to an
                // internal retry, which belongs to the caller.
                acc.retire_dependency(&dependency.node_id);
                match result {
                    Ok(fragment) => acc.merge(fragment)?,
                    Err(err) => {
                        warn!(node_id = %dependency.node_id, error = %err, "creator invocation failed");
                        acc.record_issue(AssemblyIssue::new(
                            dependency.node_id.clone(),
                            err.to_string(),
                        ));
                    }
                }
            }
        }

        info!(rounds = round, nodes = acc.nodes().len(), "assembly pass complete");
        Ok(acc.into_plan())
    }

    /// Finds the creator claiming a dependency, by the node type at its
    /// document location.
    fn claim(
        &self,
        ctx: &CreatorContext,
        dependency: &Dependency,
    ) -> Option<Arc<dyn PlanCreator>> {
        let node = ctx.node_for(dependency)?;
        self.creators.creator_for(&node.node_type)
    }

    /// Builds the fatal stall diagnostic, logging the owning module of each
    /// unclaimed node type where the registry knows it.
    fn unresolvable(
        &self,
        ctx: &CreatorContext,
        unclaimed: Vec<Dependency>,
    ) -> UnresolvableDependencyError {
        for dependency in &unclaimed {
            let node_type = ctx.node_for(dependency).map(|n| n.node_type.clone());
            let module = node_type
                .as_deref()
                .and_then(|t| self.modules.module_for_type(t));
            warn!(
                node_id = %dependency.node_id,
                yaml_path = %dependency.yaml_path,
                node_type = node_type.as_deref().unwrap_or("<unknown>"),
                owning_module = module.as_deref().unwrap_or("<unknown>"),
                "no creator claims dependency"
            );
        }
        UnresolvableDependencyError {
            node_ids: unclaimed.into_iter().map(|d| d.node_id).collect(),
        }
    }
}

/// Seeds a rollback-mode pass: inherited nodes become identity replays
/// unless marked for preservation, in which case they are queued as
/// ordinary dependencies for live re-resolution.
fn rollback_seed(acc: &PlanAccumulator, inherited: &[Dependency]) -> PlanFragment {
    let preserved: BTreeSet<&str> = acc
        .preserved_rollback_ids()
        .iter()
        .map(String::as_str)
        .collect();

    let mut fragment = PlanFragment::new();
    for dependency in inherited {
        if preserved.contains(dependency.node_id.as_str()) {
            fragment = fragment.with_dependency(dependency.clone());
        } else {
            fragment = fragment.with_node(PlanNode::identity(&dependency.node_id));
        }
    }
    fragment
}
