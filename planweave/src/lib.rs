//! # Planweave
//!
//! A distributed pipeline-plan assembly engine: turns a declarative pipeline
//! document into an executable graph of plan nodes, resolves cross-module
//! field references through batched remote expansion calls, and computes the
//! effective failure-handling policy for every node from layered scoped
//! rules.
//!
//! The engine is built from four cooperating parts:
//!
//! - **Expansion router**: walks the node tree, batches expandable fields
//!   per owning module, and folds the remote responses into a flat
//!   fqn-keyed result set
//! - **Fragment merger**: accumulates the partial results of independent
//!   creator invocations into one consistent plan
//! - **Assembly driver**: the fixpoint scheduling loop that dispatches
//!   unresolved dependencies to their creators until none remain
//! - **Failure-strategy resolver**: a pure, priority-ordered merge of
//!   step/step-group/stage rules with structural validation
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use planweave::prelude::*;
//!
//! let driver = AssemblyDriver::new(creators, modules);
//! let expansions = Arc::new(router.expand_tree(&document, &root_fqn).await);
//! let plan = driver
//!     .assemble(document, root_fqn, seed, expansions, &options, &token)
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod assembly;
pub mod cancellation;
pub mod document;
pub mod errors;
pub mod expansion;
pub mod observability;
pub mod plan;
pub mod strategy;
pub mod testing;

#[cfg(test)]
mod integration_tests;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::assembly::{
        AssemblyDriver, AssemblyOptions, CreatorContext, CreatorRegistry, PlanCreator,
    };
    pub use crate::cancellation::CancellationToken;
    pub use crate::document::{DocumentNode, FieldValue, Fqn};
    pub use crate::errors::{
        AssemblyIssue, CreatorError, ExpansionError, PlanweaveError, StartingNodeConflictError,
        StrategyValidationError, UnresolvableDependencyError,
    };
    pub use crate::expansion::{
        ExpansionEndpoint, ExpansionRequest, ExpansionResponse, ExpansionRouter, ExpansionSet,
        ModuleRegistration, ModuleRegistry,
    };
    pub use crate::plan::{
        AssembledPlan, Dependency, GraphLayout, LayoutNode, PlanAccumulator, PlanFragment,
        PlanNode,
    };
    pub use crate::strategy::{
        merge_failure_strategies, validate_rule, ErrorType, FailureAction, FailureStrategyRule,
        ManualInterventionConfig, RetryActionConfig, StrategyScope,
    };
}
