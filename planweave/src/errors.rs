//! Error types for the plan assembly engine.
//!
//! Fatal errors abort an assembly pass or a rule merge and carry enough
//! structure to name the exact ids or values in conflict. Recoverable
//! per-unit failures are reported as [`AssemblyIssue`] values alongside an
//! otherwise successful pass instead of surfacing here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for planweave operations.
#[derive(Debug, Error)]
pub enum PlanweaveError {
    /// Two fragments declared different starting nodes.
    #[error("{0}")]
    StartingNodeConflict(#[from] StartingNodeConflictError),

    /// A round completed with pending dependencies no creator claims.
    #[error("{0}")]
    UnresolvableDependencies(#[from] UnresolvableDependencyError),

    /// A failure-strategy rule violates a structural constraint.
    #[error("{0}")]
    StrategyValidation(#[from] StrategyValidationError),

    /// A module's batched expansion call failed as a whole.
    #[error("{0}")]
    Expansion(#[from] ExpansionError),

    /// A creator invocation failed.
    #[error("{0}")]
    Creator(#[from] CreatorError),

    /// The assembly pass was cancelled between rounds.
    #[error("Assembly cancelled: {0}")]
    Cancelled(String),

    /// A generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error raised when two merged fragments disagree on the starting node.
///
/// Never resolved silently; both candidate ids are carried so the caller can
/// point at the offending creators.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("starting node conflict: accumulator has '{existing}', fragment declared '{incoming}'")]
pub struct StartingNodeConflictError {
    /// The starting node the accumulator already adopted.
    pub existing: String,
    /// The conflicting starting node from the incoming fragment.
    pub incoming: String,
}

/// Error raised when the fixpoint loop stalls.
///
/// Produced when a full dispatch round finds pending dependencies but no
/// registered creator claims any of them.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("unresolvable dependencies, no creator claims: {}", node_ids.join(", "))]
pub struct UnresolvableDependencyError {
    /// Ids of the dependencies left unclaimed.
    pub node_ids: Vec<String>,
}

/// Structural failure-strategy validation errors.
///
/// Raised at rule-authoring time, not during the priority merge.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum StrategyValidationError {
    /// A retry's post-failure action was itself a retry.
    #[error("post-retry failure action cannot be another retry")]
    ChainedRetry,

    /// A retry's post-failure action is not allowed.
    #[error("retry failure action cannot be {action}")]
    InvalidRetryFailureAction {
        /// The rejected action name.
        action: String,
    },

    /// A retry rule declared no retry intervals.
    #[error("retry intervals must not be empty")]
    EmptyRetryIntervals,

    /// A manual intervention's post-timeout action is not allowed.
    #[error("manual-intervention timeout action cannot be {action}")]
    InvalidManualTimeoutAction {
        /// The rejected action name.
        action: String,
    },
}

/// Error raised when a module's batched expansion call fails.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("expansion call to module '{module}' failed: {message}")]
pub struct ExpansionError {
    /// The owning module whose batch failed.
    pub module: String,
    /// The failure detail.
    pub message: String,
}

impl ExpansionError {
    /// Creates a new expansion error.
    #[must_use]
    pub fn new(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            message: message.into(),
        }
    }
}

/// Error raised by a creator invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("creator failed for node '{node_id}': {message}")]
pub struct CreatorError {
    /// The dependency id the creator was resolving.
    pub node_id: String,
    /// The failure detail.
    pub message: String,
}

impl CreatorError {
    /// Creates a new creator error.
    #[must_use]
    pub fn new(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            message: message.into(),
        }
    }
}

/// A recoverable, per-unit failure recorded against a specific location.
///
/// Issues ride along with a successful pass; the `subject` is always an
/// `fqn` or node id so callers can render a precise document location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyIssue {
    /// The fqn or node id the failure is attributed to.
    pub subject: String,
    /// Human-readable failure detail.
    pub message: String,
}

impl AssemblyIssue {
    /// Creates a new issue.
    #[must_use]
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
        }
    }
}
