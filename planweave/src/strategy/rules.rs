//! Failure-strategy rule model.

use serde::{Deserialize, Serialize};

/// Error categories a failure-strategy rule can match.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ErrorType {
    /// Authentication failures against an external system.
    Authentication,
    /// Authorization/permission failures.
    Authorization,
    /// Connectivity failures reaching an external system.
    Connectivity,
    /// Step or stage timeouts.
    Timeout,
    /// Post-deployment verification failures.
    Verification,
    /// Worker/delegate provisioning failures.
    DelegateProvisioning,
    /// Policy evaluation failures.
    PolicyEvaluation,
    /// Anything not otherwise categorized.
    Unknown,
}

/// Configuration of a retry action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RetryActionConfig {
    /// Maximum retry attempts.
    pub retry_count: u32,
    /// Wait intervals between attempts, as humanized durations ("10s").
    pub retry_intervals: Vec<String>,
    /// The action taken once retries are exhausted.
    pub on_retry_failure: Box<FailureAction>,
}

impl RetryActionConfig {
    /// Creates a retry config.
    #[must_use]
    pub fn new(
        retry_count: u32,
        retry_intervals: Vec<String>,
        on_retry_failure: FailureAction,
    ) -> Self {
        Self {
            retry_count,
            retry_intervals,
            on_retry_failure: Box::new(on_retry_failure),
        }
    }
}

/// Configuration of a manual-intervention action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ManualInterventionConfig {
    /// How long to wait for an operator, as a humanized duration.
    pub timeout: String,
    /// The action taken when the wait times out.
    pub on_timeout: Box<FailureAction>,
}

impl ManualInterventionConfig {
    /// Creates a manual-intervention config.
    #[must_use]
    pub fn new(timeout: impl Into<String>, on_timeout: FailureAction) -> Self {
        Self {
            timeout: timeout.into(),
            on_timeout: Box::new(on_timeout),
        }
    }
}

/// The action a rule applies when a matched error occurs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FailureAction {
    /// Record the failure and continue.
    Ignore,
    /// Abort the whole execution.
    Abort,
    /// Mark the failing node successful and continue.
    MarkAsSuccess,
    /// Roll the enclosing stage back.
    StageRollback,
    /// Roll the enclosing step group back.
    StepGroupRollback,
    /// Continue with declared default values.
    ProceedWithDefaultValues,
    /// Pause for an operator, with a timeout fallback.
    ManualIntervention(ManualInterventionConfig),
    /// Retry on the configured intervals, with an exhaustion fallback.
    Retry(RetryActionConfig),
}

impl FailureAction {
    /// The action's bare name, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ignore => "Ignore",
            Self::Abort => "Abort",
            Self::MarkAsSuccess => "MarkAsSuccess",
            Self::StageRollback => "StageRollback",
            Self::StepGroupRollback => "StepGroupRollback",
            Self::ProceedWithDefaultValues => "ProceedWithDefaultValues",
            Self::ManualIntervention(_) => "ManualIntervention",
            Self::Retry(_) => "Retry",
        }
    }
}

/// The nesting level a rule is declared at; lower scope = higher priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum StrategyScope {
    /// Declared directly on a step. Highest priority.
    Step,
    /// Declared on the enclosing step group.
    StepGroup,
    /// Declared on the enclosing stage. Lowest priority.
    Stage,
}

/// One author-declared failure-handling rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureStrategyRule {
    /// The error types this rule matches.
    pub errors: Vec<ErrorType>,
    /// The action applied to matched errors.
    pub action: FailureAction,
}

impl FailureStrategyRule {
    /// Creates a rule.
    #[must_use]
    pub fn new(errors: Vec<ErrorType>, action: FailureAction) -> Self {
        Self { errors, action }
    }
}
