//! Structural validation of authored failure-strategy rules.
//!
//! Called at rule-authoring time, not during the priority merge. The hard
//! checks reject retry and manual-intervention nestings that could never
//! terminate; the advisory checks flag mutual nesting that callers should
//! warn about without failing.

use super::{FailureAction, FailureStrategyRule, ManualInterventionConfig, RetryActionConfig};
use crate::errors::StrategyValidationError;

/// Rejects a retry as the action following an exhausted retry.
///
/// Chaining Retry after Retry is an unbounded loop; every other action is
/// allowed here.
pub fn validate_post_retry_action(action: &FailureAction) -> Result<(), StrategyValidationError> {
    match action {
        FailureAction::Retry(_) => Err(StrategyValidationError::ChainedRetry),
        _ => Ok(()),
    }
}

/// Validates a retry action's configuration.
///
/// The post-exhaustion action may not be Retry or ProceedWithDefaultValues,
/// and the interval list must be non-empty.
pub fn validate_retry_failure_action(
    config: &RetryActionConfig,
) -> Result<(), StrategyValidationError> {
    match &*config.on_retry_failure {
        FailureAction::Retry(_) => return Err(StrategyValidationError::ChainedRetry),
        FailureAction::ProceedWithDefaultValues => {
            return Err(StrategyValidationError::InvalidRetryFailureAction {
                action: config.on_retry_failure.kind().to_string(),
            })
        }
        _ => {}
    }
    if config.retry_intervals.is_empty() {
        return Err(StrategyValidationError::EmptyRetryIntervals);
    }
    Ok(())
}

/// Validates a manual intervention's post-timeout action.
///
/// Retry after a timeout would recreate the same manual-intervention cycle
/// indefinitely; ProceedWithDefaultValues is likewise disallowed.
pub fn validate_manual_intervention_failure_action(
    config: &ManualInterventionConfig,
) -> Result<(), StrategyValidationError> {
    match &*config.on_timeout {
        FailureAction::Retry(_) | FailureAction::ProceedWithDefaultValues => {
            Err(StrategyValidationError::InvalidManualTimeoutAction {
                action: config.on_timeout.kind().to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// Advisory: true when a retry's exhaustion action is a manual intervention
/// whose own timeout action is another retry.
#[must_use]
pub fn manual_intervention_under_retry(config: &RetryActionConfig) -> bool {
    matches!(
        &*config.on_retry_failure,
        FailureAction::ManualIntervention(manual)
            if matches!(&*manual.on_timeout, FailureAction::Retry(_))
    )
}

/// Advisory: true when a manual intervention's timeout action is a retry
/// whose exhaustion action is another manual intervention.
#[must_use]
pub fn retry_under_manual_intervention(config: &ManualInterventionConfig) -> bool {
    matches!(
        &*config.on_timeout,
        FailureAction::Retry(retry)
            if matches!(&*retry.on_retry_failure, FailureAction::ManualIntervention(_))
    )
}

/// Validates a whole rule, walking nested actions recursively.
pub fn validate_rule(rule: &FailureStrategyRule) -> Result<(), StrategyValidationError> {
    validate_action(&rule.action)
}

fn validate_action(action: &FailureAction) -> Result<(), StrategyValidationError> {
    match action {
        FailureAction::Retry(config) => {
            validate_retry_failure_action(config)?;
            validate_action(&config.on_retry_failure)
        }
        FailureAction::ManualIntervention(config) => {
            validate_manual_intervention_failure_action(config)?;
            validate_action(&config.on_timeout)
        }
        _ => Ok(()),
    }
}
