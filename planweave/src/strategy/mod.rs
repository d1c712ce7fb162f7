//! Failure-strategy resolution: scoped rule model, priority merge, and
//! structural validation.
//!
//! Pure and independent of the assembly loop; invoked per execution node
//! once its enclosing scopes are known.

mod resolver;
mod rules;
mod validation;

pub use resolver::merge_failure_strategies;
pub use rules::{
    ErrorType, FailureAction, FailureStrategyRule, ManualInterventionConfig, RetryActionConfig,
    StrategyScope,
};
pub use validation::{
    manual_intervention_under_retry, retry_under_manual_intervention, validate_manual_intervention_failure_action,
    validate_post_retry_action, validate_retry_failure_action, validate_rule,
};
