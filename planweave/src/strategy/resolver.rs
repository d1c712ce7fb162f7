//! Priority-ordered failure-strategy merge.

use super::{ErrorType, FailureAction, FailureStrategyRule};
use std::collections::{BTreeMap, BTreeSet};

/// Merges the three scoped rule lists into one action per error type.
///
/// Scopes are processed in priority order: step, then step group, then
/// stage. The first scope to assign an action to an error type wins; lower
/// priority scopes declaring the same error type are ignored for that type.
/// The result groups error types by their final action and covers every
/// error type mentioned by any rule in scope.
#[must_use]
pub fn merge_failure_strategies(
    step_rules: &[FailureStrategyRule],
    step_group_rules: &[FailureStrategyRule],
    stage_rules: &[FailureStrategyRule],
) -> BTreeMap<FailureAction, BTreeSet<ErrorType>> {
    let mut assigned: BTreeMap<ErrorType, FailureAction> = BTreeMap::new();

    for rules in [step_rules, step_group_rules, stage_rules] {
        for rule in rules {
            for error in &rule.errors {
                assigned.entry(*error).or_insert_with(|| rule.action.clone());
            }
        }
    }

    let mut grouped: BTreeMap<FailureAction, BTreeSet<ErrorType>> = BTreeMap::new();
    for (error, action) in assigned {
        grouped.entry(action).or_default().insert(error);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rule(errors: &[ErrorType], action: FailureAction) -> FailureStrategyRule {
        FailureStrategyRule::new(errors.to_vec(), action)
    }

    #[test]
    fn test_scope_priority_assignment() {
        let step = vec![rule(&[ErrorType::Authentication], FailureAction::Ignore)];
        let step_group = vec![rule(
            &[ErrorType::Authentication, ErrorType::Authorization],
            FailureAction::MarkAsSuccess,
        )];
        let stage = vec![rule(
            &[
                ErrorType::Authentication,
                ErrorType::Authorization,
                ErrorType::Timeout,
            ],
            FailureAction::Abort,
        )];

        let merged = merge_failure_strategies(&step, &step_group, &stage);

        let mut expected = BTreeMap::new();
        expected.insert(
            FailureAction::Ignore,
            BTreeSet::from([ErrorType::Authentication]),
        );
        expected.insert(
            FailureAction::MarkAsSuccess,
            BTreeSet::from([ErrorType::Authorization]),
        );
        expected.insert(FailureAction::Abort, BTreeSet::from([ErrorType::Timeout]));
        assert_eq!(merged, expected);
    }

    #[test]
    fn test_first_rule_within_scope_wins() {
        let step = vec![
            rule(&[ErrorType::Timeout], FailureAction::Ignore),
            rule(&[ErrorType::Timeout], FailureAction::Abort),
        ];
        let merged = merge_failure_strategies(&step, &[], &[]);
        assert_eq!(
            merged.get(&FailureAction::Ignore),
            Some(&BTreeSet::from([ErrorType::Timeout]))
        );
        assert!(!merged.contains_key(&FailureAction::Abort));
    }

    #[test]
    fn test_all_mentioned_error_types_are_covered() {
        let step = vec![rule(&[ErrorType::Connectivity], FailureAction::Ignore)];
        let stage = vec![rule(
            &[ErrorType::Verification, ErrorType::Unknown],
            FailureAction::StageRollback,
        )];

        let merged = merge_failure_strategies(&step, &[], &stage);
        let covered: BTreeSet<ErrorType> = merged.values().flatten().copied().collect();
        assert_eq!(
            covered,
            BTreeSet::from([
                ErrorType::Connectivity,
                ErrorType::Verification,
                ErrorType::Unknown,
            ])
        );
    }

    #[test]
    fn test_empty_scopes_merge_to_empty() {
        assert!(merge_failure_strategies(&[], &[], &[]).is_empty());
    }
}
