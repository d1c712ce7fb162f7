//! Expansion request/response values and the merged per-pass result set.

use crate::document::Fqn;
use crate::errors::AssemblyIssue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// One expandable field discovered in the document tree.
///
/// Immutable value; deduplicated by `(module, fqn)` within one pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionRequest {
    /// The module that owns the field and will expand it.
    pub module: String,
    /// The field's document location; the sole correlation key.
    pub fqn: Fqn,
    /// The raw field value to expand.
    pub value: serde_json::Value,
}

impl ExpansionRequest {
    /// Creates a new expansion request.
    #[must_use]
    pub fn new(module: impl Into<String>, fqn: impl Into<Fqn>, value: serde_json::Value) -> Self {
        Self {
            module: module.into(),
            fqn: fqn.into(),
            value,
        }
    }
}

// Identity is (module, fqn); the raw value never participates, so a request
// re-discovered with a stale value still deduplicates.
impl PartialEq for ExpansionRequest {
    fn eq(&self, other: &Self) -> bool {
        self.module == other.module && self.fqn == other.fqn
    }
}

impl Eq for ExpansionRequest {}

impl Hash for ExpansionRequest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.module.hash(state);
        self.fqn.hash(state);
    }
}

/// The result of expanding one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpansionOutcome {
    /// The module returned the expanded value.
    Success(serde_json::Value),
    /// The module reported a per-field failure.
    Failure(String),
}

/// One response from a module's batched expansion call.
///
/// Returned out of order; correlated to its request only by `fqn`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionResponse {
    /// The document location of the expanded field.
    pub fqn: Fqn,
    /// The expansion result.
    pub outcome: ExpansionOutcome,
}

impl ExpansionResponse {
    /// Creates a successful response.
    #[must_use]
    pub fn success(fqn: impl Into<Fqn>, value: serde_json::Value) -> Self {
        Self {
            fqn: fqn.into(),
            outcome: ExpansionOutcome::Success(value),
        }
    }

    /// Creates a failed response.
    #[must_use]
    pub fn failure(fqn: impl Into<Fqn>, message: impl Into<String>) -> Self {
        Self {
            fqn: fqn.into(),
            outcome: ExpansionOutcome::Failure(message.into()),
        }
    }

    /// Returns true if the expansion succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ExpansionOutcome::Success(_))
    }
}

/// The flat, fqn-keyed result of one expansion pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpansionSet {
    /// Successfully expanded values by fqn.
    pub resolved: BTreeMap<Fqn, serde_json::Value>,
    /// Per-fqn failures: remote errors, failed module batches, and requests
    /// that received no response.
    pub failed: BTreeMap<Fqn, String>,
}

impl ExpansionSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the expanded value for an fqn, if it resolved.
    #[must_use]
    pub fn value(&self, fqn: &Fqn) -> Option<&serde_json::Value> {
        self.resolved.get(fqn)
    }

    /// Converts the per-fqn failures into reportable issues.
    #[must_use]
    pub fn issues(&self) -> Vec<AssemblyIssue> {
        self.failed
            .iter()
            .map(|(fqn, message)| AssemblyIssue::new(fqn.as_str(), message.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_request_identity_ignores_value() {
        let a = ExpansionRequest::new("cd", "pipeline/svc", json!("v1"));
        let b = ExpansionRequest::new("cd", "pipeline/svc", json!("v2"));
        let c = ExpansionRequest::new("ci", "pipeline/svc", json!("v1"));

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
        assert!(set.insert(c));
    }

    #[test]
    fn test_expansion_set_issues() {
        let mut set = ExpansionSet::new();
        set.resolved.insert(Fqn::new("p/a"), json!({"ok": true}));
        set.failed.insert(Fqn::new("p/b"), "no response".to_string());

        let issues = set.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].subject, "p/b");
    }
}
