//! Fully-qualified node paths.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A forward-slash-delimited path uniquely addressing one node in the
/// document tree, e.g. `pipeline/stages/[0]/stage/spec`.
///
/// Stable across merges; used as the join key for every cross-component
/// lookup, so an `Fqn` must be globally unique within one assembly pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fqn(String);

impl Fqn {
    /// Creates an fqn from a raw path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Appends a named segment.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        if self.0.is_empty() {
            Self(segment.to_string())
        } else {
            Self(format!("{}/{segment}", self.0))
        }
    }

    /// Appends a list-index segment, rendered as `[i]`.
    #[must_use]
    pub fn index(&self, i: usize) -> Self {
        self.child(&format!("[{i}]"))
    }

    /// Returns the raw path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Returns the path relative to `base`, if `base` is a prefix.
    #[must_use]
    pub fn strip_prefix(&self, base: &Self) -> Option<Self> {
        if base.0.is_empty() {
            return Some(self.clone());
        }
        if self.0 == base.0 {
            return Some(Self(String::new()));
        }
        self.0
            .strip_prefix(&format!("{}/", base.0))
            .map(|rest| Self(rest.to_string()))
    }

    /// Returns true if the path is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Fqn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Fqn {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for Fqn {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_and_index() {
        let fqn = Fqn::new("pipeline").child("stages").index(0).child("stage");
        assert_eq!(fqn.as_str(), "pipeline/stages/[0]/stage");
    }

    #[test]
    fn test_child_of_empty() {
        assert_eq!(Fqn::new("").child("pipeline").as_str(), "pipeline");
    }

    #[test]
    fn test_segments() {
        let fqn = Fqn::new("pipeline/stages/[1]/stage");
        let segs: Vec<_> = fqn.segments().collect();
        assert_eq!(segs, vec!["pipeline", "stages", "[1]", "stage"]);
    }

    #[test]
    fn test_strip_prefix() {
        let base = Fqn::new("pipeline");
        let fqn = Fqn::new("pipeline/stages/[0]");
        assert_eq!(
            fqn.strip_prefix(&base),
            Some(Fqn::new("stages/[0]"))
        );
        assert_eq!(base.strip_prefix(&base), Some(Fqn::new("")));
        assert_eq!(Fqn::new("other/stages").strip_prefix(&base), None);
    }
}
