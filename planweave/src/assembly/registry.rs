//! Creator registry: node type to creator dispatch.

use super::PlanCreator;
use parking_lot::RwLock;
use std::sync::Arc;

/// Registry of plan creators, consulted per dependency by node type.
#[derive(Default)]
pub struct CreatorRegistry {
    creators: RwLock<Vec<Arc<dyn PlanCreator>>>,
}

impl CreatorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a creator. Registration order is dispatch order.
    pub fn register(&self, creator: Arc<dyn PlanCreator>) {
        self.creators.write().push(creator);
    }

    /// Returns the first registered creator supporting a node type.
    #[must_use]
    pub fn creator_for(&self, node_type: &str) -> Option<Arc<dyn PlanCreator>> {
        self.creators
            .read()
            .iter()
            .find(|c| c.supports(node_type))
            .map(Arc::clone)
    }

    /// Returns the registered creator names.
    #[must_use]
    pub fn creator_names(&self) -> Vec<String> {
        self.creators
            .read()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Returns the number of registered creators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.creators.read().len()
    }

    /// Returns true if no creators are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.creators.read().is_empty()
    }
}

impl std::fmt::Debug for CreatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreatorRegistry")
            .field("creators", &self.creator_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCreator;

    #[test]
    fn test_first_supporting_creator_wins() {
        let registry = CreatorRegistry::new();
        registry.register(Arc::new(MockCreator::new("stages", &["stage"])));
        registry.register(Arc::new(MockCreator::new("steps", &["step", "stage"])));

        let creator = registry.creator_for("stage").unwrap();
        assert_eq!(creator.name(), "stages");
        assert!(registry.creator_for("unknown").is_none());
        assert_eq!(registry.len(), 2);
    }
}
