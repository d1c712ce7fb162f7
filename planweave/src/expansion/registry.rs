//! Module registry: who owns which expandable fields and node types, and
//! how to reach each module's expansion endpoint.

use super::{ExpansionRequest, ExpansionResponse};
use crate::errors::ExpansionError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Remote expansion endpoint for one module.
///
/// Accepts a whole batch per pass and returns responses in any order;
/// partial-batch failure is expressed per response, a transport-level
/// failure by the outer `Err`.
#[async_trait]
pub trait ExpansionEndpoint: Send + Sync {
    /// Expands a batch of requests owned by this module.
    async fn expand(
        &self,
        batch: Vec<ExpansionRequest>,
    ) -> Result<Vec<ExpansionResponse>, ExpansionError>;
}

/// Registration record for one module.
pub struct ModuleRegistration {
    /// Module name, e.g. `cd`.
    pub name: String,
    /// Field names this module expands.
    pub expandable_fields: BTreeSet<String>,
    /// Node types this module owns, used for diagnostics.
    pub supported_types: BTreeSet<String>,
    /// The module's expansion endpoint.
    pub endpoint: Arc<dyn ExpansionEndpoint>,
}

impl ModuleRegistration {
    /// Creates a registration.
    #[must_use]
    pub fn new(name: impl Into<String>, endpoint: Arc<dyn ExpansionEndpoint>) -> Self {
        Self {
            name: name.into(),
            expandable_fields: BTreeSet::new(),
            supported_types: BTreeSet::new(),
            endpoint,
        }
    }

    /// Declares an expandable field name.
    #[must_use]
    pub fn with_expandable_field(mut self, field: impl Into<String>) -> Self {
        self.expandable_fields.insert(field.into());
        self
    }

    /// Declares an owned node type.
    #[must_use]
    pub fn with_supported_type(mut self, node_type: impl Into<String>) -> Self {
        self.supported_types.insert(node_type.into());
        self
    }
}

/// Registry mapping field names and node types to their owning module.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: RwLock<BTreeMap<String, ModuleRegistration>>,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module, replacing any previous registration by name.
    pub fn register(&self, registration: ModuleRegistration) {
        self.modules
            .write()
            .insert(registration.name.clone(), registration);
    }

    /// Returns the module owning a field name, if any.
    ///
    /// Module names are ordered, so when two modules claim the same field
    /// the winner is deterministic.
    #[must_use]
    pub fn module_for_field(&self, field: &str) -> Option<String> {
        self.modules
            .read()
            .values()
            .find(|m| m.expandable_fields.contains(field))
            .map(|m| m.name.clone())
    }

    /// Returns the module owning a node type, if any.
    #[must_use]
    pub fn module_for_type(&self, node_type: &str) -> Option<String> {
        self.modules
            .read()
            .values()
            .find(|m| m.supported_types.contains(node_type))
            .map(|m| m.name.clone())
    }

    /// Returns a module's expansion endpoint.
    #[must_use]
    pub fn endpoint(&self, module: &str) -> Option<Arc<dyn ExpansionEndpoint>> {
        self.modules
            .read()
            .get(module)
            .map(|m| Arc::clone(&m.endpoint))
    }

    /// Returns the registered module names.
    #[must_use]
    pub fn module_names(&self) -> Vec<String> {
        self.modules.read().keys().cloned().collect()
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.module_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockEndpoint;

    #[test]
    fn test_field_and_type_lookup() {
        let registry = ModuleRegistry::new();
        registry.register(
            ModuleRegistration::new("cd", Arc::new(MockEndpoint::new()))
                .with_expandable_field("serviceRef")
                .with_supported_type("deployment"),
        );

        assert_eq!(registry.module_for_field("serviceRef").as_deref(), Some("cd"));
        assert_eq!(registry.module_for_field("unknown"), None);
        assert_eq!(registry.module_for_type("deployment").as_deref(), Some("cd"));
        assert!(registry.endpoint("cd").is_some());
        assert!(registry.endpoint("ci").is_none());
    }
}
