//! Cross-module field expansion: discovery, batching, and routing.
//!
//! The router turns the document tree into at most one batched remote call
//! per owning module and folds the responses into an [`ExpansionSet`] keyed
//! by fqn.

mod registry;
mod request;
mod router;

pub use registry::{ExpansionEndpoint, ModuleRegistration, ModuleRegistry};
pub use request::{ExpansionOutcome, ExpansionRequest, ExpansionResponse, ExpansionSet};
pub use router::ExpansionRouter;
