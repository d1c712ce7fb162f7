//! The expansion router: walks the node tree, batches expandable fields per
//! owning module, issues the batched calls concurrently, and folds the
//! responses into a flat fqn-keyed result set.

use super::{ExpansionOutcome, ExpansionRequest, ExpansionResponse, ExpansionSet, ModuleRegistry};
use crate::document::{is_expression_token, DocumentNode, FieldValue, Fqn};
use crate::errors::ExpansionError;
use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Routes expansion requests to their owning modules.
///
/// Purely functional apart from the remote calls: tree in, responses out.
#[derive(Debug, Clone)]
pub struct ExpansionRouter {
    registry: Arc<ModuleRegistry>,
}

impl ExpansionRouter {
    /// Creates a router over a module registry.
    #[must_use]
    pub fn new(registry: Arc<ModuleRegistry>) -> Self {
        Self { registry }
    }

    /// Walks the tree and collects one request per reachable expandable leaf.
    ///
    /// Direct fields registered as expandable for any module become requests.
    /// Fields nested under another expandable field are only emitted when
    /// their value is an unresolved expression token; literals are captured
    /// once at the outermost expandable field and not re-emitted.
    #[must_use]
    pub fn collect_requests(&self, root: &DocumentNode, base: &Fqn) -> Vec<ExpansionRequest> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        self.walk_node(root, base, false, &mut seen, &mut out);
        debug!(requests = out.len(), "collected expansion requests");
        out
    }

    fn walk_node(
        &self,
        node: &DocumentNode,
        fqn: &Fqn,
        inside_expandable: bool,
        seen: &mut BTreeSet<(String, Fqn)>,
        out: &mut Vec<ExpansionRequest>,
    ) {
        for (name, value) in &node.fields {
            let field_fqn = fqn.child(name);
            if let Some(module) = self.registry.module_for_field(name) {
                let emit = if inside_expandable {
                    matches!(value, FieldValue::Scalar(v) if is_expression_token(v))
                } else {
                    true
                };
                if emit && seen.insert((module.clone(), field_fqn.clone())) {
                    out.push(ExpansionRequest::new(module, field_fqn.clone(), value.to_json()));
                }
                // Everything below an expandable field only surfaces
                // expression-shaped values.
                self.walk_value(value, &field_fqn, true, seen, out);
            } else {
                self.walk_value(value, &field_fqn, inside_expandable, seen, out);
            }
        }
    }

    fn walk_value(
        &self,
        value: &FieldValue,
        fqn: &Fqn,
        inside_expandable: bool,
        seen: &mut BTreeSet<(String, Fqn)>,
        out: &mut Vec<ExpansionRequest>,
    ) {
        match value {
            FieldValue::Node(node) => self.walk_node(node, fqn, inside_expandable, seen, out),
            FieldValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.walk_value(item, &fqn.index(i), inside_expandable, seen, out);
                }
            }
            FieldValue::Scalar(_) => {}
        }
    }

    /// Partitions requests into one batch per owning module.
    ///
    /// Remote round-trips are bounded by the number of modules, never by the
    /// number of fields.
    #[must_use]
    pub fn batch(requests: Vec<ExpansionRequest>) -> BTreeMap<String, Vec<ExpansionRequest>> {
        let mut batches: BTreeMap<String, Vec<ExpansionRequest>> = BTreeMap::new();
        for request in requests {
            batches.entry(request.module.clone()).or_default().push(request);
        }
        batches
    }

    /// Dispatches every module batch concurrently and awaits them together.
    ///
    /// A failed module call fails only that module's requests; a request
    /// with no response is recorded as a per-fqn failure; responses for
    /// unknown fqns are ignored.
    pub async fn dispatch(
        &self,
        batches: BTreeMap<String, Vec<ExpansionRequest>>,
    ) -> ExpansionSet {
        let calls = batches.into_iter().map(|(module, batch)| {
            let endpoint = self.registry.endpoint(&module);
            async move {
                let result = match endpoint {
                    Some(endpoint) => endpoint.expand(batch.clone()).await,
                    None => Err(ExpansionError::new(&module, "no endpoint registered")),
                };
                (module, batch, result)
            }
        });

        let mut set = ExpansionSet::new();
        for (module, batch, result) in join_all(calls).await {
            match result {
                Ok(responses) => correlate(&module, batch, responses, &mut set),
                Err(err) => {
                    warn!(module = %module, error = %err, "module expansion batch failed");
                    for request in batch {
                        set.failed.insert(request.fqn, err.to_string());
                    }
                }
            }
        }
        set
    }

    /// Convenience: collect, batch, and dispatch in one pass.
    pub async fn expand_tree(&self, root: &DocumentNode, base: &Fqn) -> ExpansionSet {
        let requests = self.collect_requests(root, base);
        self.dispatch(Self::batch(requests)).await
    }
}

/// Correlates one module's responses back to its batch purely by fqn.
fn correlate(
    module: &str,
    batch: Vec<ExpansionRequest>,
    responses: Vec<ExpansionResponse>,
    set: &mut ExpansionSet,
) {
    let requested: BTreeSet<Fqn> = batch.iter().map(|r| r.fqn.clone()).collect();
    let mut by_fqn: BTreeMap<Fqn, ExpansionResponse> = BTreeMap::new();
    for response in responses {
        if requested.contains(&response.fqn) {
            by_fqn.insert(response.fqn.clone(), response);
        } else {
            debug!(module = %module, fqn = %response.fqn, "ignoring response with no matching request");
        }
    }

    for request in batch {
        match by_fqn.remove(&request.fqn) {
            Some(response) => match response.outcome {
                ExpansionOutcome::Success(value) => {
                    set.resolved.insert(request.fqn, value);
                }
                ExpansionOutcome::Failure(message) => {
                    set.failed.insert(request.fqn, message);
                }
            },
            None => {
                set.failed.insert(
                    request.fqn,
                    format!("no response from module '{module}'"),
                );
            }
        }
    }
}
