//! End-to-end assembly scenarios exercising the router, driver, and merger
//! together.

use crate::assembly::{AssemblyDriver, AssemblyOptions, CreatorRegistry, PlanCreator};
use crate::cancellation::CancellationToken;
use crate::document::{DocumentNode, Fqn};
use crate::errors::PlanweaveError;
use crate::expansion::{
    ExpansionEndpoint, ExpansionResponse, ExpansionRouter, ModuleRegistration, ModuleRegistry,
};
use crate::plan::{Dependency, PlanFragment, PlanNode};
use crate::testing::{MockCreator, MockEndpoint};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

/// Four fields owned by module A, one by module B, all at the top level of
/// the stage spec.
fn document() -> Arc<DocumentNode> {
    Arc::new(
        DocumentNode::new("pipeline").with_child(
            "stage",
            DocumentNode::new("stage").with_child(
                "spec",
                DocumentNode::new("spec")
                    .with_scalar("serviceRef", json!("svc"))
                    .with_scalar("envRef", json!("prod"))
                    .with_scalar("infraRef", json!("k8s"))
                    .with_scalar("connectorRef", json!("gh"))
                    .with_scalar("artifactRef", json!("<+input>")),
            ),
        ),
    )
}

fn registries() -> (Arc<ModuleRegistry>, Arc<MockEndpoint>, Arc<MockEndpoint>) {
    let spec = "pipeline/stage/spec";
    let module_a = Arc::new(
        MockEndpoint::new()
            .with_response(ExpansionResponse::success(
                format!("{spec}/serviceRef"),
                json!({"name": "svc"}),
            ))
            .with_response(ExpansionResponse::success(
                format!("{spec}/envRef"),
                json!({"name": "prod"}),
            ))
            .with_response(ExpansionResponse::success(
                format!("{spec}/infraRef"),
                json!({"name": "k8s"}),
            ))
            .with_response(ExpansionResponse::success(
                format!("{spec}/connectorRef"),
                json!({"name": "gh"}),
            )),
    );
    let module_b = Arc::new(MockEndpoint::new().with_response(ExpansionResponse::success(
        format!("{spec}/artifactRef"),
        json!({"tag": "1.0"}),
    )));

    let modules = ModuleRegistry::new();
    modules.register(
        ModuleRegistration::new("module-a", Arc::clone(&module_a) as Arc<dyn ExpansionEndpoint>)
            .with_expandable_field("serviceRef")
            .with_expandable_field("envRef")
            .with_expandable_field("infraRef")
            .with_expandable_field("connectorRef")
            .with_supported_type("stage"),
    );
    modules.register(
        ModuleRegistration::new("module-b", Arc::clone(&module_b) as Arc<dyn ExpansionEndpoint>)
            .with_expandable_field("artifactRef"),
    );
    (Arc::new(modules), module_a, module_b)
}

#[tokio::test]
async fn test_five_fields_two_modules_two_batched_calls() {
    let (modules, module_a, module_b) = registries();
    let router = ExpansionRouter::new(Arc::clone(&modules));

    let set = router
        .expand_tree(&document(), &Fqn::new("pipeline"))
        .await;

    // Exactly one batched call per module, regardless of field count.
    assert_eq!(module_a.call_count(), 1);
    assert_eq!(module_b.call_count(), 1);
    assert_eq!(module_a.recorded_batches()[0].len(), 4);
    assert_eq!(module_b.recorded_batches()[0].len(), 1);
    assert_eq!(set.resolved.len(), 5);
    assert!(set.failed.is_empty());
}

#[tokio::test]
async fn test_expand_then_assemble() {
    let (modules, _a, _b) = registries();
    let router = ExpansionRouter::new(Arc::clone(&modules));
    let doc = document();

    let expansions = Arc::new(router.expand_tree(&doc, &Fqn::new("pipeline")).await);

    // The stage creator folds the expanded service definition into its spec.
    let stage_creator = Arc::new(
        MockCreator::new("stage-creator", &["stage"]).with_behavior(|ctx, dep| {
            let service = ctx
                .expansions
                .value(&Fqn::new("pipeline/stage/spec/serviceRef"))
                .cloned()
                .unwrap_or(serde_json::Value::Null);
            Ok(PlanFragment::new()
                .with_node(
                    PlanNode::new("deploy", "stage", dep.yaml_path.clone())
                        .with_id(dep.node_id.clone())
                        .with_spec(json!({ "service": service })),
                )
                .with_starting_node(dep.node_id.clone()))
        }),
    );
    let creators = CreatorRegistry::new();
    creators.register(Arc::clone(&stage_creator) as Arc<dyn PlanCreator>);
    let driver = AssemblyDriver::new(Arc::new(creators), modules);

    let plan = driver
        .assemble(
            doc,
            Fqn::new("pipeline"),
            PlanFragment::new().with_dependency(Dependency::new("stage-1", "pipeline/stage")),
            expansions,
            &AssemblyOptions::new(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(plan.nodes.len(), 1);
    assert_eq!(
        plan.nodes.get("stage-1").unwrap().spec,
        json!({ "service": {"name": "svc"} })
    );
    assert_eq!(plan.starting_node_id.as_deref(), Some("stage-1"));
    assert!(plan.issues.is_empty());
}

#[tokio::test]
async fn test_unknown_node_type_yields_no_plan() {
    let (modules, _a, _b) = registries();
    let creators = CreatorRegistry::new();
    creators.register(Arc::new(MockCreator::new("stage-creator", &["stage"])));
    let driver = AssemblyDriver::new(Arc::new(creators), modules);

    let err = driver
        .assemble(
            document(),
            Fqn::new("pipeline"),
            // Points at the spec node, whose type no creator claims.
            PlanFragment::new()
                .with_dependency(Dependency::new("spec-1", "pipeline/stage/spec")),
            Arc::new(crate::expansion::ExpansionSet::new()),
            &AssemblyOptions::new(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    match err {
        PlanweaveError::UnresolvableDependencies(inner) => {
            assert_eq!(inner.node_ids, vec!["spec-1".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}
