use std::time::Duration;

use ruletree::{BoxError, Engine, Registry, RuleNode};
use serde_json::{Value, json};

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // RUST_LOG=ruletree=trace shows every key the evaluator inspects
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ruletree=debug".into()),
        )
        .init();

    let registry = Registry::new()
        .predicate("is_async_operation", |i: &Value| i["operation"] == "async")
        .async_action("fetch_remote", |input: Value| async move {
            // stand-in for a network call
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, BoxError>(json!({"status": "completed", "source": "remote", "id": input["id"]}))
        })
        .action("compute_locally", |input: &Value| {
            json!({"status": "completed", "source": "local", "id": input["id"]})
        });

    let rules = RuleNode::new()
        .when("is_async_operation", "fetch_remote")
        .otherwise("compute_locally");

    let engine = Engine::compile(&registry, &rules)?;

    for input in [
        json!({"id": 1, "operation": "async"}),
        json!({"id": 2, "operation": "sync"}),
    ] {
        let outcome = engine.evaluate(&input).await?;
        println!("{outcome}");
    }

    Ok(())
}
