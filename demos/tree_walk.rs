use std::sync::{Arc, Weak};

use ruletree::{BoxError, Engine, Registry, RuleNode};
use serde_json::{Value, json};

/// Sums the leaves of a JSON hierarchy. The `visit_children` action holds a
/// weak handle to its own engine and re-evaluates every child with it.
fn build_engine() -> Arc<Engine> {
    let rules = RuleNode::new()
        .nested("is_node", |n| {
            n.when("has_children", "visit_children").otherwise("empty_node")
        })
        .when("is_leaf", "leaf_value")
        .otherwise("unknown");

    Arc::new_cyclic(|weak: &Weak<Engine>| {
        let weak = weak.clone();
        let registry = Registry::new()
            .predicate("is_node", |i: &Value| i["type"] == "node")
            .predicate("is_leaf", |i: &Value| i["type"] == "leaf")
            .predicate("has_children", |i: &Value| i["children"].as_array().map(Vec::len))
            .try_action("visit_children", move |node: &Value| {
                let engine = weak.upgrade().ok_or("engine dropped mid-walk")?;
                let mut total = 0;
                for child in node["children"].as_array().into_iter().flatten() {
                    let outcome = engine.evaluate_blocking(child)?;
                    total += outcome.result()["sum"].as_i64().unwrap_or_default();
                }
                Ok::<_, BoxError>(json!({"id": node["id"], "sum": total}))
            })
            .action("leaf_value", |leaf: &Value| {
                json!({"id": leaf["id"], "sum": leaf["value"]})
            })
            .action("empty_node", |node: &Value| json!({"id": node["id"], "sum": 0}))
            .action("unknown", |_: &Value| json!({"sum": 0}));

        Engine::compile(&registry, &rules).expect("failed to compile rule tree")
    })
}

fn main() {
    let engine = build_engine();

    let tree = json!({
        "id": "root",
        "type": "node",
        "children": [
            {"id": "a", "type": "node", "children": [
                {"id": "a1", "type": "leaf", "value": 10},
                {"id": "a2", "type": "leaf", "value": 20}
            ]},
            {"id": "b", "type": "node", "children": []},
            {"id": "c", "type": "leaf", "value": 12}
        ]
    });

    match engine.evaluate_blocking(&tree) {
        Ok(outcome) => println!("{}", outcome.result()),
        Err(e) => println!("walk failed: {e}"),
    }
}
