use std::sync::Arc;
use std::thread;

use ruletree::{Engine, EvaluationOptions, Registry, RuleNode};
use serde_json::{Value, json};

fn main() {
    let registry = Registry::new()
        .predicate("eligible", |i: &Value| i["age"].as_i64() >= Some(18))
        .predicate("active", |i: &Value| i["status"] == "active")
        .action("allowed", |i: &Value| json!({"allowed": true, "age": i["age"]}))
        .action("denied", |i: &Value| json!({"allowed": false, "age": i["age"]}));

    let rules = RuleNode::new()
        .nested("eligible", |n| n.when("active", "allowed").otherwise("denied"))
        .otherwise("denied");

    let engine = Arc::new(
        Engine::compile(&registry, &rules)
            .expect("failed to compile rule tree")
            .with_options(EvaluationOptions::new().trace(false)),
    );

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let input = json!({"age": 16 + i, "status": "active"});
                match engine.evaluate_blocking(&input) {
                    Ok(outcome) => println!("Thread {i}: {}", outcome.result()),
                    Err(e) => println!("Thread {i}: {e}"),
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}
