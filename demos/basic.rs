use ruletree::{Engine, Registry, RuleNode};
use serde_json::{Value, json};

fn main() {
    // Register the functions the tree refers to
    let registry = Registry::new()
        .predicate("you_are_a_human", |i: &Value| i["type"] == "human")
        .predicate("you_are_kind", |i: &Value| i["kindnessLevel"].as_i64() > Some(300))
        .predicate("you_are_smart", |i: &Value| i["intelligence"].as_i64() > Some(5))
        .action("help_me_find_my_book", |_: &Value| {
            json!({"payload": "lets help someone", "effort": "finding the book"})
        })
        .action("please_do_my_homework", |_: &Value| {
            json!({"payload": "doing homework", "effort": "im getting sick"})
        });

    // Describe the decision tree
    let rules = RuleNode::new()
        .nested("you_are_a_human", |n| {
            n.when("you_are_kind", "help_me_find_my_book")
                .when("you_are_smart", "please_do_my_homework")
        })
        .otherwise("please_do_my_homework");

    let engine = Engine::compile(&registry, &rules).expect("failed to compile rule tree");
    println!("{engine}");

    let input = json!({"type": "human", "kindnessLevel": 0, "intelligence": 10});
    match engine.evaluate_blocking(&input) {
        Ok(outcome) => {
            println!("Result: {}", outcome.result());
            for entry in outcome.logs() {
                println!("  {entry}");
            }
        }
        Err(e) => println!("Evaluation failed: {e}"),
    }
}
