use ruletree::{Engine, Registry};
use serde_json::{Value, json};

fn main() {
    let registry = Registry::new()
        .predicate("is_customer", |i: &Value| i["userType"] == "customer")
        .predicate("is_admin", |i: &Value| i["userType"] == "admin")
        .predicate("has_account", |i: &Value| i["hasAccount"] == true)
        .predicate("account_active", |i: &Value| i["accountStatus"] == "active")
        .predicate("account_suspended", |i: &Value| i["accountStatus"] == "suspended")
        .predicate("has_subscription", |i: &Value| i["subscriptionLevel"] == "premium")
        .action("premium_content", |_: &Value| json!({"content": "premium"}))
        .action("basic_content", |_: &Value| json!({"content": "basic"}))
        .action("guest_content", |_: &Value| json!({"content": "guest"}))
        .action("account_reactivation", |_: &Value| json!({"content": "reactivation"}))
        .action("admin_dashboard", |_: &Value| json!({"content": "admin"}))
        .action("public_content", |_: &Value| json!({"content": "public"}));

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/access.rules");
    let engine = Engine::from_file(&registry, path).expect("failed to load rules");

    println!("{engine}");

    let inputs = [
        json!({
            "userType": "customer",
            "hasAccount": true,
            "accountStatus": "active",
            "subscriptionLevel": "premium"
        }),
        json!({"userType": "customer", "hasAccount": false}),
        json!({"userType": "customer", "hasAccount": true, "accountStatus": "closed"}),
        json!({"userType": "visitor"}),
    ];

    for input in &inputs {
        match engine.evaluate_blocking(input) {
            Ok(outcome) => println!("{outcome}"),
            Err(e) => println!("{input}: {e}"),
        }
    }
}
