//! A nested conditional rule engine.
//!
//! A [`RuleNode`] maps condition keys to either a terminal action key or a
//! nested node. A [`Registry`] maps those keys to predicates and actions.
//! Evaluation walks the tree against an input record, taking the first
//! condition at each level whose predicate holds (or `default` when none
//! does), and returns the value of the action it lands on.
//!
//! ```
//! use ruletree::{Engine, Registry, RuleNode};
//! use serde_json::{Value, json};
//!
//! let registry = Registry::new()
//!     .predicate("is_human", |i: &Value| i["type"] == "human")
//!     .predicate("is_kind", |i: &Value| i["kindness"].as_i64() > Some(300))
//!     .predicate("is_smart", |i: &Value| i["intelligence"].as_i64() > Some(5))
//!     .action("find_book", |_: &Value| json!({"payload": "lets help someone"}))
//!     .action("homework", |_: &Value| json!({"payload": "doing homework"}));
//!
//! let rules = RuleNode::new()
//!     .nested("is_human", |n| n.when("is_kind", "find_book").when("is_smart", "homework"))
//!     .otherwise("homework");
//!
//! let engine = Engine::compile(&registry, &rules).unwrap();
//! let input = json!({"type": "human", "kindness": 0, "intelligence": 10});
//! let outcome = engine.evaluate_blocking(&input).unwrap();
//! assert_eq!(outcome.result()["payload"], "doing homework");
//! ```

mod compile;
mod error;
mod evaluate;
pub mod parse;
mod types;

pub use error::RuleTreeError;
pub use types::{
    Action, BoxError, Branch, Capability, CompileError, DEFAULT_KEY, Engine, EvalError,
    EvaluationOptions, Outcome, Predicate, Registry, Role, RuleNode, TraceEntry, Truthy, evaluate,
    evaluate_all, evaluate_all_blocking, evaluate_blocking,
};
