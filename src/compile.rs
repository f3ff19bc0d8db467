use std::collections::HashSet;

use crate::types::{
    CompiledBranch, CompiledCondition, CompiledFallback, CompiledNode, CompiledTerminal,
};
use crate::{
    Action, Branch, Capability, CompileError, DEFAULT_KEY, Predicate, Registry, Role, RuleNode,
};

/// Resolve every key in `rules` against `registry`.
///
/// Fails on the first problem found, walking the tree depth first in
/// insertion order.
pub(crate) fn compile(registry: &Registry, rules: &RuleNode) -> Result<CompiledNode, CompileError> {
    let mut path = Vec::new();
    compile_node(registry, rules, &mut path)
}

fn compile_node(
    registry: &Registry,
    node: &RuleNode,
    path: &mut Vec<String>,
) -> Result<CompiledNode, CompileError> {
    if node.is_empty() {
        return Err(CompileError::EmptyNode { path: path.clone() });
    }
    check_duplicates(node, path)?;

    let mut conditions = Vec::with_capacity(node.len());
    let mut fallback = None;

    for (key, branch) in node.entries() {
        path.push(key.to_owned());
        let compiled_branch = compile_branch(registry, branch, path);
        path.pop();
        let compiled_branch = compiled_branch?;

        if key == DEFAULT_KEY {
            let predicate = match registry.get(DEFAULT_KEY) {
                None => None,
                Some(_) => Some(resolve_predicate(registry, key, path)?),
            };
            fallback = Some(CompiledFallback {
                predicate,
                branch: compiled_branch,
            });
        } else {
            conditions.push(CompiledCondition {
                key: key.to_owned(),
                predicate: resolve_predicate(registry, key, path)?,
                branch: compiled_branch,
            });
        }
    }

    Ok(CompiledNode {
        conditions,
        fallback,
    })
}

fn compile_branch(
    registry: &Registry,
    branch: &Branch,
    path: &mut Vec<String>,
) -> Result<CompiledBranch, CompileError> {
    match branch {
        Branch::Terminal(key) => Ok(CompiledBranch::Terminal(CompiledTerminal {
            key: key.clone(),
            action: resolve_action(registry, key, path)?,
        })),
        Branch::Nested(node) => Ok(CompiledBranch::Nested(Box::new(compile_node(
            registry, node, path,
        )?))),
    }
}

fn check_duplicates(node: &RuleNode, path: &[String]) -> Result<(), CompileError> {
    let mut seen = HashSet::new();
    for (key, _) in node.entries() {
        if !seen.insert(key) {
            return Err(CompileError::DuplicateKey {
                key: key.to_owned(),
                path: path.to_vec(),
            });
        }
    }
    Ok(())
}

fn resolve_predicate(
    registry: &Registry,
    key: &str,
    path: &[String],
) -> Result<Predicate, CompileError> {
    match registry.get(key) {
        Some(Capability::Predicate(p)) => Ok(p.clone()),
        Some(Capability::Action(_)) => Err(CompileError::WrongRole {
            key: key.to_owned(),
            expected: Role::Predicate,
            path: path.to_vec(),
        }),
        None => Err(CompileError::MissingCapability {
            key: key.to_owned(),
            role: Role::Predicate,
            path: path.to_vec(),
        }),
    }
}

fn resolve_action(registry: &Registry, key: &str, path: &[String]) -> Result<Action, CompileError> {
    match registry.get(key) {
        Some(Capability::Action(a)) => Ok(a.clone()),
        Some(Capability::Predicate(_)) => Err(CompileError::WrongRole {
            key: key.to_owned(),
            expected: Role::Action,
            path: path.to_vec(),
        }),
        None => Err(CompileError::MissingCapability {
            key: key.to_owned(),
            role: Role::Action,
            path: path.to_vec(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::compile;
    use crate::{Branch, CompileError, Registry, Role, RuleNode};

    fn registry() -> Registry {
        Registry::new()
            .predicate("is_human", |i: &Value| i["type"] == "human")
            .predicate("is_kind", |i: &Value| i["kindness"].as_i64() > Some(300))
            .predicate("is_smart", |i: &Value| i["intelligence"].as_i64() > Some(5))
            .action("book", |_: &Value| json!("book"))
            .action("homework", |_: &Value| json!("homework"))
    }

    #[test]
    fn compile_nested_tree() {
        let rules = RuleNode::new()
            .nested("is_human", |n| {
                n.when("is_kind", "book").when("is_smart", "homework")
            })
            .otherwise("homework");
        let compiled = compile(&registry(), &rules).unwrap();
        assert_eq!(compiled.conditions.len(), 1);
        assert_eq!(compiled.conditions[0].key, "is_human");
        let fallback = compiled.fallback.as_ref().unwrap();
        assert!(fallback.predicate.is_none());
        assert_eq!(compiled.depth(), 2);
    }

    #[test]
    fn default_inserted_first_still_splits_out() {
        let rules = RuleNode::new().otherwise("book").when("is_human", "homework");
        let compiled = compile(&registry(), &rules).unwrap();
        assert_eq!(compiled.conditions.len(), 1);
        assert!(compiled.fallback.is_some());
    }

    #[test]
    fn registered_default_predicate_is_resolved() {
        let reg = registry().predicate("default", |_: &Value| true);
        let compiled = compile(&reg, &RuleNode::new().otherwise("book")).unwrap();
        assert!(compiled.fallback.unwrap().predicate.is_some());
    }

    #[test]
    fn missing_predicate() {
        let rules = RuleNode::new().nested("is_human", |n| n.when("is_tall", "book"));
        match compile(&registry(), &rules) {
            Err(CompileError::MissingCapability { key, role, path }) => {
                assert_eq!(key, "is_tall");
                assert_eq!(role, Role::Predicate);
                assert_eq!(path, ["is_human"]);
            }
            other => panic!("expected MissingCapability, got {other:?}"),
        }
    }

    #[test]
    fn missing_action() {
        let rules = RuleNode::new().when("is_human", "fly");
        assert!(matches!(
            compile(&registry(), &rules),
            Err(CompileError::MissingCapability { role: Role::Action, .. })
        ));
    }

    #[test]
    fn missing_action_under_default() {
        let rules = RuleNode::new().otherwise("fly");
        assert!(matches!(
            compile(&registry(), &rules),
            Err(CompileError::MissingCapability { key, .. }) if key == "fly"
        ));
    }

    #[test]
    fn action_used_as_condition() {
        let rules = RuleNode::new().when("book", "homework");
        assert!(matches!(
            compile(&registry(), &rules),
            Err(CompileError::WrongRole { expected: Role::Predicate, .. })
        ));
    }

    #[test]
    fn predicate_used_as_terminal() {
        let rules = RuleNode::new().when("is_human", "is_smart");
        assert!(matches!(
            compile(&registry(), &rules),
            Err(CompileError::WrongRole { expected: Role::Action, .. })
        ));
    }

    #[test]
    fn action_registered_as_default_predicate() {
        let reg = registry().action("default", |_: &Value| json!(null));
        let rules = RuleNode::new().otherwise("book");
        assert!(matches!(
            compile(&reg, &rules),
            Err(CompileError::WrongRole { key, .. }) if key == "default"
        ));
    }

    #[test]
    fn empty_root() {
        assert!(matches!(
            compile(&registry(), &RuleNode::new()),
            Err(CompileError::EmptyNode { path }) if path.is_empty()
        ));
    }

    #[test]
    fn empty_nested_node() {
        let mut rules = RuleNode::new();
        rules.push("is_human", Branch::Nested(RuleNode::new()));
        assert!(matches!(
            compile(&registry(), &rules),
            Err(CompileError::EmptyNode { path }) if path == ["is_human"]
        ));
    }

    #[test]
    fn duplicate_key() {
        let rules = RuleNode::new()
            .when("is_human", "book")
            .when("is_human", "homework");
        assert!(matches!(
            compile(&registry(), &rules),
            Err(CompileError::DuplicateKey { key, .. }) if key == "is_human"
        ));
    }

    #[test]
    fn unused_registry_entries_are_fine() {
        let reg = registry()
            .predicate("never_used", |_: &Value| false)
            .action("also_unused", |_: &Value| json!(0));
        assert!(compile(&reg, &RuleNode::new().otherwise("book")).is_ok());
    }

    #[test]
    fn key_collection_in_tree_order() {
        let rules = RuleNode::new()
            .nested("is_human", |n| {
                n.when("is_kind", "book").when("is_smart", "homework")
            })
            .otherwise("homework");
        let compiled = compile(&registry(), &rules).unwrap();
        let mut conditions = Vec::new();
        compiled.collect_condition_keys(&mut conditions);
        assert_eq!(conditions, ["is_human", "is_kind", "is_smart"]);
        let mut terminals = Vec::new();
        compiled.collect_terminal_keys(&mut terminals);
        assert_eq!(terminals, ["book", "homework", "homework"]);
    }
}
