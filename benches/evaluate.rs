use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ruletree::{Branch, Engine, EvaluationOptions, Registry, RuleNode};
use serde_json::{Value, json};

/// A registry with `n` predicates `c{i}`, each true when field `f{i}` is,
/// and a single action `hit`.
fn build_registry(n: usize) -> Registry {
    let mut registry = Registry::new().action("hit", |i: &Value| i["id"].clone());
    for i in 0..n {
        let field = format!("f{i}");
        registry = registry.predicate(&format!("c{i}"), move |input: &Value| {
            input[field.as_str()] == true
        });
    }
    registry
}

/// `n` sibling conditions at the root; only the last one holds.
fn build_wide(n: usize) -> (Engine, Value) {
    let mut rules = RuleNode::new();
    for i in 0..n {
        rules = rules.when(&format!("c{i}"), "hit");
    }
    let mut input = json!({"id": "wide"});
    input[format!("f{}", n - 1)] = json!(true);
    (Engine::compile(&build_registry(n), &rules).unwrap(), input)
}

/// A chain of `n` nested levels, one condition each, all holding.
fn build_deep(n: usize) -> (Engine, Value) {
    let mut rules = RuleNode::new().when(&format!("c{}", n - 1), "hit");
    for i in (0..n - 1).rev() {
        let mut parent = RuleNode::new();
        parent.push(&format!("c{i}"), Branch::Nested(rules));
        rules = parent;
    }
    let mut input = json!({"id": "deep"});
    for i in 0..n {
        input[format!("f{i}")] = json!(true);
    }
    (Engine::compile(&build_registry(n), &rules).unwrap(), input)
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_eval");

    for &n in &[5, 20, 50] {
        let (engine, input) = build_wide(n);
        group.bench_function(format!("{n}_wide_traced"), |b| {
            b.iter(|| engine.evaluate_blocking(black_box(&input)));
        });

        let quiet = engine.with_options(EvaluationOptions::new().trace(false));
        group.bench_function(format!("{n}_wide_quiet"), |b| {
            b.iter(|| quiet.evaluate_blocking(black_box(&input)));
        });

        let (engine, input) = build_deep(n);
        group.bench_function(format!("{n}_deep_traced"), |b| {
            b.iter(|| engine.evaluate_blocking(black_box(&input)));
        });
    }

    group.finish();
}

fn bench_compilation(c: &mut Criterion) {
    let mut group = c.benchmark_group("compilation");

    for &n in &[5, 20, 50] {
        let registry = build_registry(n);
        let mut rules = RuleNode::new();
        for i in 0..n {
            rules = rules.when(&format!("c{i}"), "hit");
        }
        group.bench_function(format!("{n}_conditions"), |b| {
            b.iter(|| black_box(Engine::compile(&registry, &rules).unwrap()));
        });
    }

    group.finish();
}

fn bench_dsl_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsl_parse");

    for &n in &[5, 20, 50] {
        let dsl: String = (0..n)
            .map(|i| format!("c{i} {{\n    inner_{i} => hit_{i}\n}}\n"))
            .chain(std::iter::once("default => fallback\n".to_owned()))
            .collect();
        group.bench_function(format!("{n}_blocks"), |b| {
            b.iter(|| RuleNode::from_dsl(black_box(&dsl)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_compilation, bench_dsl_parse);
criterion_main!(benches);
