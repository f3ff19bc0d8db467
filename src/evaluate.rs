use std::time::Instant;

use serde_json::Value;
use tracing::{debug, trace};

use crate::types::{CompiledBranch, CompiledNode, CompiledTerminal};
use crate::{DEFAULT_KEY, EvalError, EvaluationOptions, Outcome, TraceEntry};

/// The terminal a traversal settled on, the keys taken to reach it, and
/// the trace that led there.
struct Selection<'a> {
    terminal: &'a CompiledTerminal,
    path: Vec<String>,
    logs: Vec<TraceEntry>,
}

pub(crate) async fn evaluate(
    root: &CompiledNode,
    input: &Value,
    options: &EvaluationOptions,
) -> Result<Outcome, EvalError> {
    let start = Instant::now();
    let selection = select(root, input, options)?;
    // The one suspension point of an evaluation.
    let result = selection
        .terminal
        .action
        .invoke(input)
        .await
        .map_err(|e| EvalError::capability(&selection.terminal.key, e))?;
    Ok(finish(selection, result, start))
}

pub(crate) fn evaluate_blocking(
    root: &CompiledNode,
    input: &Value,
    options: &EvaluationOptions,
) -> Result<Outcome, EvalError> {
    let start = Instant::now();
    let selection = select(root, input, options)?;
    let result = selection
        .terminal
        .action
        .invoke_blocking(input)
        .map_err(|e| EvalError::capability(&selection.terminal.key, e))?;
    Ok(finish(selection, result, start))
}

fn finish(selection: Selection<'_>, result: Value, start: Instant) -> Outcome {
    let duration = start.elapsed();
    debug!(terminal = %selection.terminal.key, ?duration, "evaluation complete");
    Outcome::new(
        result,
        selection.terminal.key.clone(),
        selection.path,
        selection.logs,
        duration,
    )
}

/// Walk from `root` to a terminal without suspending. Predicates run in
/// insertion order and the first match wins.
fn select<'a>(
    root: &'a CompiledNode,
    input: &Value,
    options: &EvaluationOptions,
) -> Result<Selection<'a>, EvalError> {
    let mut logs = Vec::new();
    let mut path = Vec::new();
    let mut node = root;
    let mut depth = 0;

    loop {
        let (key, branch) = select_branch(node, input, depth, options, &mut logs)?
            .ok_or_else(|| {
                debug!(?path, "no branch matched");
                EvalError::Unresolved { path: path.clone() }
            })?;
        path.push(key.to_owned());

        match branch {
            CompiledBranch::Terminal(terminal) => {
                debug!(terminal = %terminal.key, ?path, "terminal selected");
                return Ok(Selection {
                    terminal,
                    path,
                    logs,
                });
            }
            CompiledBranch::Nested(nested) => {
                node = nested;
                depth += 1;
            }
        }
    }
}

fn select_branch<'a>(
    node: &'a CompiledNode,
    input: &Value,
    depth: usize,
    options: &EvaluationOptions,
    logs: &mut Vec<TraceEntry>,
) -> Result<Option<(&'a str, &'a CompiledBranch)>, EvalError> {
    for condition in &node.conditions {
        let matched = condition
            .predicate
            .call(input)
            .map_err(|e| EvalError::capability(&condition.key, e))?;
        record(logs, options, depth, &condition.key, matched);
        if matched {
            return Ok(Some((condition.key.as_str(), &condition.branch)));
        }
    }

    let Some(fallback) = &node.fallback else {
        return Ok(None);
    };
    let matched = match &fallback.predicate {
        Some(predicate) => predicate
            .call(input)
            .map_err(|e| EvalError::capability(DEFAULT_KEY, e))?,
        None => true,
    };
    record(logs, options, depth, DEFAULT_KEY, matched);
    Ok(matched.then_some((DEFAULT_KEY, &fallback.branch)))
}

fn record(
    logs: &mut Vec<TraceEntry>,
    options: &EvaluationOptions,
    depth: usize,
    key: &str,
    matched: bool,
) {
    trace!(key, depth, matched, "condition inspected");
    if options.trace {
        logs.push(TraceEntry {
            depth,
            key: key.to_owned(),
            matched,
        });
    }
}
