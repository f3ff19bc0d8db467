use std::fmt;

use serde_json::Value;
use tracing::{debug, instrument};

use super::compiled::CompiledNode;
use super::error::{CompileError, EvalError};
use super::node::RuleNode;
use super::outcome::Outcome;
use super::registry::Registry;

/// Per-engine evaluation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationOptions {
    pub(crate) trace: bool,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self { trace: true }
    }
}

impl EvaluationOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a [`TraceEntry`](super::TraceEntry) for every key inspected.
    /// On by default; when off, [`Outcome::logs`] is empty.
    #[must_use]
    pub fn trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }
}

/// A rule tree validated against a registry. Immutable, thread-safe and
/// designed to live behind `Arc`.
///
/// # Example
///
/// ```
/// use ruletree::{Engine, Registry, RuleNode};
/// use serde_json::{Value, json};
///
/// let registry = Registry::new()
///     .predicate("is_human", |i: &Value| i["type"] == "human")
///     .predicate("is_smart", |i: &Value| i["intelligence"].as_i64() > Some(5))
///     .action("homework", |_: &Value| json!("doing homework"))
///     .action("nap", |_: &Value| json!("napping"));
///
/// let rules = RuleNode::new()
///     .nested("is_human", |n| n.when("is_smart", "homework"))
///     .otherwise("nap");
///
/// let engine = Engine::compile(&registry, &rules).unwrap();
/// let outcome = engine
///     .evaluate_blocking(&json!({"type": "human", "intelligence": 10}))
///     .unwrap();
/// assert_eq!(outcome.result(), &json!("doing homework"));
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    pub(crate) root: CompiledNode,
    pub(crate) options: EvaluationOptions,
}

impl Engine {
    /// Validate `rules` against `registry` and resolve every key.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if a key has no capability, a capability has
    /// the wrong role, a node is empty, or a node repeats a key.
    pub fn compile(registry: &Registry, rules: &RuleNode) -> Result<Self, CompileError> {
        let root = crate::compile::compile(registry, rules)?;
        let engine = Self {
            root,
            options: EvaluationOptions::default(),
        };
        debug!(%engine, "rule tree compiled");
        Ok(engine)
    }

    #[must_use]
    pub fn with_options(mut self, options: EvaluationOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    /// Evaluate against `input`, awaiting the selected action if it is
    /// asynchronous.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Unresolved`] if a level has no matching key and
    /// no `default`, or [`EvalError::Capability`] if a predicate or the
    /// action fails.
    #[instrument(level = "debug", skip_all)]
    pub async fn evaluate(&self, input: &Value) -> Result<Outcome, EvalError> {
        crate::evaluate::evaluate(&self.root, input, &self.options).await
    }

    /// Evaluate on the calling thread. Async actions are driven to
    /// completion with a local executor, so this must not be called from
    /// inside an async runtime.
    ///
    /// # Errors
    ///
    /// Same as [`evaluate()`](Self::evaluate).
    #[instrument(level = "debug", skip_all)]
    pub fn evaluate_blocking(&self, input: &Value) -> Result<Outcome, EvalError> {
        crate::evaluate::evaluate_blocking(&self.root, input, &self.options)
    }

    /// Parse a DSL string and compile it against `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleTreeError`](crate::RuleTreeError) on parse or compile failure.
    pub fn from_dsl(registry: &Registry, input: &str) -> Result<Self, crate::RuleTreeError> {
        let rules = RuleNode::from_dsl(input)?;
        Ok(Self::compile(registry, &rules)?)
    }

    /// Parse a JSON rule tree and compile it against `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleTreeError`](crate::RuleTreeError) on parse or compile failure.
    pub fn from_json(registry: &Registry, input: &str) -> Result<Self, crate::RuleTreeError> {
        let rules = RuleNode::from_json(input)?;
        Ok(Self::compile(registry, &rules)?)
    }

    /// Read a rule tree file (see [`RuleNode::from_file`]) and compile it.
    ///
    /// # Errors
    ///
    /// Returns [`RuleTreeError`](crate::RuleTreeError) on I/O, parse, or compile failure.
    pub fn from_file(
        registry: &Registry,
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, crate::RuleTreeError> {
        let rules = RuleNode::from_file(path)?;
        Ok(Self::compile(registry, &rules)?)
    }

    /// Condition keys referenced by the tree (excluding `default`), depth
    /// first in insertion order. A key appears once per occurrence.
    #[must_use]
    pub fn condition_keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        self.root.collect_condition_keys(&mut keys);
        keys
    }

    /// Terminal action keys referenced by the tree, depth first in
    /// evaluation order. A key appears once per occurrence.
    #[must_use]
    pub fn terminal_keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        self.root.collect_terminal_keys(&mut keys);
        keys
    }

    /// Number of levels in the tree.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Engine({} conditions, {} terminals, depth {})",
            self.condition_keys().len(),
            self.terminal_keys().len(),
            self.depth(),
        )
    }
}

/// Compile and evaluate in one call.
///
/// The tree is validated before any capability runs, so a configuration
/// problem never leaves side effects behind.
///
/// # Errors
///
/// Returns [`EvalError::Configuration`] if the tree does not fit the
/// registry, otherwise as [`Engine::evaluate`].
pub async fn evaluate(
    input: &Value,
    registry: &Registry,
    rules: &RuleNode,
) -> Result<Outcome, EvalError> {
    Engine::compile(registry, rules)?.evaluate(input).await
}

/// Blocking twin of [`evaluate`].
///
/// # Errors
///
/// Same as [`evaluate`].
pub fn evaluate_blocking(
    input: &Value,
    registry: &Registry,
    rules: &RuleNode,
) -> Result<Outcome, EvalError> {
    Engine::compile(registry, rules)?.evaluate_blocking(input)
}

/// Evaluate several rule trees against the same input, in order, returning
/// one outcome per tree. Every tree is validated before the first one runs;
/// the first failure aborts the call.
///
/// # Errors
///
/// As [`evaluate`], for whichever tree fails first.
pub async fn evaluate_all(
    input: &Value,
    registry: &Registry,
    rules: &[RuleNode],
) -> Result<Vec<Outcome>, EvalError> {
    let engines = compile_all(registry, rules)?;
    let mut outcomes = Vec::with_capacity(engines.len());
    for engine in &engines {
        outcomes.push(engine.evaluate(input).await?);
    }
    Ok(outcomes)
}

/// Blocking twin of [`evaluate_all`].
///
/// # Errors
///
/// Same as [`evaluate_all`].
pub fn evaluate_all_blocking(
    input: &Value,
    registry: &Registry,
    rules: &[RuleNode],
) -> Result<Vec<Outcome>, EvalError> {
    compile_all(registry, rules)?
        .iter()
        .map(|engine| engine.evaluate_blocking(input))
        .collect()
}

fn compile_all(registry: &Registry, rules: &[RuleNode]) -> Result<Vec<Engine>, CompileError> {
    rules
        .iter()
        .map(|node| Engine::compile(registry, node))
        .collect()
}
