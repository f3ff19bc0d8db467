use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One condition key inspected during traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Nesting level of the node the key belongs to; the root is 0.
    pub depth: usize,
    pub key: String,
    pub matched: bool,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} => {}", self.depth, self.key, self.matched)
    }
}

/// The result of a successful evaluation.
///
/// Holds the settled value of the selected action, the key of that action,
/// the keys taken to reach it, the traversal trace, and the wall-clock
/// duration.
#[derive(Debug, Clone)]
#[must_use]
pub struct Outcome {
    result: Value,
    terminal: String,
    path: Vec<String>,
    logs: Vec<TraceEntry>,
    duration: Duration,
}

impl Outcome {
    pub(crate) fn new(
        result: Value,
        terminal: String,
        path: Vec<String>,
        logs: Vec<TraceEntry>,
        duration: Duration,
    ) -> Self {
        Self {
            result,
            terminal,
            path,
            logs,
            duration,
        }
    }

    /// Value produced by the terminal action, already awaited.
    #[must_use]
    pub fn result(&self) -> &Value {
        &self.result
    }

    #[must_use]
    pub fn into_result(self) -> Value {
        self.result
    }

    /// Key of the action that produced the result.
    #[must_use]
    pub fn terminal(&self) -> &str {
        &self.terminal
    }

    /// Keys inspected, in inspection order. Empty when tracing is off.
    #[must_use]
    pub fn logs(&self) -> &[TraceEntry] {
        &self.logs
    }

    /// The condition keys taken, from the root down to the terminal,
    /// `default` included. Recorded whether or not tracing is on.
    #[must_use]
    pub fn path(&self) -> Vec<&str> {
        self.path.iter().map(String::as_str).collect()
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {}, path: [{}]",
            self.terminal,
            self.result,
            self.path.join(", ")
        )?;
        if !self.logs.is_empty() {
            write!(f, ", inspected: {}", self.logs.len())?;
        }
        write!(f, ", duration: {:?}", self.duration)
    }
}
