use thiserror::Error;

use super::capability::{BoxError, Role};

/// A rule tree that does not fit the registry it is paired with.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("no {role} registered for key '{key}' (at {})", render_path(path))]
    MissingCapability {
        key: String,
        role: Role,
        path: Vec<String>,
    },

    #[error("key '{key}' has the wrong role, expected {expected} (at {})", render_path(path))]
    WrongRole {
        key: String,
        expected: Role,
        path: Vec<String>,
    },

    #[error("rule node at {} has no branches", render_path(path))]
    EmptyNode { path: Vec<String> },

    #[error("duplicate key '{key}' in rule node at {}", render_path(path))]
    DuplicateKey { key: String, path: Vec<String> },
}

/// Failure of a single evaluation. There is no partial outcome.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Configuration(#[from] CompileError),

    /// No branch of the node at `path` was selected: every condition was
    /// false and the node either has no `default` or its registered
    /// `default` predicate returned false.
    #[error("no branch selected at {}", render_path(path))]
    Unresolved { path: Vec<String> },

    #[error("capability '{key}' failed: {source}")]
    Capability {
        key: String,
        #[source]
        source: BoxError,
    },
}

impl EvalError {
    pub(crate) fn capability(key: &str, source: BoxError) -> Self {
        EvalError::Capability {
            key: key.to_owned(),
            source,
        }
    }
}

fn render_path(path: &[String]) -> String {
    if path.is_empty() {
        "root".to_owned()
    } else {
        format!("root > {}", path.join(" > "))
    }
}
