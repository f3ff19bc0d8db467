use thiserror::Error;

use crate::CompileError;
use crate::parse::ParseError;

/// Unified error type covering rule tree loading and compilation.
///
/// Returned by convenience methods like [`Engine::from_dsl()`](crate::Engine::from_dsl)
/// and [`RuleNode::from_file()`](crate::RuleNode::from_file).
#[derive(Debug, Error)]
pub enum RuleTreeError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
