mod capability;
mod compiled;
mod engine;
mod error;
mod node;
mod outcome;
mod registry;

pub use capability::{Action, BoxError, Capability, Predicate, Role, Truthy};
pub(crate) use compiled::{
    CompiledBranch, CompiledCondition, CompiledFallback, CompiledNode, CompiledTerminal,
};
pub use engine::{
    Engine, EvaluationOptions, evaluate, evaluate_all, evaluate_all_blocking, evaluate_blocking,
};
pub use error::{CompileError, EvalError};
pub use node::{Branch, DEFAULT_KEY, RuleNode};
pub use outcome::{Outcome, TraceEntry};
pub use registry::Registry;
