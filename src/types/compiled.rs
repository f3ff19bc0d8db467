use super::capability::{Action, Predicate};

/// A rule node whose keys have been resolved against a
/// [`Registry`](super::Registry).
///
/// Produced by the compilation step and stored inside an
/// [`Engine`](super::Engine). Conditions keep their insertion order; the
/// `default` entry is split out so the evaluator never has to search for it.
#[derive(Debug, Clone)]
pub(crate) struct CompiledNode {
    pub(crate) conditions: Vec<CompiledCondition>,
    pub(crate) fallback: Option<CompiledFallback>,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledCondition {
    pub(crate) key: String,
    pub(crate) predicate: Predicate,
    pub(crate) branch: CompiledBranch,
}

/// The `default` entry. `predicate` is `None` when no `default` predicate
/// is registered, in which case the branch is taken unconditionally.
#[derive(Debug, Clone)]
pub(crate) struct CompiledFallback {
    pub(crate) predicate: Option<Predicate>,
    pub(crate) branch: CompiledBranch,
}

#[derive(Debug, Clone)]
pub(crate) enum CompiledBranch {
    Terminal(CompiledTerminal),
    Nested(Box<CompiledNode>),
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledTerminal {
    pub(crate) key: String,
    pub(crate) action: Action,
}

impl CompiledNode {
    pub(crate) fn depth(&self) -> usize {
        1 + self
            .branches()
            .filter_map(|b| match b {
                CompiledBranch::Nested(n) => Some(n.depth()),
                CompiledBranch::Terminal(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Branches in evaluation order: conditions first, then the fallback.
    pub(crate) fn branches(&self) -> impl Iterator<Item = &CompiledBranch> {
        self.conditions
            .iter()
            .map(|c| &c.branch)
            .chain(self.fallback.as_ref().map(|f| &f.branch))
    }

    /// Condition keys (excluding `default`) in tree order, depth first.
    pub(crate) fn collect_condition_keys<'a>(&'a self, out: &mut Vec<&'a str>) {
        for condition in &self.conditions {
            out.push(condition.key.as_str());
            if let CompiledBranch::Nested(n) = &condition.branch {
                n.collect_condition_keys(out);
            }
        }
        if let Some(CompiledFallback {
            branch: CompiledBranch::Nested(n),
            ..
        }) = &self.fallback
        {
            n.collect_condition_keys(out);
        }
    }

    /// Terminal action keys in tree order, depth first.
    pub(crate) fn collect_terminal_keys<'a>(&'a self, out: &mut Vec<&'a str>) {
        for branch in self.branches() {
            match branch {
                CompiledBranch::Terminal(t) => out.push(t.key.as_str()),
                CompiledBranch::Nested(n) => n.collect_terminal_keys(out),
            }
        }
    }
}
