use std::collections::HashMap;
use std::future::Future;

use serde_json::Value;

use super::capability::{Action, BoxError, Capability, Predicate, Truthy};

/// Maps keys to the predicates and actions a rule tree refers to.
///
/// Registering a key twice replaces the earlier capability. Entries the tree
/// never references are harmless.
///
/// # Example
///
/// ```
/// use ruletree::Registry;
/// use serde_json::{Value, json};
///
/// let registry = Registry::new()
///     .predicate("is_human", |i: &Value| i["type"] == "human")
///     .action("homework", |_: &Value| json!({"payload": "doing homework"}));
///
/// assert!(registry.contains("is_human"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    capabilities: HashMap<String, Capability>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a predicate. The return value is coerced with [`Truthy`].
    #[must_use]
    pub fn predicate<F, T>(self, key: &str, f: F) -> Self
    where
        F: Fn(&Value) -> T + Send + Sync + 'static,
        T: Truthy,
    {
        self.with(key, Capability::Predicate(Predicate::new(f)))
    }

    /// Register a predicate that can fail.
    #[must_use]
    pub fn try_predicate<F, T, E>(self, key: &str, f: F) -> Self
    where
        F: Fn(&Value) -> Result<T, E> + Send + Sync + 'static,
        T: Truthy,
        E: Into<BoxError>,
    {
        self.with(key, Capability::Predicate(Predicate::try_new(f)))
    }

    /// Register a synchronous action.
    #[must_use]
    pub fn action<F, R>(self, key: &str, f: F) -> Self
    where
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: Into<Value>,
    {
        self.with(key, Capability::Action(Action::new(f)))
    }

    /// Register a synchronous action that can fail.
    #[must_use]
    pub fn try_action<F, R, E>(self, key: &str, f: F) -> Self
    where
        F: Fn(&Value) -> Result<R, E> + Send + Sync + 'static,
        R: Into<Value>,
        E: Into<BoxError>,
    {
        self.with(key, Capability::Action(Action::try_new(f)))
    }

    /// Register an asynchronous action.
    #[must_use]
    pub fn async_action<F, Fut, R, E>(self, key: &str, f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: Into<Value>,
        E: Into<BoxError>,
    {
        self.with(key, Capability::Action(Action::from_async(f)))
    }

    /// Register an arbitrary capability.
    #[must_use]
    pub fn with(mut self, key: &str, capability: Capability) -> Self {
        self.insert(key, capability);
        self
    }

    /// Register a capability (mutable reference version). Returns the
    /// capability previously stored under `key`, if any.
    pub fn insert(&mut self, key: &str, capability: Capability) -> Option<Capability> {
        self.capabilities.insert(key.to_owned(), capability)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Capability> {
        self.capabilities.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.capabilities.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.capabilities.keys().map(String::as_str)
    }
}
