use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

/// Error type returned by fallible capabilities.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

type PredicateFn = dyn Fn(&Value) -> Result<bool, BoxError> + Send + Sync;
type SyncActionFn = dyn Fn(&Value) -> Result<Value, BoxError> + Send + Sync;
type AsyncActionFn = dyn Fn(Value) -> BoxFuture<'static, Result<Value, BoxError>> + Send + Sync;

/// Conversion of a predicate's return value to `bool`.
///
/// Applied once, when the predicate is registered, so the evaluator only
/// ever sees strict booleans. JSON values follow JavaScript truthiness:
/// `null`, `false`, `0`, `NaN` and `""` are false, everything else
/// (including empty arrays and objects) is true.
pub trait Truthy {
    fn truthy(&self) -> bool;
}

impl Truthy for bool {
    fn truthy(&self) -> bool {
        *self
    }
}

macro_rules! truthy_int {
    ($($t:ty),*) => {
        $(impl Truthy for $t {
            fn truthy(&self) -> bool {
                *self != 0
            }
        })*
    };
}

truthy_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Truthy for f64 {
    fn truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for &str {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for String {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: Truthy> Truthy for Option<T> {
    fn truthy(&self) -> bool {
        self.as_ref().is_some_and(Truthy::truthy)
    }
}

impl Truthy for Value {
    fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f.truthy()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }
}

/// The role a capability plays in a rule tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Predicate,
    Action,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Predicate => write!(f, "predicate"),
            Role::Action => write!(f, "action"),
        }
    }
}

/// A registered condition check.
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    pub fn new<F, T>(f: F) -> Self
    where
        F: Fn(&Value) -> T + Send + Sync + 'static,
        T: Truthy,
    {
        Self(Arc::new(move |input: &Value| -> Result<bool, BoxError> {
            Ok(f(input).truthy())
        }))
    }

    pub fn try_new<F, T, E>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<T, E> + Send + Sync + 'static,
        T: Truthy,
        E: Into<BoxError>,
    {
        Self(Arc::new(move |input: &Value| -> Result<bool, BoxError> {
            f(input).map(|v| v.truthy()).map_err(Into::into)
        }))
    }

    pub(crate) fn call(&self, input: &Value) -> Result<bool, BoxError> {
        (self.0)(input)
    }
}

/// A registered result producer. Either synchronous or asynchronous; both
/// are settled through [`Action::invoke`].
#[derive(Clone)]
pub enum Action {
    Sync(Arc<SyncActionFn>),
    Async(Arc<AsyncActionFn>),
}

impl Action {
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: Into<Value>,
    {
        Action::Sync(Arc::new(move |input: &Value| -> Result<Value, BoxError> {
            Ok(f(input).into())
        }))
    }

    pub fn try_new<F, R, E>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<R, E> + Send + Sync + 'static,
        R: Into<Value>,
        E: Into<BoxError>,
    {
        Action::Sync(Arc::new(move |input: &Value| -> Result<Value, BoxError> {
            f(input).map(Into::into).map_err(Into::into)
        }))
    }

    /// Wrap an async function. It receives an owned copy of the input so the
    /// returned future can outlive the evaluation's borrow.
    pub fn from_async<F, Fut, R, E>(f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: Into<Value>,
        E: Into<BoxError>,
    {
        Action::Async(Arc::new(move |input: Value| {
            f(input)
                .map(|res| -> Result<Value, BoxError> { res.map(Into::into).map_err(Into::into) })
                .boxed()
        }))
    }

    #[must_use]
    pub fn is_async(&self) -> bool {
        matches!(self, Action::Async(_))
    }

    /// Run the action and wait for its value, whichever kind it is.
    pub async fn invoke(&self, input: &Value) -> Result<Value, BoxError> {
        match self {
            Action::Sync(f) => f(input),
            Action::Async(f) => f(input.clone()).await,
        }
    }

    /// Run the action on the calling thread, driving an async action to
    /// completion with a local executor.
    pub(crate) fn invoke_blocking(&self, input: &Value) -> Result<Value, BoxError> {
        match self {
            Action::Sync(f) => f(input),
            Action::Async(f) => futures::executor::block_on(f(input.clone())),
        }
    }
}

/// A registry entry: the tagged union of the two capability roles.
#[derive(Clone)]
pub enum Capability {
    Predicate(Predicate),
    Action(Action),
}

impl Capability {
    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Capability::Predicate(_) => Role::Predicate,
            Capability::Action(_) => Role::Action,
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Sync(_) => f.write_str("Action::Sync(..)"),
            Action::Async(_) => f.write_str("Action::Async(..)"),
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Predicate(p) => p.fmt(f),
            Capability::Action(a) => a.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn truthy_scalars() {
        assert!(true.truthy());
        assert!(!false.truthy());
        assert!(3_usize.truthy());
        assert!(!0_i64.truthy());
        assert!(!f64::NAN.truthy());
        assert!(!0.0_f64.truthy());
        assert!("x".truthy());
        assert!(!"".truthy());
        assert!(!None::<bool>.truthy());
        assert!(Some(1_i32).truthy());
    }

    #[test]
    fn truthy_json_follows_js_rules() {
        assert!(!json!(null).truthy());
        assert!(!json!(0).truthy());
        assert!(!json!(0.0).truthy());
        assert!(!json!("").truthy());
        assert!(json!(-1).truthy());
        assert!(json!("0").truthy());
        assert!(json!([]).truthy());
        assert!(json!({}).truthy());
    }

    #[test]
    fn predicate_coerces_once() {
        let p = Predicate::new(|input: &Value| input["items"].as_array().map(Vec::len));
        assert!(p.call(&json!({"items": [1, 2]})).unwrap());
        assert!(!p.call(&json!({"items": []})).unwrap());
        assert!(!p.call(&json!({})).unwrap());
    }

    #[test]
    fn fallible_predicate_propagates_error() {
        let p = Predicate::try_new(|_: &Value| Err::<bool, _>("boom"));
        let err = p.call(&json!({})).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn sync_action_invoke_blocking() {
        let a = Action::new(|input: &Value| json!({"echo": input["x"]}));
        assert!(!a.is_async());
        assert_eq!(
            a.invoke_blocking(&json!({"x": 1})).unwrap(),
            json!({"echo": 1})
        );
    }

    #[test]
    fn async_action_invoke_blocking() {
        let a = Action::from_async(|input: Value| async move {
            Ok::<_, BoxError>(json!({"got": input["x"]}))
        });
        assert!(a.is_async());
        assert_eq!(
            a.invoke_blocking(&json!({"x": "y"})).unwrap(),
            json!({"got": "y"})
        );
    }

    #[test]
    fn capability_roles() {
        let p = Capability::Predicate(Predicate::new(|_: &Value| true));
        let a = Capability::Action(Action::new(|_: &Value| Value::Null));
        assert_eq!(p.role(), Role::Predicate);
        assert_eq!(a.role(), Role::Action);
        assert_eq!(Role::Action.to_string(), "action");
    }
}
