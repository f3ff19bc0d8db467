use std::fmt;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::parse::ParseError;

/// Reserved condition key for the fallback branch of a node.
pub const DEFAULT_KEY: &str = "default";

/// What a condition key leads to: an action to invoke, or more conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Branch {
    /// Names the action capability producing the final result.
    Terminal(String),
    /// A nested level of conditions, evaluated against the same input.
    Nested(RuleNode),
}

/// One level of a rule tree: condition keys mapped to branches, in
/// insertion order.
///
/// The evaluator tries the non-`default` keys in the order they were added
/// and commits to the first one whose predicate holds. The `default` entry,
/// wherever it was inserted, is only considered after every other key.
///
/// # Example
///
/// ```
/// use ruletree::RuleNode;
///
/// let rules = RuleNode::new()
///     .nested("is_human", |n| {
///         n.when("is_kind", "help_me_find_my_book")
///             .when("is_smart", "please_do_my_homework")
///     })
///     .otherwise("please_do_my_homework");
///
/// assert_eq!(rules.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleNode {
    entries: Vec<(String, Branch)>,
}

impl RuleNode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition whose branch is a terminal action key.
    #[must_use]
    pub fn when(mut self, condition: &str, terminal: &str) -> Self {
        self.push(condition, Branch::Terminal(terminal.to_owned()));
        self
    }

    /// Add a condition whose branch is a nested node built by the closure.
    #[must_use]
    pub fn nested(mut self, condition: &str, f: impl FnOnce(RuleNode) -> RuleNode) -> Self {
        self.push(condition, Branch::Nested(f(RuleNode::new())));
        self
    }

    /// Add the `default` branch with a terminal action key.
    #[must_use]
    pub fn otherwise(self, terminal: &str) -> Self {
        self.when(DEFAULT_KEY, terminal)
    }

    /// Add the `default` branch with a nested node.
    #[must_use]
    pub fn otherwise_nested(self, f: impl FnOnce(RuleNode) -> RuleNode) -> Self {
        self.nested(DEFAULT_KEY, f)
    }

    /// Append an entry (mutable reference version).
    ///
    /// Duplicate keys are kept here and rejected at compile time.
    pub fn push(&mut self, condition: &str, branch: Branch) {
        self.entries.push((condition.to_owned(), branch));
    }

    /// Entries in insertion order, `default` included.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Branch)> {
        self.entries.iter().map(|(k, b)| (k.as_str(), b))
    }

    /// The `default` branch, if this node has one.
    #[must_use]
    pub fn default_branch(&self) -> Option<&Branch> {
        self.entries
            .iter()
            .find(|(k, _)| k == DEFAULT_KEY)
            .map(|(_, b)| b)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of levels, counting this one.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .entries
            .iter()
            .filter_map(|(_, b)| match b {
                Branch::Nested(n) => Some(n.depth()),
                Branch::Terminal(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Parse a rule tree from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`RuleTreeError`](crate::RuleTreeError) if the text is not
    /// JSON or the JSON is not a valid rule tree.
    pub fn from_json(input: &str) -> Result<Self, crate::RuleTreeError> {
        let value: Value = serde_json::from_str(input)?;
        Ok(Self::try_from(&value)?)
    }

    /// Parse a rule tree written in the text DSL.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the input is not valid DSL syntax.
    pub fn from_dsl(input: &str) -> Result<Self, ParseError> {
        crate::parse::parse(input)
    }

    /// Read a rule tree from a file. Files ending in `.json` are read as
    /// JSON, anything else as DSL.
    ///
    /// # Errors
    ///
    /// Returns [`RuleTreeError`](crate::RuleTreeError) on I/O or parse failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::RuleTreeError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&input)
        } else {
            Ok(Self::from_dsl(&input)?)
        }
    }

    /// The tree as a JSON object, keys in insertion order.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let map = self
            .entries
            .iter()
            .map(|(k, b)| {
                let v = match b {
                    Branch::Terminal(t) => Value::String(t.clone()),
                    Branch::Nested(n) => n.to_json(),
                };
                (k.clone(), v)
            })
            .collect();
        Value::Object(map)
    }
}

impl TryFrom<&Value> for RuleNode {
    type Error = ParseError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = value else {
            return Err(ParseError::new(format!(
                "rule node must be a JSON object, found {value}"
            )));
        };
        let mut node = RuleNode::new();
        for (key, v) in map {
            let branch = match v {
                Value::String(t) => Branch::Terminal(t.clone()),
                Value::Object(_) => Branch::Nested(RuleNode::try_from(v)?),
                other => {
                    return Err(ParseError::new(format!(
                        "branch '{key}' must be a terminal key string or a nested object, found {other}"
                    )));
                }
            };
            node.push(key, branch);
        }
        Ok(node)
    }
}

impl Serialize for RuleNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, branch) in &self.entries {
            match branch {
                Branch::Terminal(t) => map.serialize_entry(key, t)?,
                Branch::Nested(n) => map.serialize_entry(key, n)?,
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RuleNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        RuleNode::try_from(&value).map_err(D::Error::custom)
    }
}

impl fmt::Display for RuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, branch)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match branch {
                Branch::Terminal(t) => write!(f, "{key} => {t}")?,
                Branch::Nested(n) => write!(f, "{key} {n}")?,
            }
        }
        write!(f, "}}")
    }
}
