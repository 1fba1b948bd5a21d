//! Argument sets and bound argument lists.
//!
//! An [`ArgumentSet`] is the mixed by-name/by-position map that flows through
//! the resolver chain. [`OrderedArguments`] is what the binder produces: one
//! value per constructor parameter, in position order.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::slice;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ConstructionError;

/// Key of an [`ArgumentSet`] entry.
///
/// Ordering puts every positional key before every named key; positions sort
/// numerically and names lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArgumentKey {
    Position(usize),
    Name(String),
}

impl ArgumentKey {
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            ArgumentKey::Name(name) => Some(name),
            ArgumentKey::Position(_) => None,
        }
    }

    #[must_use]
    pub const fn as_position(&self) -> Option<usize> {
        match self {
            ArgumentKey::Position(position) => Some(*position),
            ArgumentKey::Name(_) => None,
        }
    }
}

impl fmt::Display for ArgumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentKey::Position(position) => write!(f, "#{position}"),
            ArgumentKey::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for ArgumentKey {
    fn from(position: usize) -> Self {
        ArgumentKey::Position(position)
    }
}

impl From<&str> for ArgumentKey {
    fn from(name: &str) -> Self {
        ArgumentKey::Name(name.to_string())
    }
}

impl From<String> for ArgumentKey {
    fn from(name: String) -> Self {
        ArgumentKey::Name(name)
    }
}

/// Caller- and resolver-supplied arguments, keyed by name or position.
///
/// Plain data: resolvers take a set by value and hand back a replacement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentSet {
    entries: BTreeMap<ArgumentKey, Value>,
}

impl ArgumentSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a named argument.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(ArgumentKey::Name(name.into()), value);
        self
    }

    /// Builder-style insert of a positional argument.
    #[must_use]
    pub fn with_positional(mut self, position: usize, value: impl Into<Value>) -> Self {
        self.insert(ArgumentKey::Position(position), value);
        self
    }

    /// Insert or replace. Returns the previous value for that key.
    pub fn insert(
        &mut self,
        key: impl Into<ArgumentKey>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &ArgumentKey) -> Option<Value> {
        self.entries.remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &ArgumentKey) -> Option<&Value> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn named(&self, name: &str) -> Option<&Value> {
        self.entries.get(&ArgumentKey::Name(name.to_string()))
    }

    #[must_use]
    pub fn positional(&self, position: usize) -> Option<&Value> {
        self.entries.get(&ArgumentKey::Position(position))
    }

    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.named(name).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ArgumentKey, Value> {
        self.entries.iter()
    }

    /// Named keys in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().filter_map(ArgumentKey::as_name)
    }

    /// Values in key order: positions first, then names.
    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.entries.values()
    }

    /// Parse a JSON document: an object yields named arguments, an array
    /// yields positional ones, `null` yields an empty set.
    #[must_use]
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::new()),
            Value::Object(map) => Some(Self::from(map)),
            Value::Array(items) => Some(Self::from(items)),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for ArgumentSet {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter()
            .map(|(k, v)| (ArgumentKey::Name(k), v))
            .collect()
    }
}

impl From<Vec<Value>> for ArgumentSet {
    fn from(items: Vec<Value>) -> Self {
        items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (ArgumentKey::Position(i), v))
            .collect()
    }
}

impl<K: Into<ArgumentKey>> FromIterator<(K, Value)> for ArgumentSet {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<K: Into<ArgumentKey>> Extend<(K, Value)> for ArgumentSet {
    fn extend<I: IntoIterator<Item = (K, Value)>>(&mut self, iter: I) {
        self.entries
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v)));
    }
}

impl IntoIterator for ArgumentSet {
    type Item = (ArgumentKey, Value);
    type IntoIter = btree_map::IntoIter<ArgumentKey, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ArgumentSet {
    type Item = (&'a ArgumentKey, &'a Value);
    type IntoIter = btree_map::Iter<'a, ArgumentKey, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Constructor arguments in parameter order.
///
/// A required parameter nobody supplied is bound to `Value::Null`; whether
/// that is acceptable is the constructor's call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedArguments(Vec<Value>);

impl OrderedArguments {
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn iter(&self) -> slice::Iter<'_, Value> {
        self.0.iter()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }

    /// Deserialize the argument at `index` into `T`.
    ///
    /// A missing index or a `null` value is reported as
    /// [`ConstructionError::MissingArgument`]; a value that does not fit `T`
    /// as [`ConstructionError::InvalidArgument`]. Use
    /// [`take_optional`](Self::take_optional) when `null` is a legitimate value.
    pub fn take<T: DeserializeOwned>(
        &self,
        index: usize,
        name: &str,
    ) -> Result<T, ConstructionError> {
        match self.0.get(index) {
            None | Some(Value::Null) => Err(ConstructionError::MissingArgument {
                name: name.to_string(),
                position: index,
            }),
            Some(value) => decode(value, index, name),
        }
    }

    /// Like [`take`](Self::take), but `null` or a missing index yields `None`.
    pub fn take_optional<T: DeserializeOwned>(
        &self,
        index: usize,
        name: &str,
    ) -> Result<Option<T>, ConstructionError> {
        match self.0.get(index) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => decode(value, index, name).map(Some),
        }
    }
}

fn decode<T: DeserializeOwned>(
    value: &Value,
    index: usize,
    name: &str,
) -> Result<T, ConstructionError> {
    T::deserialize(value).map_err(|err| ConstructionError::InvalidArgument {
        name: name.to_string(),
        position: index,
        reason: err.to_string(),
    })
}

impl From<Vec<Value>> for OrderedArguments {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl<'a> IntoIterator for &'a OrderedArguments {
    type Item = &'a Value;
    type IntoIter = slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
