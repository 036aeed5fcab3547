//! Ordered map type for map-valued properties.
//!
//! This module provides [`ValueMap`], a wrapper around [`IndexMap`] keyed by [`Value`].
//! Keys may be any value, including [`Value::Null`], so that a map holding a null key and
//! a null value in distinct entries round-trips faithfully.
//!
//! Iteration follows insertion order, which keeps tree and binary output deterministic.
//! Equality ignores order and the hash is the xor of per-entry hashes.
//!
//! ## Examples
//!
//! ```rust
//! use propcodec::{Value, ValueMap};
//!
//! let mut map = ValueMap::new();
//! map.insert(Value::from("name"), Value::from("Alice"));
//! map.insert(Value::Null, Value::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get(&Value::Null).and_then(|v| v.as_i64()), Some(30));
//! ```

use crate::value::hash_of;
use crate::Value;
use indexmap::IndexMap;
use std::hash::{Hash, Hasher};

/// An insertion-ordered map of values to values.
///
/// # Examples
///
/// ```rust
/// use propcodec::{Value, ValueMap};
///
/// let a: ValueMap = [(Value::from(1), Value::from("x")), (Value::from(2), Value::from("y"))]
///     .into_iter()
///     .collect();
/// let b: ValueMap = [(Value::from(2), Value::from("y")), (Value::from(1), Value::from("x"))]
///     .into_iter()
///     .collect();
///
/// // Order is kept for iteration but ignored for equality
/// assert_eq!(a.keys().next(), Some(&Value::from(1)));
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueMap(IndexMap<Value, Value>);

impl ValueMap {
    /// Creates an empty `ValueMap`.
    #[must_use]
    pub fn new() -> Self {
        ValueMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        ValueMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the old value is returned and the entry
    /// keeps its original position.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, Value, Value> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, Value, Value> {
        self.0.values()
    }

    /// Returns an iterator over the entries, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, Value, Value> {
        self.0.iter()
    }
}

impl Default for ValueMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Hash for ValueMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0
            .iter()
            .fold(0u64, |acc, entry| acc ^ hash_of(&entry))
            .hash(state);
    }
}

impl IntoIterator for ValueMap {
    type Item = (Value, Value);
    type IntoIter = indexmap::map::IntoIter<Value, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValueMap {
    type Item = (&'a Value, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Value, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(Value, Value)> for ValueMap {
    fn from_iter<T: IntoIterator<Item = (Value, Value)>>(iter: T) -> Self {
        ValueMap(IndexMap::from_iter(iter))
    }
}
