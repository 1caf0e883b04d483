//! Ordered string-keyed containers for parsed output and context frames

use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;

/// An ordered mapping from field names to [`Value`]s.
///
/// Iteration follows insertion order so that a parsed container builds back
/// in the order its fields appeared on the wire. Equality is deliberately
/// weaker than the iteration contract: two containers are equal when they
/// hold the same key-value set, regardless of insertion order. Containers
/// assembled along different routes — parsed off the wire, written by hand,
/// or flattened out of an embedded struct — therefore compare equal whenever
/// they agree field for field.
///
/// The [`container!`](crate::container!) macro builds one from literal pairs:
///
/// ```
/// use binform::{container, Value};
///
/// let c = container! { "len" => 4, "tag" => "ok" };
/// assert_eq!(c.get("len"), Some(&Value::Int(4)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Container {
    entries: IndexMap<String, Value>,
}

impl Container {
    /// Create an empty container
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the container holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or overwrite a value under `name`.
    ///
    /// Overwriting keeps the key's original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Look up a value by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Remove an entry, preserving the order of the remaining entries
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.shift_remove(name)
    }

    /// True when `name` is present
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Value)> for Container {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        write!(f, "}}")
    }
}

/// Build a [`Container`] from literal `name => value` pairs
#[macro_export]
macro_rules! container {
    () => { $crate::Container::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut c = $crate::Container::new();
        $( c.insert($name, $crate::Value::from($value)); )+
        c
    }};
}
