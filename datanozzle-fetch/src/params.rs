//! Query parameters.
//!
//! [`Params`] keeps parameters in insertion order so that two requests built
//! from the same calls produce the same query string. List values serialize
//! as repeated keys.

use serde::Serialize;

// ============================================================================
// Param Value
// ============================================================================

/// The value of a single query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// One value, replaced on every set.
    Single(String),
    /// Several values, sent as repeated keys.
    Multiple(Vec<String>),
}

impl ParamValue {
    /// Returns the value if this is a single-valued parameter.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(v) => Some(v),
            Self::Multiple(_) => None,
        }
    }

    /// Returns the values if this is a multi-valued parameter.
    pub fn as_multiple(&self) -> Option<&[String]> {
        match self {
            Self::Single(_) => None,
            Self::Multiple(v) => Some(v),
        }
    }

    /// Iterates over every value, in order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            Self::Single(v) => std::slice::from_ref(v),
            Self::Multiple(v) => v,
        };
        values.iter().map(String::as_str)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

// ============================================================================
// Params
// ============================================================================

/// An insertion-ordered set of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for a key.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns true if the key is set.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Sets a key, replacing any previous value but keeping its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Appends values to a multi-valued key, creating it if absent.
    ///
    /// A single value already stored under the key becomes the first
    /// element of the list.
    pub fn append<I, S>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = key.into();
        let values = values.into_iter().map(Into::into);
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, ParamValue::Multiple(existing))) => existing.extend(values),
            Some((_, slot)) => {
                let previous = std::mem::replace(slot, ParamValue::Multiple(Vec::new()));
                *slot = ParamValue::Multiple(
                    previous.values().map(str::to_string).chain(values).collect(),
                );
            }
            None => self.entries.push((key, ParamValue::Multiple(values.collect()))),
        }
    }

    /// Removes a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Number of keys set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no keys are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over keys and values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flattens into `(key, value)` pairs, repeating keys for list values.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .flat_map(|(k, v)| v.values().map(move |value| (k.clone(), value.to_string())))
            .collect()
    }
}
