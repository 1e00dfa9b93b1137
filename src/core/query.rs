//! Query parameters sent to the rates API

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// A scalar query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Param {
    /// Renders the value the way it appears in a query string.
    pub fn to_query_value(&self) -> String {
        match self {
            Param::Str(s) => s.clone(),
            Param::Int(i) => i.to_string(),
            // Display drops the fraction for whole numbers, so 100.0 becomes "100"
            Param::Float(f) => f.to_string(),
            Param::Bool(true) => "1".to_string(),
            Param::Bool(false) => "0".to_string(),
        }
    }
}

impl Serialize for Param {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Param::Str(s) => serializer.serialize_str(s),
            Param::Int(i) => serializer.serialize_i64(*i),
            Param::Float(f) => serializer.serialize_f64(*f),
            Param::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Str(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Str(value)
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Param::Int(value.into())
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Float(value)
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Bool(value)
    }
}

/// Insertion-ordered query parameters.
///
/// Setting a key that is already present replaces its value without moving it.
/// Serializes as a JSON object in insertion order, which is what the cache key
/// is built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    params: Vec<(String, Param)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chaining form of [`Query::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Param>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Param>) {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.params.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Param> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Param)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Appends `extra` entries whose keys are not already present.
    ///
    /// Required parameters come first and always win over caller supplied ones
    /// with the same name.
    pub fn union(mut self, extra: Query) -> Query {
        for (key, value) in extra.params {
            if !self.contains_key(&key) {
                self.params.push((key, value));
            }
        }
        self
    }

    /// Key/value pairs ready for `reqwest::RequestBuilder::query`.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|(k, v)| (k.clone(), v.to_query_value()))
            .collect()
    }

    /// The parameters sorted by key.
    pub fn sorted(&self) -> BTreeMap<&str, &Param> {
        self.iter().collect()
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.params.len()))?;
        for (k, v) in &self.params {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: Into<Param>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Query::new();
        for (k, v) in iter {
            query.set(k, v);
        }
        query
    }
}
