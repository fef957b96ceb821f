//! Plain-data representation of the provider's user-info payload.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

pub type ProfileMap = BTreeMap<String, ProfileValue>;

/// A profile value with every nested object turned into a [`ProfileMap`] and
/// every array into an ordered list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProfileValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<ProfileValue>),
    Map(ProfileMap),
}

impl ProfileValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ProfileValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ProfileMap> {
        match self {
            ProfileValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Falsy values: null, false, zero, `""`, `"0"`, and empty lists or maps.
    pub fn is_empty(&self) -> bool {
        match self {
            ProfileValue::Null => true,
            ProfileValue::Bool(b) => !b,
            ProfileValue::Number(n) => n.as_f64() == Some(0.0),
            ProfileValue::String(s) => s.is_empty() || s == "0",
            ProfileValue::List(items) => items.is_empty(),
            ProfileValue::Map(map) => map.is_empty(),
        }
    }

    /// Scalar rendering used for identifiers (`"42"` and `42` both give `42`).
    pub fn to_scalar_string(&self) -> Option<String> {
        match self {
            ProfileValue::String(s) => Some(s.clone()),
            ProfileValue::Number(n) => Some(n.to_string()),
            ProfileValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl From<Value> for ProfileValue {
    fn from(value: Value) -> Self {
        normalize(value)
    }
}

/// Recursively converts decoded JSON into plain values. JSON is a tree, so
/// the recursion always terminates.
pub fn normalize(value: Value) -> ProfileValue {
    match value {
        Value::Null => ProfileValue::Null,
        Value::Bool(b) => ProfileValue::Bool(b),
        Value::Number(n) => ProfileValue::Number(n),
        Value::String(s) => ProfileValue::String(s),
        Value::Array(items) => ProfileValue::List(items.into_iter().map(normalize).collect()),
        Value::Object(fields) => ProfileValue::Map(
            fields
                .into_iter()
                .map(|(key, value)| (key, normalize(value)))
                .collect(),
        ),
    }
}

/// Copies `source[from_key]` into `target` at the dotted path `to_path`,
/// creating intermediate maps. No-op when the source field is missing or empty.
pub fn map_profile(source: &ProfileMap, from_key: &str, to_path: &str, target: &mut ProfileMap) {
    let Some(value) = source.get(from_key) else {
        return;
    };
    if value.is_empty() {
        return;
    }

    let mut segments = to_path.split('.').peekable();
    let mut current = target;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value.clone());
            return;
        }

        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| ProfileValue::Map(ProfileMap::new()));
        if !matches!(slot, ProfileValue::Map(_)) {
            *slot = ProfileValue::Map(ProfileMap::new());
        }
        current = match slot {
            ProfileValue::Map(map) => map,
            _ => return,
        };
    }
}
