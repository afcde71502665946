//! Plain export form of a record.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A plain nested value produced by [`RecordNode::export_tree`].
///
/// Elements with simple text content export as [`Value::Text`], elements with
/// children export as [`Value::Map`] and repeated siblings export as
/// [`Value::List`] in document order. Elements with no content at all export
/// as an empty string, never as an absent value.
///
/// Map equality ignores key order; iteration follows insertion order.
/// Serializes untagged, as a JSON string, array or object.
///
/// [`RecordNode::export_tree`]: super::RecordNode::export_tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Text content or an attribute value
    Text(String),
    /// Repeated same-named siblings
    List(Vec<Value>),
    /// Named children
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Returns the text if this is a [`Value::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the entries if this is a [`Value::Map`].
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the items if this is a [`Value::List`].
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a key in a [`Value::Map`].
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Returns true for an empty string, list or map.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Text(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Renders the value as compact JSON text.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
