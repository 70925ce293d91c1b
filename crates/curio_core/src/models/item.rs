//! Items, their stable identity and the soft-delete marker.

use crate::constants::{DELETED_MARKER_KEY, RECORD_ID_KEY};
use crate::CoreError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Stable identity used to match items with their visual elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKey {
    /// Identity carried by the item itself.
    Id(String),
    /// Positional identity for items without an id.
    Position(usize),
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Position(position) => write!(f, "#{}", position),
        }
    }
}

/// A record owned by a hosting feature and governed by a batch manager.
///
/// The manager only reads identity and the soft-delete marker; every other
/// field is opaque and only matters for snapshot comparison.
pub trait Item: Serialize + DeserializeOwned + Clone {
    /// Stable identity, or `None` when the item is only known by position.
    fn identity(&self) -> Option<String>;

    /// Whether the item carries the soft-delete marker.
    fn is_deleted(&self) -> bool;

    /// Set or clear the soft-delete marker.
    fn set_deleted(&mut self, deleted: bool);

    /// Identity key for the item sitting at `position`.
    ///
    /// # Returns
    /// [`ItemKey::Id`] when the item has an identity, otherwise
    /// [`ItemKey::Position`].
    fn key_at(&self, position: usize) -> ItemKey {
        match self.identity() {
            Some(id) => ItemKey::Id(id),
            None => ItemKey::Position(position),
        }
    }
}

/// Generic JSON-object item for hosts without a typed model.
///
/// The soft-delete marker is stored under `_deleted` and only while set, so
/// un-deleting restores the original serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a JSON value.
    ///
    /// # Errors
    /// Returns [`CoreError::Snapshot`] when `value` is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(CoreError::Snapshot(format!(
                "expected a JSON object record, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Builder-style field insert.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert or replace a field, returning the previous value.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.to_string(), value.into())
    }

    /// Borrow the underlying field map.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Human-readable label: `title`, then `name`, then identity.
    pub fn label(&self) -> String {
        ["title", "name"]
            .iter()
            .find_map(|key| self.0.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .or_else(|| self.identity())
            .unwrap_or_else(|| "(untitled)".to_string())
    }
}

impl Item for Record {
    fn identity(&self) -> Option<String> {
        match self.0.get(RECORD_ID_KEY)? {
            Value::String(id) if !id.is_empty() => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    fn is_deleted(&self) -> bool {
        self.0
            .get(DELETED_MARKER_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    fn set_deleted(&mut self, deleted: bool) {
        if deleted {
            self.0
                .insert(DELETED_MARKER_KEY.to_string(), Value::Bool(true));
        } else {
            self.0.remove(DELETED_MARKER_KEY);
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
