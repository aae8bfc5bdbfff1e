//! Shared parameter store for behaviours.
//!
//! A [`Blackboard`] belongs to one graph instance. Behaviours read and write
//! it through their tick context; decorators usually test a key on it.
//! Values are stored as JSON so a blackboard can be seeded from and dumped to
//! configuration without a type registry.

use hashbrown::HashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key/value parameters shared by the behaviours of one graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blackboard {
    values: HashMap<String, Value>,
}

impl Blackboard {
    /// Creates an empty blackboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value, returning the previous one for the key.
    ///
    /// Values that cannot be represented as JSON (e.g. maps with non-string
    /// keys) are stored as `null`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Serialize) -> Option<Value> {
        let key = key.into();
        let value = serde_json::to_value(value).unwrap_or_else(|err| {
            tracing::warn!(key = %key, error = %err, "blackboard value is not representable");
            Value::Null
        });
        self.values.insert(key, value)
    }

    /// Returns the raw value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the value for a key converted to `T`.
    ///
    /// Returns `None` if the key is absent or holds a value of another shape.
    #[must_use]
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.values.get(key)?;
        T::deserialize(value).ok()
    }

    /// Returns `true` if the key holds JSON `true`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(Value::Bool(true)))
    }

    /// Removes a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Returns whether the key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether the blackboard is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_and_get_typed() {
        let mut board = Blackboard::new();
        board.set("health", 75_u32);
        board.set("target", "door");

        assert_eq!(board.get_as::<u32>("health"), Some(75));
        assert_eq!(board.get_as::<String>("target").as_deref(), Some("door"));
        assert_eq!(board.get("health"), Some(&json!(75)));
    }

    #[test]
    fn mismatched_type_reads_none() {
        let mut board = Blackboard::new();
        board.set("name", "guard");
        assert_eq!(board.get_as::<u32>("name"), None);
        assert_eq!(board.get_as::<u32>("missing"), None);
    }

    #[test]
    fn set_returns_previous_value() {
        let mut board = Blackboard::new();
        assert!(board.set("alert", false).is_none());
        assert_eq!(board.set("alert", true), Some(json!(false)));
        assert!(board.flag("alert"));
    }

    #[test]
    fn flag_is_false_for_non_bool() {
        let mut board = Blackboard::new();
        board.set("alert", 1);
        assert!(!board.flag("alert"));
        assert!(!board.flag("absent"));
    }

    #[test]
    fn remove_and_clear() {
        let mut board = Blackboard::new();
        board.set("a", 1);
        board.set("b", 2);

        assert_eq!(board.remove("a"), Some(json!(1)));
        assert!(!board.contains("a"));
        assert_eq!(board.len(), 1);

        board.clear();
        assert!(board.is_empty());
    }

    #[test]
    fn deserializes_from_plain_object() {
        let board: Blackboard = serde_json::from_str(r#"{ "speed": 2.5, "alert": true }"#).unwrap();
        assert_eq!(board.get_as::<f64>("speed"), Some(2.5));
        assert!(board.flag("alert"));
    }
}
