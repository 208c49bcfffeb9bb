//! Core type definitions for jotdb.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// A JSON document: a mapping of named fields to values.
///
/// No schema is enforced; any JSON object is a valid document.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Unique identifier for a record.
///
/// Keys are opaque strings derived from a monotonically increasing
/// sequence counter. They are unique within a store's lifetime and are
/// never reused, even after deletion.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    /// Creates a key from a raw string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A keyed document, or a tombstone marking a deletion.
///
/// `doc == None` is a tombstone. Tombstones are never exposed through
/// read APIs; they exist only in the log, where they record deletions
/// as part of the store's durable history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The record's key.
    pub key: Key,
    /// The document, or `None` (serialized as JSON `null`) for a tombstone.
    pub doc: Option<Document>,
}

impl Record {
    /// Creates a live record.
    #[must_use]
    pub fn new(key: Key, doc: Document) -> Self {
        Self {
            key,
            doc: Some(doc),
        }
    }

    /// Creates a tombstone for a key.
    #[must_use]
    pub fn tombstone(key: Key) -> Self {
        Self { key, doc: None }
    }

    /// Returns true if this record is a tombstone.
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        self.doc.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn key_display_and_borrow() {
        let key = Key::new("_abc");
        assert_eq!(format!("{key}"), "_abc");
        assert_eq!(key.as_str(), "_abc");
    }

    #[test]
    fn record_serializes_doc_inline() {
        let record = Record::new(Key::new("_k1"), doc(json!({"user": "a"})));
        let line = serde_json::to_string(&record).unwrap();
        assert_eq!(line, r#"{"key":"_k1","doc":{"user":"a"}}"#);
    }

    #[test]
    fn tombstone_serializes_as_null_doc() {
        let record = Record::tombstone(Key::new("_k1"));
        assert!(record.is_tombstone());

        let line = serde_json::to_string(&record).unwrap();
        assert_eq!(line, r#"{"key":"_k1","doc":null}"#);
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = Record::new(Key::new("_k2"), doc(json!({"n": 7, "tags": ["x"]})));
        let line = serde_json::to_string(&record).unwrap();
        let back: Record = serde_json::from_str(&line).unwrap();
        assert_eq!(back, record);
    }
}
