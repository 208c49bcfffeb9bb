//! The authoritative in-memory record table.

use crate::types::{Document, Key, Record};
use std::collections::HashMap;

/// The in-memory mapping from key to live record.
///
/// `Table` holds only live records: a deleted key is simply absent
/// (its tombstone lives in the log, not here). The table is a strict
/// projection of the log - apply every logged record in order, dropping
/// tombstoned keys, and this is what remains.
#[derive(Debug, Default)]
pub struct Table {
    records: HashMap<Key, Record>,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record for a key.
    pub fn insert(&mut self, key: Key, doc: Document) {
        self.records.insert(key.clone(), Record::new(key, doc));
    }

    /// Removes the record for a key, returning it if present.
    pub fn remove(&mut self, key: &str) -> Option<Record> {
        self.records.remove(key)
    }

    /// Returns the record for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    /// Returns true if the key holds a live record.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Returns the number of live records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the table has no live records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Iterates over all live records.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Returns all live keys.
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        self.records.keys().cloned().collect()
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
    fn insert_and_get() {
        let mut table = Table::new();
        table.insert(Key::new("_a"), doc(json!({"v": 1})));

        let record = table.get("_a").unwrap();
        assert_eq!(record.key, Key::new("_a"));
        assert!(!record.is_tombstone());
    }

    #[test]
    fn insert_replaces() {
        let mut table = Table::new();
        table.insert(Key::new("_a"), doc(json!({"v": 1})));
        table.insert(Key::new("_a"), doc(json!({"v": 2})));

        assert_eq!(table.len(), 1);
        let record = table.get("_a").unwrap();
        assert_eq!(record.doc.as_ref().unwrap()["v"], json!(2));
    }

    #[test]
    fn remove_returns_record() {
        let mut table = Table::new();
        table.insert(Key::new("_a"), doc(json!({})));

        assert!(table.remove("_a").is_some());
        assert!(table.remove("_a").is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn clear_drops_everything() {
        let mut table = Table::new();
        for i in 0..3 {
            table.insert(Key::new(format!("_{i}")), doc(json!({})));
        }
        assert_eq!(table.len(), 3);

        table.clear();
        assert!(table.is_empty());
    }

    #[test]
    fn keys_lists_live_keys() {
        let mut table = Table::new();
        table.insert(Key::new("_a"), doc(json!({})));
        table.insert(Key::new("_b"), doc(json!({})));

        let mut keys = table.keys();
        keys.sort();
        assert_eq!(keys, vec![Key::new("_a"), Key::new("_b")]);
    }
}
