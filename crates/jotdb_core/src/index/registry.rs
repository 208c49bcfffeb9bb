//! Registry of named secondary indexes.

use crate::error::{CoreError, CoreResult};
use crate::index::hash::HashFieldIndex;
use crate::index::traits::{FieldIndex, IndexKind, IndexSpec};
use crate::table::Table;
use crate::types::{Document, Key};
use serde_json::Value;
use std::collections::HashMap;

/// Owns the registered secondary indexes and keeps them consistent with
/// the table.
///
/// Indexes are created lazily, the first time a field is registered, by
/// backfilling from the current table state. After that every mutation
/// routes through [`IndexRegistry::on_insert`] / [`IndexRegistry::on_remove`],
/// so between public store operations each index holds exactly the
/// (value, key) pairs of live records containing its field.
#[derive(Default)]
pub struct IndexRegistry {
    indexes: HashMap<String, Box<dyn FieldIndex>>,
}

impl IndexRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an index on `field`, backfilling it from `table`.
    ///
    /// A field that is already registered is left untouched; in
    /// particular the backfill does not run twice.
    pub fn register(&mut self, field: &str, kind: IndexKind, table: &Table) {
        if self.indexes.contains_key(field) {
            return;
        }

        let mut index: Box<dyn FieldIndex> =
            Box::new(HashFieldIndex::new(IndexSpec::new(field, kind)));

        for record in table.records() {
            if let Some(doc) = &record.doc {
                if let Some(value) = doc.get(field) {
                    index.add(value, record.key.clone());
                }
            }
        }

        tracing::debug!(field, entries = index.len(), "index registered");
        self.indexes.insert(field.to_owned(), index);
    }

    /// Registers a pre-built index collaborator, backfilling it from `table`.
    ///
    /// This is the seam for plugging in an external index implementation
    /// instead of the bundled hash index.
    pub fn register_index(&mut self, mut index: Box<dyn FieldIndex>, table: &Table) {
        let field = index.spec().field.clone();
        if self.indexes.contains_key(&field) {
            return;
        }

        for record in table.records() {
            if let Some(doc) = &record.doc {
                if let Some(value) = doc.get(&field) {
                    index.add(value, record.key.clone());
                }
            }
        }

        self.indexes.insert(field, index);
    }

    /// Indexes `doc`'s fields for `key` on every registered index.
    pub fn on_insert(&mut self, doc: &Document, key: &Key) {
        for (field, index) in &mut self.indexes {
            if let Some(value) = doc.get(field) {
                index.add(value, key.clone());
            }
        }
    }

    /// Removes every index entry referencing `key`.
    pub fn on_remove(&mut self, key: &str) {
        for index in self.indexes.values_mut() {
            index.remove_key(key);
        }
    }

    /// Searches the index on `field` for keys whose value equals `value`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotSearchable`] if `field` has no registered
    /// index.
    pub fn search(&self, field: &str, value: &Value) -> CoreResult<Vec<Key>> {
        match self.indexes.get(field) {
            Some(index) => Ok(index.search(value)),
            None => Err(CoreError::not_searchable(field)),
        }
    }

    /// Returns true if `field` has a registered index.
    #[must_use]
    pub fn is_registered(&self, field: &str) -> bool {
        self.indexes.contains_key(field)
    }

    /// Returns the number of registered indexes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// Returns true if no index is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

impl std::fmt::Debug for IndexRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexRegistry")
            .field("fields", &self.indexes.keys().collect::<Vec<_>>())
            .finish()
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

    fn table_with(entries: &[(&str, serde_json::Value)]) -> Table {
        let mut table = Table::new();
        for (key, value) in entries {
            table.insert(Key::new(*key), doc(value.clone()));
        }
        table
    }

    #[test]
    fn register_backfills_from_table() {
        let table = table_with(&[
            ("_1", json!({"type": "x"})),
            ("_2", json!({"type": "y"})),
            ("_3", json!({"other": 1})),
        ]);

        let mut registry = IndexRegistry::new();
        registry.register("type", IndexKind::text(), &table);

        assert_eq!(registry.search("type", &json!("x")).unwrap(), vec![Key::new("_1")]);
        assert_eq!(registry.search("type", &json!("y")).unwrap(), vec![Key::new("_2")]);
    }

    #[test]
    fn reregister_is_noop() {
        let table = table_with(&[("_1", json!({"type": "x"}))]);

        let mut registry = IndexRegistry::new();
        registry.register("type", IndexKind::text(), &table);
        registry.register("type", IndexKind::text(), &table);

        // A second registration must not double-insert backfilled entries.
        assert_eq!(registry.search("type", &json!("x")).unwrap().len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn search_unregistered_field_fails() {
        let registry = IndexRegistry::new();
        let err = registry.search("ghost", &json!("v")).unwrap_err();
        assert!(matches!(err, CoreError::NotSearchable { field } if field == "ghost"));
    }

    #[test]
    fn on_insert_updates_all_matching_indexes() {
        let table = Table::new();
        let mut registry = IndexRegistry::new();
        registry.register("name", IndexKind::text(), &table);
        registry.register("age", IndexKind::Numeric, &table);

        registry.on_insert(&doc(json!({"name": "ada", "age": 36})), &Key::new("_1"));

        assert_eq!(registry.search("name", &json!("ada")).unwrap(), vec![Key::new("_1")]);
        assert_eq!(registry.search("age", &json!(36)).unwrap(), vec![Key::new("_1")]);
    }

    #[test]
    fn on_remove_drops_entries_everywhere() {
        let table = Table::new();
        let mut registry = IndexRegistry::new();
        registry.register("name", IndexKind::text(), &table);
        registry.register("age", IndexKind::Numeric, &table);

        registry.on_insert(&doc(json!({"name": "ada", "age": 36})), &Key::new("_1"));
        registry.on_remove("_1");

        assert!(registry.search("name", &json!("ada")).unwrap().is_empty());
        assert!(registry.search("age", &json!(36)).unwrap().is_empty());
    }

    #[test]
    fn stale_entries_do_not_survive_rewrite() {
        let table = Table::new();
        let mut registry = IndexRegistry::new();
        registry.register("name", IndexKind::text(), &table);

        let key = Key::new("_1");
        registry.on_insert(&doc(json!({"name": "before"})), &key);

        // A set() rewrites the document: remove by key, reinsert the new doc.
        registry.on_remove(key.as_str());
        registry.on_insert(&doc(json!({"name": "after"})), &key);

        assert!(registry.search("name", &json!("before")).unwrap().is_empty());
        assert_eq!(registry.search("name", &json!("after")).unwrap(), vec![key]);
    }

    #[test]
    fn custom_index_collaborator() {
        let table = table_with(&[("_1", json!({"tag": "t"}))]);
        let mut registry = IndexRegistry::new();

        let index = Box::new(HashFieldIndex::new(IndexSpec::new("tag", IndexKind::text())));
        registry.register_index(index, &table);

        assert!(registry.is_registered("tag"));
        assert_eq!(registry.search("tag", &json!("t")).unwrap(), vec![Key::new("_1")]);
    }
}
