//! Hash index implementation.

use crate::index::traits::{FieldIndex, IndexSpec, IndexValue};
use crate::types::Key;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Hash-based index for O(1) equality lookups.
///
/// `HashFieldIndex` keeps a forward map from normalized value to the
/// set of keys holding that value, and a reverse map from key to its
/// indexed values. The reverse map is what makes key-based removal
/// possible without knowing the value that was originally indexed.
pub struct HashFieldIndex {
    /// Index specification.
    spec: IndexSpec,
    /// Value to keys mapping.
    entries: HashMap<IndexValue, HashSet<Key>>,
    /// Key to values mapping, for removal by key.
    by_key: HashMap<Key, HashSet<IndexValue>>,
    /// Total entry count.
    count: usize,
}

impl HashFieldIndex {
    /// Creates a new hash index.
    #[must_use]
    pub fn new(spec: IndexSpec) -> Self {
        Self {
            spec,
            entries: HashMap::new(),
            by_key: HashMap::new(),
            count: 0,
        }
    }
}

impl FieldIndex for HashFieldIndex {
    fn spec(&self) -> &IndexSpec {
        &self.spec
    }

    fn add(&mut self, value: &Value, key: Key) {
        let Some(normalized) = IndexValue::normalize(value, self.spec.kind) else {
            return;
        };

        let set = self.entries.entry(normalized.clone()).or_default();
        if set.insert(key.clone()) {
            self.count += 1;
        }
        self.by_key.entry(key).or_default().insert(normalized);
    }

    fn search(&self, value: &Value) -> Vec<Key> {
        let Some(normalized) = IndexValue::normalize(value, self.spec.kind) else {
            return Vec::new();
        };

        match self.entries.get(&normalized) {
            Some(set) => set.iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    fn remove_key(&mut self, key: &str) {
        let Some(values) = self.by_key.remove(key) else {
            return;
        };

        for value in values {
            if let Some(set) = self.entries.get_mut(&value) {
                if set.remove(key) {
                    self.count -= 1;
                }
                if set.is_empty() {
                    self.entries.remove(&value);
                }
            }
        }
    }

    fn len(&self) -> usize {
        self.count
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.by_key.clear();
        self.count = 0;
    }
}
