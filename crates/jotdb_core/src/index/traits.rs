//! Index capability contract and value normalization.

use crate::types::Key;
use serde_json::Value;

/// The kind of values an index accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// String values, truncated to `max_len` characters before indexing.
    Text {
        /// Maximum indexed length in characters.
        max_len: usize,
    },
    /// Numeric values.
    Numeric,
}

impl IndexKind {
    /// The default text kind with the conventional 50-character bound.
    #[must_use]
    pub const fn text() -> Self {
        Self::Text { max_len: 50 }
    }
}

/// A normalized, hashable index value.
///
/// Document field values are JSON; an index stores them in normalized
/// form according to its [`IndexKind`]: text indexes hold (possibly
/// truncated) strings, numeric indexes hold numbers. Values of any
/// other JSON type are not indexable and are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexValue {
    /// A text value.
    Text(String),
    /// A numeric value.
    Number(serde_json::Number),
}

impl IndexValue {
    /// Normalizes a JSON value for the given index kind.
    ///
    /// Returns `None` when the value's type does not match the kind,
    /// in which case the (value, key) pair is simply not indexed.
    #[must_use]
    pub fn normalize(value: &Value, kind: IndexKind) -> Option<Self> {
        match (kind, value) {
            (IndexKind::Text { max_len }, Value::String(s)) => {
                Some(Self::Text(truncate_chars(s, max_len)))
            }
            (IndexKind::Numeric, Value::Number(n)) => Some(Self::Number(n.clone())),
            _ => None,
        }
    }
}

/// Truncates a string to at most `max_len` characters on a char boundary.
fn truncate_chars(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => s[..idx].to_owned(),
        None => s.to_owned(),
    }
}

/// Specification for a registered index.
#[derive(Debug, Clone)]
pub struct IndexSpec {
    /// The document field this index covers.
    pub field: String,
    /// The kind of values indexed.
    pub kind: IndexKind,
}

impl IndexSpec {
    /// Creates a new index specification.
    pub fn new(field: impl Into<String>, kind: IndexKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

/// The capability contract an index collaborator must provide.
///
/// The store never depends on how an index is built internally - only
/// on these operations. Removal is by key, not by (value, key): by the
/// time a record is deleted its document may have been rewritten by
/// `set`, so the value originally indexed is no longer known.
pub trait FieldIndex {
    /// Returns the index specification.
    fn spec(&self) -> &IndexSpec;

    /// Indexes `value` for `key`.
    ///
    /// Values that do not match the index kind are ignored.
    fn add(&mut self, value: &Value, key: Key);

    /// Returns the keys whose indexed value equals `value`.
    fn search(&self, value: &Value) -> Vec<Key>;

    /// Removes every entry referencing `key`, regardless of value.
    fn remove_key(&mut self, key: &str);

    /// Returns the number of (value, key) entries in the index.
    fn len(&self) -> usize;

    /// Returns true if the index has no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all entries.
    fn clear(&mut self);
}
