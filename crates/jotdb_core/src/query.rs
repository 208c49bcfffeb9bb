//! Query model and execution.

use crate::error::CoreResult;
use crate::index::IndexRegistry;
use crate::table::Table;
use crate::types::Record;
use serde_json::Value;
use std::collections::HashSet;

/// A predicate over records.
pub type Predicate = Box<dyn Fn(&Record) -> bool>;

/// Criteria accepted by [`crate::Store::all`].
///
/// Mirrors the three call shapes of the underlying API: no criteria
/// (full scan), a bare predicate, or a structured filter with an
/// optional `where` clause and pagination.
pub enum Query {
    /// Return every live record.
    All,
    /// Keep records for which the predicate returns true.
    Predicate(Predicate),
    /// Structured filter with optional pagination.
    Criteria(Criteria),
}

impl Query {
    /// A predicate query from a closure.
    pub fn predicate(pred: impl Fn(&Record) -> bool + 'static) -> Self {
        Self::Predicate(Box::new(pred))
    }
}

impl From<Criteria> for Query {
    fn from(criteria: Criteria) -> Self {
        Self::Criteria(criteria)
    }
}

impl std::fmt::Debug for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("Query::All"),
            Self::Predicate(_) => f.write_str("Query::Predicate(..)"),
            Self::Criteria(criteria) => f.debug_tuple("Query::Criteria").field(criteria).finish(),
        }
    }
}

/// A structured filter: a `where` clause plus slice-style pagination.
pub struct Criteria {
    /// The filtering clause.
    pub where_clause: Where,
    /// Maximum number of records returned, after `offset` is applied.
    pub limit: Option<usize>,
    /// Number of records skipped from the front of the result sequence.
    pub offset: Option<usize>,
}

impl Criteria {
    /// Creates criteria that match everything.
    #[must_use]
    pub fn new() -> Self {
        Self {
            where_clause: Where::Any,
            limit: None,
            offset: None,
        }
    }

    /// Adds an equality condition on an indexed field.
    ///
    /// Multiple conditions are OR'd together: a record matches if any
    /// of its fields matches.
    #[must_use]
    pub fn where_field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        match &mut self.where_clause {
            Where::Fields(fields) => fields.push((field.into(), value.into())),
            _ => self.where_clause = Where::Fields(vec![(field.into(), value.into())]),
        }
        self
    }

    /// Filters with a predicate instead of indexed fields.
    #[must_use]
    pub fn where_predicate(mut self, pred: impl Fn(&Record) -> bool + 'static) -> Self {
        self.where_clause = Where::Predicate(Box::new(pred));
        self
    }

    /// Sets the maximum number of records returned.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the number of records skipped.
    #[must_use]
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl Default for Criteria {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Criteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let clause = match &self.where_clause {
            Where::Any => "Any".to_owned(),
            Where::Predicate(_) => "Predicate(..)".to_owned(),
            Where::Fields(fields) => format!("{fields:?}"),
        };
        f.debug_struct("Criteria")
            .field("where", &clause)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

/// The `where` clause of a [`Criteria`].
pub enum Where {
    /// Match every record.
    Any,
    /// Equality on indexed fields, OR'd together.
    Fields(Vec<(String, Value)>),
    /// Arbitrary predicate.
    Predicate(Predicate),
}

/// Executes a query against the current table and index state.
///
/// Field criteria resolve through the index registry: the per-field key
/// sets are unioned (OR semantics), de-duplicated preserving first-seen
/// order, and resolved to current records. Pagination applies `offset`
/// first, then `limit`, whichever branch produced the records. No
/// ordering is imposed beyond that.
pub(crate) fn execute(
    table: &Table,
    registry: &IndexRegistry,
    query: &Query,
) -> CoreResult<Vec<Record>> {
    let (records, limit, offset) = match query {
        Query::All => (scan(table, None), None, None),
        Query::Predicate(pred) => (scan(table, Some(pred)), None, None),
        Query::Criteria(criteria) => {
            let records = match &criteria.where_clause {
                Where::Any => scan(table, None),
                Where::Predicate(pred) => scan(table, Some(pred)),
                Where::Fields(fields) => by_fields(table, registry, fields)?,
            };
            (records, criteria.limit, criteria.offset)
        }
    };

    let offset = offset.unwrap_or(0);
    let limit = limit.unwrap_or(usize::MAX);
    Ok(records.into_iter().skip(offset).take(limit).collect())
}

fn scan(table: &Table, pred: Option<&Predicate>) -> Vec<Record> {
    table
        .records()
        .filter(|record| pred.map_or(true, |p| p(record)))
        .cloned()
        .collect()
}

fn by_fields(
    table: &Table,
    registry: &IndexRegistry,
    fields: &[(String, Value)],
) -> CoreResult<Vec<Record>> {
    // Every field is searched up front so an unregistered one fails the
    // whole call instead of returning a partial union.
    let mut matches = Vec::new();
    for (field, value) in fields {
        matches.extend(registry.search(field, value)?);
    }

    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for key in matches {
        if seen.insert(key.clone()) {
            if let Some(record) = table.get(key.as_str()) {
                records.push(record.clone());
            }
        }
    }
    Ok(records)
}
