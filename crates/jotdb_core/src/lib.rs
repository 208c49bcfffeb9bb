//! # jotdb Core
//!
//! An embedded JSON document store: an in-process key/value table with
//! JSON documents, durable through an append-only log, with optional
//! secondary indexes for equality search.
//!
//! This crate provides:
//! - [`Store`] - the facade: add/set/get/del/purge/count/all
//! - an append-only log (one JSON record per line) with batched,
//!   fire-and-forget flushing and startup replay
//! - lazily registered secondary indexes behind the [`FieldIndex`]
//!   capability contract
//! - an event feed carrying readiness and background errors
//!
//! ## Consistency model
//!
//! All operations are synchronous against in-memory state; the log is
//! written asynchronously on cooperative scheduler turns driven by
//! [`Store::tick`] / [`Store::run_pending`]. Mutations that have not had
//! their flush turn yet are lost on a crash - that is the design, not an
//! accident. See `DESIGN.md` at the repository root for the full
//! reasoning.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod events;
mod index;
mod keygen;
mod log;
mod query;
mod scheduler;
mod store;
mod table;
mod types;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use events::{EventFeed, StoreEvent};
pub use index::{FieldIndex, HashFieldIndex, IndexKind, IndexRegistry, IndexSpec, IndexValue};
pub use keygen::KeyGenerator;
pub use log::{decode_line, encode_line, LogWriter};
pub use query::{Criteria, Predicate, Query, Where};
pub use store::Store;
pub use table::Table;
pub use types::{Document, Key, Record};
