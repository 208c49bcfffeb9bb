//! # jotdb Storage
//!
//! Append-only storage backends for jotdb.
//!
//! This crate provides the lowest-level storage abstraction for jotdb.
//! Backends are **opaque byte stores**: they append, read back, and flush
//! bytes without interpreting them. The log format (one JSON record per
//! line) is owned entirely by `jotdb_core`.
//!
//! ## Available Backends
//!
//! - [`FileBackend`] - persistent storage over a single log file, with an
//!   optional advisory exclusive lock
//! - [`InMemoryBackend`] - for tests and ephemeral stores
//!
//! ## Example
//!
//! ```rust
//! use jotdb_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let offset = backend.append(b"{\"key\":\"_a\",\"doc\":{}}\n").unwrap();
//! assert_eq!(offset, 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
