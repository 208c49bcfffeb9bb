//! Storage backend trait definition.

use crate::error::StorageResult;

/// A low-level storage backend for jotdb's append-only log.
///
/// Storage backends are **opaque byte stores**. They provide simple
/// operations for appending, reading back, and flushing data. The log
/// format (JSON records, line framing, tombstones) is interpreted
/// entirely by `jotdb_core` - backends never look inside the bytes.
///
/// # Invariants
///
/// - `append` returns the offset where the data was written
/// - `read_at` returns exactly the bytes previously written at that offset
/// - `flush` pushes buffered writes toward the OS; `sync` makes them durable
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - for testing
/// - [`super::FileBackend`] - for persistent storage
pub trait StorageBackend: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the read would extend beyond the current size
    /// or an I/O error occurs.
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Appends data to the end of the storage.
    ///
    /// Returns the offset where the data was written.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Flushes all pending writes toward durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&mut self) -> StorageResult<()>;

    /// Returns the current size of the storage in bytes.
    ///
    /// This is the offset where the next `append` will write.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Syncs all data and metadata to durable storage.
    ///
    /// A stronger guarantee than `flush`: after this returns, previously
    /// appended data survives process termination.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&mut self) -> StorageResult<()>;

    /// Reads the entire contents of the storage.
    ///
    /// Convenience for replay at startup: the whole log is read once and
    /// split into lines by the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined or the read fails.
    fn read_all(&self) -> StorageResult<Vec<u8>> {
        let size = self.size()?;
        self.read_at(0, size as usize)
    }
}
