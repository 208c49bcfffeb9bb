//! Batched append-only log writer.

use crate::error::CoreError;
use crate::events::EventFeed;
use crate::log::record::encode_line;
use crate::types::Record;
use jotdb_storage::StorageBackend;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// The durability channel: a pending-record queue drained in bounded
/// batches onto an append-only storage backend.
///
/// Mutations enqueue their record here and return immediately; the
/// actual appends happen on later scheduler turns, up to
/// `batch_limit` records per flush cycle. A cycle that leaves the queue
/// non-empty asks to be rescheduled rather than recursing, so a large
/// backlog is drained across turns instead of in one unbounded loop.
///
/// Durability is deliberately weak: the single-flight guard is released
/// when the batch's synchronous drain ends, the backend is not synced
/// per cycle, and a record whose append fails is reported on the event
/// feed and dropped, not requeued. The queue itself is unbounded and
/// applies no backpressure.
pub struct LogWriter {
    /// Storage backend receiving encoded lines.
    backend: Arc<Mutex<Box<dyn StorageBackend>>>,
    /// Records awaiting append, oldest first.
    queue: VecDeque<Record>,
    /// Single-flight guard against re-entrant flush cycles.
    flushing: bool,
    /// Maximum records drained per flush cycle.
    batch_limit: usize,
}

impl LogWriter {
    /// Creates a writer over the given backend.
    pub fn new(backend: Arc<Mutex<Box<dyn StorageBackend>>>, batch_limit: usize) -> Self {
        Self {
            backend,
            queue: VecDeque::new(),
            flushing: false,
            batch_limit: batch_limit.max(1),
        }
    }

    /// Appends a record to the pending queue.
    ///
    /// The caller (the store) is responsible for scheduling a flush turn;
    /// scheduling is idempotent there, so enqueueing while a cycle is
    /// already pending never starts a second concurrent cycle.
    pub fn enqueue(&mut self, record: Record) {
        self.queue.push_back(record);
    }

    /// Runs one flush cycle.
    ///
    /// Drains up to the batch limit from the queue, appending each
    /// record as one encoded line. Append failures are emitted on
    /// `events` and the drain continues with the next record. Returns
    /// true if records remain queued and another cycle should be
    /// scheduled.
    ///
    /// If a cycle is already in progress the call returns immediately.
    pub fn flush_batch(&mut self, events: &EventFeed) -> bool {
        if self.flushing {
            return !self.queue.is_empty();
        }
        self.flushing = true;

        let mut written = 0usize;
        while written < self.batch_limit {
            let Some(record) = self.queue.pop_front() else {
                break;
            };
            written += 1;

            let line = match encode_line(&record) {
                Ok(line) => line,
                Err(err) => {
                    events.emit_error(err);
                    continue;
                }
            };

            if let Err(err) = self.backend.lock().append(line.as_bytes()) {
                // The record is lost; later records still get their chance.
                events.emit_error(CoreError::Storage(err));
            }
        }

        tracing::trace!(written, pending = self.queue.len(), "flush cycle");

        // Guard release does not wait for the storage layer to confirm
        // durability of the appends issued above.
        self.flushing = false;
        !self.queue.is_empty()
    }

    /// Flushes everything and syncs the backend.
    ///
    /// A hard durability barrier for embedders that need one; the store's
    /// normal write path never calls this.
    ///
    /// # Errors
    ///
    /// Returns the first sync failure. Append failures within the drain
    /// are still routed to `events`.
    pub fn sync(&mut self, events: &EventFeed) -> Result<(), CoreError> {
        while self.flush_batch(events) {}
        self.backend.lock().sync()?;
        Ok(())
    }

    /// Returns the number of records awaiting append.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl std::fmt::Debug for LogWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogWriter")
            .field("pending", &self.queue.len())
            .field("flushing", &self.flushing)
            .field("batch_limit", &self.batch_limit)
            .finish()
    }
}
