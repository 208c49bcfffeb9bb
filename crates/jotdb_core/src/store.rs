//! Store facade: open, replay, and the public operation surface.

use crate::config::Config;
use crate::error::CoreResult;
use crate::events::{EventFeed, StoreEvent};
use crate::index::{FieldIndex, IndexKind, IndexRegistry};
use crate::keygen::KeyGenerator;
use crate::log::{replay, LogWriter};
use crate::query::{self, Query};
use crate::scheduler::{Scheduler, Task};
use crate::table::Table;
use crate::types::{Document, Key, Record};
use jotdb_storage::{FileBackend, InMemoryBackend, StorageBackend};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

/// An embedded JSON document store.
///
/// `Store` owns the in-memory table, the key generator, the secondary
/// indexes, and the append-only log writer. All reads and mutations are
/// synchronous; durability is not. Every mutation updates the table and
/// indexes before it returns and enqueues a log record, but the record
/// reaches the log file only on a later flush turn - drive those turns
/// with [`Store::tick`] or [`Store::run_pending`]. A crash between a
/// mutation's return and its flush turn loses that mutation.
///
/// # Example
///
/// ```rust
/// use jotdb_core::{Criteria, Query, Store};
/// use serde_json::json;
///
/// let mut store = Store::open_in_memory();
/// store.register_index("type");
///
/// let doc = json!({"type": "note", "text": "hello"});
/// let key = store.add(doc.as_object().unwrap().clone());
///
/// let notes = store
///     .all(Query::from(Criteria::new().where_field("type", "note")))
///     .unwrap();
/// assert_eq!(notes[0].key, key);
///
/// store.run_pending(); // drain flush turns
/// ```
pub struct Store {
    /// Configuration.
    config: Config,
    /// Live records.
    table: Table,
    /// Key source.
    keygen: KeyGenerator,
    /// Secondary indexes.
    indexes: IndexRegistry,
    /// Append-only log writer.
    writer: LogWriter,
    /// Lifecycle and background-error notifications.
    events: EventFeed,
    /// Cooperative turn queue.
    scheduler: Scheduler,
}

impl Store {
    /// Opens the store backed by the log file at `path`.
    ///
    /// The file is created if missing and locked exclusively; the
    /// existing log, if any, is replayed before this returns, after
    /// which a [`StoreEvent::Ready`] is emitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or another process
    /// holds the lock. Corrupt log lines are not errors here - they are
    /// reported on the event feed and skipped.
    pub fn open(path: &Path) -> CoreResult<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens the store at `path` with a custom configuration.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Store::open`].
    pub fn open_with_config(path: &Path, config: Config) -> CoreResult<Self> {
        let backend = FileBackend::open_exclusive(path)?;
        tracing::debug!(path = %path.display(), "opening store");
        Ok(Self::from_backend(config, Box::new(backend)))
    }

    /// Opens an ephemeral in-memory store.
    ///
    /// Nothing is persisted; useful for tests and caches.
    #[must_use]
    pub fn open_in_memory() -> Self {
        Self::from_backend(Config::default(), Box::new(InMemoryBackend::new()))
    }

    /// Opens the store over a pre-built storage backend.
    #[must_use]
    pub fn open_with_backend(config: Config, backend: Box<dyn StorageBackend>) -> Self {
        Self::from_backend(config, backend)
    }

    /// Opens the store over a shared storage backend handle.
    ///
    /// The handle can be kept by the caller to inspect the log bytes or
    /// to reopen a store over the same data, which is how the in-memory
    /// round-trip tests simulate restarts.
    #[must_use]
    pub fn open_with_shared_backend(
        config: Config,
        backend: Arc<Mutex<Box<dyn StorageBackend>>>,
    ) -> Self {
        let mut table = Table::new();
        let mut keygen = KeyGenerator::new();
        let events = EventFeed::new(config.event_history);

        replay(&backend, &mut table, &mut keygen, &events);
        events.emit(StoreEvent::Ready);

        let writer = LogWriter::new(backend, config.flush_batch_limit);

        Self {
            config,
            table,
            keygen,
            indexes: IndexRegistry::new(),
            writer,
            events,
            scheduler: Scheduler::new(),
        }
    }

    fn from_backend(config: Config, backend: Box<dyn StorageBackend>) -> Self {
        Self::open_with_shared_backend(config, Arc::new(Mutex::new(backend)))
    }

    // ---- writes ----------------------------------------------------------

    /// Adds a document, returning its freshly generated key.
    ///
    /// Never fails: no uniqueness or schema validation exists beyond the
    /// generated key being unique.
    pub fn add(&mut self, doc: Document) -> Key {
        let key = self.keygen.next();
        self.table.insert(key.clone(), doc.clone());
        self.indexes.on_insert(&doc, &key);
        self.log(Record::new(key.clone(), doc));
        key
    }

    /// Adds a document, delivering the key to `notify` on a later turn.
    ///
    /// The mutation itself is applied before this returns; only the
    /// notification is deferred.
    pub fn add_with(&mut self, doc: Document, notify: impl FnOnce(Key) + 'static) {
        let key = self.add(doc);
        self.scheduler.defer(move || notify(key));
    }

    /// Replaces the document at an existing key.
    ///
    /// A no-op (not an error) if the key is absent; nothing is logged in
    /// that case.
    pub fn set(&mut self, key: &Key, doc: Document) {
        if !self.table.contains(key.as_str()) {
            return;
        }

        self.indexes.on_remove(key.as_str());
        self.table.insert(key.clone(), doc.clone());
        self.indexes.on_insert(&doc, key);
        self.log(Record::new(key.clone(), doc));
    }

    /// Deletes the record at a key.
    ///
    /// A no-op if the key is absent. Deletion is logged as a tombstone;
    /// the key is never reused.
    pub fn del(&mut self, key: &Key) {
        if self.table.remove(key.as_str()).is_none() {
            return;
        }

        self.indexes.on_remove(key.as_str());
        self.log(Record::tombstone(key.clone()));
    }

    /// Deletes every record, logging one tombstone per live key.
    pub fn purge(&mut self) {
        for key in self.table.keys() {
            self.del(&key);
        }
    }

    // ---- reads -----------------------------------------------------------

    /// Returns the record at a key, if live.
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&Record> {
        self.table.get(key.as_str())
    }

    /// Looks up a key, delivering the result to `notify` on a later turn.
    ///
    /// The lookup happens now, against current state; only the
    /// notification is deferred.
    pub fn get_with(&mut self, key: &Key, notify: impl FnOnce(Option<Record>) + 'static) {
        let found = self.get(key).cloned();
        self.scheduler.defer(move || notify(found));
    }

    /// Returns the number of live records.
    #[must_use]
    pub fn count(&self) -> usize {
        self.table.len()
    }

    /// Executes a query against current state.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::NotSearchable`] if a field criterion
    /// names a field with no registered index.
    pub fn all(&self, query: Query) -> CoreResult<Vec<Record>> {
        query::execute(&self.table, &self.indexes, &query)
    }

    /// Executes a query, delivering the records to `notify` on a later
    /// turn.
    ///
    /// # Errors
    ///
    /// An unsearchable field fails synchronously, before anything is
    /// scheduled; `notify` is then never invoked.
    pub fn all_with(
        &mut self,
        query: Query,
        notify: impl FnOnce(Vec<Record>) + 'static,
    ) -> CoreResult<()> {
        let records = self.all(query)?;
        self.scheduler.defer(move || notify(records));
        Ok(())
    }

    // ---- indexes ---------------------------------------------------------

    /// Registers a text index on a document field.
    ///
    /// The index is backfilled from current records; registering an
    /// already indexed field is a no-op.
    pub fn register_index(&mut self, field: &str) {
        let kind = IndexKind::Text {
            max_len: self.config.text_index_max_len,
        };
        self.indexes.register(field, kind, &self.table);
    }

    /// Registers a numeric index on a document field.
    pub fn register_index_numeric(&mut self, field: &str) {
        self.indexes.register(field, IndexKind::Numeric, &self.table);
    }

    /// Registers an index of an explicit kind.
    pub fn register_index_with(&mut self, field: &str, kind: IndexKind) {
        self.indexes.register(field, kind, &self.table);
    }

    /// Registers an external index collaborator.
    ///
    /// The collaborator is backfilled from current records and then kept
    /// consistent by every subsequent mutation, exactly like the bundled
    /// hash index.
    pub fn register_index_collaborator(&mut self, index: Box<dyn FieldIndex>) {
        self.indexes.register_index(index, &self.table);
    }

    // ---- scheduling & durability ----------------------------------------

    /// Runs one pending turn (a flush cycle or a deferred notification).
    ///
    /// Returns false if nothing was pending.
    pub fn tick(&mut self) -> bool {
        match self.scheduler.pop() {
            Some(Task::Flush) => {
                if self.writer.flush_batch(&self.events) {
                    self.scheduler.schedule_flush();
                }
                true
            }
            Some(Task::Notify(notify)) => {
                notify();
                true
            }
            None => false,
        }
    }

    /// Drains every pending turn.
    ///
    /// After this returns all enqueued records have been handed to the
    /// storage backend and all deferred notifications have fired. This
    /// does not sync the backend; see [`Store::sync`] for a hard barrier.
    pub fn run_pending(&mut self) {
        while self.tick() {}
    }

    /// Flushes everything and syncs the backend.
    ///
    /// # Errors
    ///
    /// Returns the sync failure, if any.
    pub fn sync(&mut self) -> CoreResult<()> {
        self.writer.sync(&self.events)
    }

    /// Returns the number of records not yet handed to storage.
    #[must_use]
    pub fn pending_writes(&self) -> usize {
        self.writer.pending()
    }

    /// Returns the number of pending scheduler turns.
    #[must_use]
    pub fn pending_turns(&self) -> usize {
        self.scheduler.pending()
    }

    // ---- events ----------------------------------------------------------

    /// Subscribes to store events emitted after this call.
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Returns the event feed, for polling history (including events
    /// emitted during replay, before any subscriber existed).
    #[must_use]
    pub fn events(&self) -> &EventFeed {
        &self.events
    }

    fn log(&mut self, record: Record) {
        self.writer.enqueue(record);
        self.scheduler.schedule_flush();
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("live", &self.table.len())
            .field("keys_issued", &self.keygen.count())
            .field("indexes", &self.indexes.len())
            .field("pending_writes", &self.writer.pending())
            .finish()
    }
}
