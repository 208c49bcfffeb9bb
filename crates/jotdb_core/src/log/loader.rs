//! Startup replay of the append-only log.

use crate::error::CoreError;
use crate::events::EventFeed;
use crate::keygen::KeyGenerator;
use crate::log::record::decode_line;
use crate::table::Table;
use jotdb_storage::StorageBackend;
use parking_lot::Mutex;
use std::sync::Arc;

/// Replays the log into `table` and `keygen`.
///
/// Reads the whole backend and applies each complete line in order:
/// inserts overwrite, tombstones remove, and the key generator advances
/// once per insert so freshly generated keys never collide with
/// historical ones. A final unterminated line is not a record and is
/// ignored; blank lines are skipped.
///
/// A line that fails to parse (or lacks a key) is reported on `events`
/// as a [`CoreError::CorruptRecord`] and skipped; replay continues with
/// the remaining lines. Line numbers in those reports count every
/// physical line, corrupt ones included. Storage failures are likewise
/// reported on `events`; replay stops there and keeps whatever was
/// applied so far.
pub fn replay(
    backend: &Arc<Mutex<Box<dyn StorageBackend>>>,
    table: &mut Table,
    keygen: &mut KeyGenerator,
    events: &EventFeed,
) {
    let bytes = match backend.lock().read_all() {
        Ok(bytes) => bytes,
        Err(err) => {
            events.emit_error(CoreError::Storage(err));
            return;
        }
    };

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            events.emit_error(CoreError::corrupt_record(0, err.to_string()));
            return;
        }
    };

    let mut applied = 0usize;
    let mut corrupt = 0usize;

    // split('\n') yields a final fragment after the last newline; that
    // fragment is either empty or an unterminated partial line, and in
    // both cases it is not a record.
    let mut lines = text.split('\n').enumerate().peekable();
    while let Some((line_number, line)) = lines.next() {
        if lines.peek().is_none() {
            break;
        }
        if line.is_empty() {
            continue;
        }

        match decode_line(line, line_number) {
            Ok(record) => {
                match record.doc {
                    Some(doc) => {
                        table.insert(record.key, doc);
                        keygen.advance();
                    }
                    None => {
                        table.remove(record.key.as_str());
                    }
                }
                applied += 1;
            }
            Err(err) => {
                corrupt += 1;
                events.emit_error(err);
            }
        }
    }

    tracing::debug!(applied, corrupt, live = table.len(), "log replay complete");
}
