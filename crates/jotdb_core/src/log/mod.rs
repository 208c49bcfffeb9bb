//! Append-only log: line codec, batched writer, and startup replay.
//!
//! The log is the store's only durable artifact. It is a UTF-8 text
//! file holding one JSON object per line, shaped
//! `{"key": <string>, "doc": <object> | null}`, where a `null` doc is a
//! tombstone. Lines are appended and never rewritten; the in-memory
//! table is reconstructed at startup by replaying them in order.

mod loader;
mod record;
mod writer;

pub use loader::replay;
pub use record::{decode_line, encode_line};
pub use writer::LogWriter;
