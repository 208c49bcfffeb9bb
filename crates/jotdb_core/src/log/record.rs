//! Log line codec.

use crate::error::{CoreError, CoreResult};
use crate::types::Record;

/// Encodes a record as one log line, including the trailing newline.
///
/// # Errors
///
/// Returns [`CoreError::EncodeFailed`] if the record cannot be
/// serialized (documents built from ordinary JSON values never fail).
pub fn encode_line(record: &Record) -> CoreResult<String> {
    let mut line = serde_json::to_string(record)
        .map_err(|err| CoreError::encode_failed(err.to_string()))?;
    line.push('\n');
    Ok(line)
}

/// Decodes one log line into a record.
///
/// `line` is a single line without its newline. A line that is not a
/// JSON object, or that lacks a string `"key"` member, is corrupt.
///
/// # Errors
///
/// Returns [`CoreError::CorruptRecord`] carrying `line_number` on any
/// parse failure.
pub fn decode_line(line: &str, line_number: usize) -> CoreResult<Record> {
    let value: serde_json::Value = serde_json::from_str(line)
        .map_err(|err| CoreError::corrupt_record(line_number, err.to_string()))?;

    if !value.get("key").map_or(false, serde_json::Value::is_string) {
        return Err(CoreError::corrupt_record(line_number, "record has no key"));
    }

    serde_json::from_value(value)
        .map_err(|err| CoreError::corrupt_record(line_number, err.to_string()))
}
