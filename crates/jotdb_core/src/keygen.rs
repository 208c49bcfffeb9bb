//! Key generation.

use crate::types::Key;
use sha2::{Digest, Sha256};
use std::fmt;

/// Produces unique opaque string keys from a monotonically increasing
/// counter.
///
/// Each key is the hex digest of the counter's decimal form, prefixed
/// with an underscore. The hash is used only as a convenient
/// unique-string generator; nothing cryptographic is claimed. Counter
/// values are never reused, so keys are unique for the lifetime of a
/// store, including across restarts: after replay the counter equals the
/// number of non-tombstone inserts in the log, placing fresh keys past
/// all historical ones.
#[derive(Default)]
pub struct KeyGenerator {
    next: u64,
}

impl KeyGenerator {
    /// Creates a generator starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator with the counter already at `count`.
    #[must_use]
    pub const fn from_count(count: u64) -> Self {
        Self { next: count }
    }

    /// Returns a fresh key and increments the counter.
    pub fn next(&mut self) -> Key {
        let digest = Sha256::digest(self.next.to_string().as_bytes());
        self.next += 1;

        let mut raw = String::with_capacity(1 + digest.len() * 2);
        raw.push('_');
        for byte in digest {
            raw.push_str(&format!("{byte:02x}"));
        }
        Key::new(raw)
    }

    /// Advances the counter without producing a key.
    ///
    /// Called by the loader once per replayed insert so that keys
    /// generated after a restart never collide with historical ones.
    pub fn advance(&mut self) {
        self.next += 1;
    }

    /// Returns the current counter value.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.next
    }
}

impl fmt::Debug for KeyGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyGenerator")
            .field("next", &self.next)
            .finish()
    }
}
