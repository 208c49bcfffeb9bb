//! Store configuration.

/// Configuration for opening a store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of queued records drained per flush cycle.
    pub flush_batch_limit: usize,

    /// Maximum indexed length for text index values. Longer strings are
    /// truncated before indexing (and before searching).
    pub text_index_max_len: usize,

    /// Maximum number of events retained for polling on the event feed.
    pub event_history: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flush_batch_limit: 100,
            text_index_max_len: 50,
            event_history: 1024,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flush batch limit.
    #[must_use]
    pub const fn flush_batch_limit(mut self, limit: usize) -> Self {
        self.flush_batch_limit = limit;
        self
    }

    /// Sets the maximum indexed length for text values.
    #[must_use]
    pub const fn text_index_max_len(mut self, len: usize) -> Self {
        self.text_index_max_len = len;
        self
    }

    /// Sets the event feed history size.
    #[must_use]
    pub const fn event_history(mut self, size: usize) -> Self {
        self.event_history = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.flush_batch_limit, 100);
        assert_eq!(config.text_index_max_len, 50);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new().flush_batch_limit(5).text_index_max_len(8);

        assert_eq!(config.flush_batch_limit, 5);
        assert_eq!(config.text_index_max_len, 8);
    }
}
