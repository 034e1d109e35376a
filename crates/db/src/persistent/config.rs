//! Configuration of the sled channel store.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants::{CHANNELS_TREE, DEFAULT_BACKOFF_PERIOD, DEFAULT_MAX_RETRY_COUNT};

/// How a [`SledChannelDb`](super::sled_store::SledChannelDb) lays out and writes its channels.
///
/// Every field is optional in a serialized config and falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// The sled tree the channels are kept in. Nodes sharing one sled database need distinct
    /// trees.
    tree_name: String,

    /// Whether a write is flushed to disk before it is acknowledged. Without it sled flushes on
    /// its own schedule and a crash may lose the latest channel states.
    flush_on_write: bool,

    /// Attempts after the first failed write before giving up.
    max_retry_count: usize,

    backoff_period: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            tree_name: CHANNELS_TREE.to_string(),
            flush_on_write: true,
            max_retry_count: DEFAULT_MAX_RETRY_COUNT,
            backoff_period: DEFAULT_BACKOFF_PERIOD,
        }
    }
}

impl DbConfig {
    /// Keeps the channels in the tree called `name`.
    pub fn with_tree_name(self, name: impl Into<String>) -> Self {
        Self {
            tree_name: name.into(),
            ..self
        }
    }

    /// Sets whether each write waits for a flush.
    pub fn with_flush_on_write(self, flush: bool) -> Self {
        Self {
            flush_on_write: flush,
            ..self
        }
    }

    /// Sets the number of retries of a failed write.
    pub fn with_max_retry_count(self, count: usize) -> Self {
        Self {
            max_retry_count: count,
            ..self
        }
    }

    /// Sets the wait between retries.
    pub fn with_backoff_period(self, period: Duration) -> Self {
        Self {
            backoff_period: period,
            ..self
        }
    }

    /// The tree the channels are kept in.
    pub fn tree_name(&self) -> &str {
        &self.tree_name
    }

    /// Whether each write waits for a flush.
    pub const fn flush_on_write(&self) -> bool {
        self.flush_on_write
    }

    /// The number of retries of a failed write.
    pub const fn max_retry_count(&self) -> usize {
        self.max_retry_count
    }

    /// The wait between retries.
    pub const fn backoff_period(&self) -> Duration {
        self.backoff_period
    }
}
