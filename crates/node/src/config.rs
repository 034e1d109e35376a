//! Configuration of a node.

use std::time::Duration;

use bitcoin::Amount;
use paychan_primitives::constants::DEFAULT_MIN_BAL;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PUSH_TIMEOUT;

/// Configuration of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// The balance each party has to keep in a channel.
    pub min_bal: Amount,
    /// How long a local push waits for the counterparty before giving up.
    pub push_timeout: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            min_bal: DEFAULT_MIN_BAL,
            push_timeout: DEFAULT_PUSH_TIMEOUT,
        }
    }
}
