//! Defaults for the node.

use std::time::Duration;

/// How long [`Node::request_push`](crate::Node::request_push) waits for a round to complete.
pub const DEFAULT_PUSH_TIMEOUT: Duration = Duration::from_secs(60);
