use std::time::Duration;

pub(crate) const DEFAULT_THREAD_COUNT: u8 = 2;

/// How often the receiving side is polled while waiting for a round to settle.
pub(crate) const SETTLE_POLL_INTERVAL: Duration = Duration::from_millis(20);

pub(crate) const SETTLE_MAX_POLLS: usize = 500;
