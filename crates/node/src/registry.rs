//! Per-node registries that serialize access to channels and connect a blocked local push with
//! the inbound message that completes it.

use std::{collections::HashMap, sync::Arc};

use bitcoin::OutPoint;
use futures::channel::oneshot;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::errors::RoundFailure;

/// The outcome delivered to a waiting push.
pub type RoundOutcome = Result<(), RoundFailure>;

/// Completion signals of the pushes in flight, keyed by channel.
///
/// The lock is only held to insert or remove an entry and never across an await point.
#[derive(Debug, Default)]
pub struct PushRegistry {
    pending: Mutex<HashMap<OutPoint, oneshot::Sender<RoundOutcome>>>,
}

impl PushRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a push on `outpoint` and returns the receiving end of its completion signal.
    ///
    /// An earlier entry for the same channel belongs to a push that is no longer being waited on
    /// and is abandoned.
    pub fn register(&self, outpoint: OutPoint) -> oneshot::Receiver<RoundOutcome> {
        let (sender, receiver) = oneshot::channel();
        if let Some(stale) = self.pending.lock().insert(outpoint, sender) {
            warn!(%outpoint, "replacing stale completion signal");
            let _ = stale.send(Err(RoundFailure::Abandoned));
        }

        receiver
    }

    /// Removes the entry for `outpoint` and delivers `outcome` to it.
    ///
    /// Returns whether somebody was waiting.
    pub fn resolve(&self, outpoint: OutPoint, outcome: RoundOutcome) -> bool {
        let Some(sender) = self.pending.lock().remove(&outpoint) else {
            debug!(%outpoint, "no push waiting on channel");
            return false;
        };

        sender.send(outcome).is_ok()
    }

    /// Removes the entry for `outpoint` without signaling it.
    pub fn abandon(&self, outpoint: OutPoint) {
        self.pending.lock().remove(&outpoint);
    }

    /// Whether a push on `outpoint` is registered.
    pub fn is_pending(&self, outpoint: &OutPoint) -> bool {
        self.pending.lock().contains_key(outpoint)
    }

    /// The number of pushes registered.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether no push is registered.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

/// One async lock per channel, so that a channel is loaded, advanced and saved by one task at a
/// time.
#[derive(Debug, Default)]
pub struct ChannelLocks {
    locks: Mutex<HashMap<OutPoint, Arc<tokio::sync::Mutex<()>>>>,
}

impl ChannelLocks {
    /// Creates a new empty set of locks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock of the channel funded by `outpoint`.
    pub fn lock_for(&self, outpoint: OutPoint) -> Arc<tokio::sync::Mutex<()>> {
        self.locks.lock().entry(outpoint).or_default().clone()
    }
}
