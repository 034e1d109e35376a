//! Errors returned by the node.

use bitcoin::OutPoint;
use paychan_channel_sm::errors::ChannelError;
use paychan_db::errors::DbError;
use paychan_primitives::{PeerId, PeerIdx};
use paychan_wire::WireError;
use thiserror::Error;

/// Why a round started by [`Node::request_push`](crate::Node::request_push) did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundFailure {
    /// The counterparty's answer broke the channel, so the round can never complete.
    #[error("answer rejected: {0}")]
    Rejected(ChannelError),

    /// The completed round could not be saved.
    #[error("failed to persist round: {0}")]
    Storage(String),

    /// Nobody is going to complete the round anymore.
    #[error("round abandoned")]
    Abandoned,
}

/// Errors that can occur in the node.
#[derive(Debug, Error)]
pub enum NodeError {
    /// No peer is known under the transport index.
    #[error("unknown peer index {0}")]
    UnknownPeer(PeerIdx),

    /// The peer is not connected.
    #[error("peer {0} is not connected")]
    NotConnected(PeerId),

    /// No channel is funded by the outpoint.
    #[error("channel {0} not found")]
    ChannelNotFound(OutPoint),

    /// A channel with the outpoint already exists.
    #[error("channel {0} already exists")]
    DuplicateChannel(OutPoint),

    /// The payload could not be decoded.
    #[error("malformed message: {0}")]
    Malformed(#[from] WireError),

    /// The channel state machine rejected the event.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// Loading or saving a channel failed.
    #[error("database error: {0}")]
    Db(#[from] DbError),

    /// The transport layer stopped draining the outbound queue.
    #[error("outbound queue closed")]
    OutboxClosed,

    /// The counterparty did not complete the round in time.
    #[error("push on {0} timed out")]
    PushTimeout(OutPoint),

    /// The round was started but did not complete.
    #[error("round failed: {0}")]
    RoundFailed(#[from] RoundFailure),
}

impl NodeError {
    /// The channel error behind this error, if any.
    pub const fn channel_error(&self) -> Option<&ChannelError> {
        match self {
            NodeError::Channel(e) | NodeError::RoundFailed(RoundFailure::Rejected(e)) => Some(e),
            _ => None,
        }
    }
}

/// The result type for node operations.
pub type NodeResult<T> = Result<T, NodeError>;
