//! Errors related to the state transitions of a channel.

use std::fmt;

use bitcoin::Amount;
use paychan_elkrem::ElkremError;
use paychan_primitives::{PeerId, StateIdx};
use paychan_wire::MessageType;
use thiserror::Error;

use crate::state::UpdatePhase;

/// The party whose balance failed a reserve check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// This node.
    Local,
    /// The counterparty.
    Remote,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Local => write!(f, "local"),
            Side::Remote => write!(f, "remote"),
        }
    }
}

/// Errors that can occur in the channel state machine.
///
/// Apart from [`ChannelError::ChainVerificationFailed`], the channel is left untouched when an
/// event is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The channel cannot take the requested action in its current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The counterparty sent a message that is not allowed in the current phase.
    #[error("received {message} in phase {phase}")]
    ProtocolViolation {
        /// The kind of message received.
        message: MessageType,
        /// The phase the channel was in.
        phase: UpdatePhase,
    },

    /// An update would leave a party with less than the reserve.
    #[error("{side} balance {balance} is below the required {required}")]
    InsufficientBalance {
        /// The party whose balance is too low.
        side: Side,
        /// The balance of that party before the update.
        balance: Amount,
        /// The balance that party would need.
        required: Amount,
    },

    /// The amount cannot be pushed.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The message came from a peer that does not own the channel.
    #[error("channel belongs to {expected}, message came from {actual}")]
    PeerMismatch {
        /// The counterparty of the channel.
        expected: PeerId,
        /// The peer the message came from.
        actual: PeerId,
    },

    /// The counterparty's signature does not cover this node's commitment.
    #[error("invalid commitment signature for state {state_idx}")]
    SignatureInvalid {
        /// The state the signature was supposed to cover.
        state_idx: StateIdx,
    },

    /// The counterparty revealed a secret that does not match its chain. The channel is frozen.
    #[error(transparent)]
    ChainVerificationFailed(ElkremError),

    /// Nothing has been exchanged on the channel yet.
    #[error("no message to send at state {0}")]
    NothingToSend(StateIdx),

    /// This node's own revocation chain cannot produce the required secret.
    #[error("revocation secret derivation failed: {0}")]
    Elkrem(#[from] ElkremError),
}

impl ChannelError {
    /// Whether the error leaves the channel unusable.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, ChannelError::ChainVerificationFailed(_))
    }
}

/// The result type for channel state transitions.
pub type ChannelResult<T> = Result<T, ChannelError>;
