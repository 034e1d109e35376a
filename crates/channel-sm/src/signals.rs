//! Outcomes that the channel state machine reports to whoever waits on it.

use bitcoin::{Amount, OutPoint};
use paychan_primitives::StateIdx;

/// The signals that the channel state machine can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelSignal {
    /// A push proposed by this node completed.
    PushCleared {
        /// The channel.
        outpoint: OutPoint,
        /// The amount pushed.
        amount: Amount,
        /// The state the channel is in now.
        state_idx: StateIdx,
    },
    /// The counterparty revoked a state, completing a push it proposed.
    RevocationReceived {
        /// The channel.
        outpoint: OutPoint,
        /// The amount received in the round.
        amount: Amount,
        /// The index of the revoked state.
        revoked_idx: StateIdx,
    },
}
