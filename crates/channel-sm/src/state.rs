//! The mutable part of a channel.

use std::fmt;

use bitcoin::{Amount, SignedAmount};
use paychan_elkrem::RevocationChain;
use paychan_primitives::StateIdx;
use secp256k1::{schnorr, PublicKey};
use serde::{Deserialize, Serialize};

/// Where a channel is within an update round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdatePhase {
    /// No round in flight.
    Idle,
    /// This node proposed pushing `amount` to the counterparty and waits for its answer.
    ///
    /// The persisted state index and balances still describe the state before the push.
    ProposerWaiting {
        /// The amount being pushed.
        amount: Amount,
    },
    /// This node accepted a push of `amount` from the counterparty and waits for the
    /// counterparty to revoke its previous state.
    ///
    /// The state index and balances already include the push.
    ReceiverCommitted {
        /// The amount being received.
        amount: Amount,
    },
}

impl fmt::Display for UpdatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdatePhase::Idle => write!(f, "Idle"),
            UpdatePhase::ProposerWaiting { amount } => write!(f, "ProposerWaiting({amount})"),
            UpdatePhase::ReceiverCommitted { amount } => write!(f, "ReceiverCommitted({amount})"),
        }
    }
}

/// The per-channel ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelState {
    /// This node's balance.
    pub my_amount: Amount,
    /// The index of the latest state this node has committed to.
    pub state_idx: StateIdx,
    /// Where the channel is within an update round.
    pub phase: UpdatePhase,
    /// Both revocation chains of the channel.
    pub chain: RevocationChain,
    /// The counterparty's revocation point for the current state.
    pub their_point: PublicKey,
    /// The counterparty's revocation point for the next state.
    pub their_next_point: PublicKey,
    /// The counterparty's signature over this node's latest commitment.
    pub their_sig: Option<schnorr::Signature>,
    /// Set once the channel is closed. No update is accepted afterwards.
    pub closed: bool,
    /// Set when the counterparty revealed an invalid secret. The channel has to be closed out of
    /// band and takes part in no further rounds.
    pub frozen: bool,
}

impl ChannelState {
    /// Creates the state of a freshly opened channel.
    pub const fn new(
        my_amount: Amount,
        chain: RevocationChain,
        their_point: PublicKey,
        their_next_point: PublicKey,
    ) -> Self {
        Self {
            my_amount,
            state_idx: 0,
            phase: UpdatePhase::Idle,
            chain,
            their_point,
            their_next_point,
            their_sig: None,
            closed: false,
            frozen: false,
        }
    }

    /// The pending adjustment of this node's balance.
    ///
    /// Negative while pushing, positive while receiving and zero when idle.
    pub fn delta(&self) -> SignedAmount {
        match self.phase {
            UpdatePhase::Idle => SignedAmount::ZERO,
            UpdatePhase::ProposerWaiting { amount } => {
                -SignedAmount::from_sat(amount.to_sat() as i64)
            }
            UpdatePhase::ReceiverCommitted { amount } => {
                SignedAmount::from_sat(amount.to_sat() as i64)
            }
        }
    }

    /// Whether no round is in flight.
    pub const fn is_idle(&self) -> bool {
        matches!(self.phase, UpdatePhase::Idle)
    }

    /// Whether the channel can take part in rounds.
    pub const fn is_operational(&self) -> bool {
        !self.closed && !self.frozen
    }
}
