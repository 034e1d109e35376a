//! Context for the channel state machine.

use bitcoin::{Amount, OutPoint};
use paychan_primitives::{PeerId, PeerIdx};
use serde::{Deserialize, Serialize};

/// The immutable facts about a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelCtx {
    /// The funding output of the channel. Identifies the channel.
    pub outpoint: OutPoint,
    /// The total value locked in the funding output.
    pub capacity: Amount,
    /// The counterparty.
    pub peer_id: PeerId,
    /// The index under which the transport layer knows the counterparty.
    pub peer_idx: PeerIdx,
}

impl ChannelCtx {
    /// Returns the funding outpoint.
    pub const fn outpoint(&self) -> OutPoint {
        self.outpoint
    }

    /// Returns the channel capacity.
    pub const fn capacity(&self) -> Amount {
        self.capacity
    }

    /// Returns the counterparty's identity.
    pub const fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// Returns the counterparty's transport index.
    pub const fn peer_idx(&self) -> PeerIdx {
        self.peer_idx
    }
}
