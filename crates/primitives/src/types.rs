//! Identifiers used across the node.

use std::{fmt, str::FromStr};

use secp256k1::{PublicKey, XOnlyPublicKey};
use serde::{Deserialize, Serialize};

/// Index under which the transport layer knows a connected peer.
pub type PeerIdx = u32;

/// Index of a channel state. Starts at zero when the channel is opened and increases by one per
/// completed update round.
pub type StateIdx = u64;

/// The public identity of a counterparty.
///
/// This is the key the counterparty signs commitments with, so it doubles as the verification
/// key for every commitment signature received from that peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(PublicKey);

impl PeerId {
    /// Creates a new [`PeerId`] from the peer's public key.
    pub const fn new(pubkey: PublicKey) -> Self {
        Self(pubkey)
    }

    /// The full public key of the peer.
    pub const fn public_key(&self) -> PublicKey {
        self.0
    }

    /// The x-only part of the key, used for BIP-340 verification.
    pub fn x_only_public_key(&self) -> XOnlyPublicKey {
        self.0.x_only_public_key().0
    }

    /// The compressed serialization of the key.
    pub fn serialize(&self) -> [u8; 33] {
        self.0.serialize()
    }
}

impl From<PublicKey> for PeerId {
    fn from(pubkey: PublicKey) -> Self {
        Self(pubkey)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.serialize()))
    }
}

impl FromStr for PeerId {
    type Err = secp256k1::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PublicKey::from_str(s).map(Self)
    }
}
