//! The peers a node knows about.

use std::collections::BTreeMap;

use paychan_primitives::{PeerId, PeerIdx};
use parking_lot::RwLock;

/// What the node knows about a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerInfo {
    /// The peer's identity.
    pub peer_id: PeerId,
    /// Where the peer was reached, if known.
    pub host: Option<String>,
}

/// Maps the transport's peer indices to peer identities.
#[derive(Debug, Default)]
pub struct PeerBook {
    peers: RwLock<BTreeMap<PeerIdx, PeerInfo>>,
}

impl PeerBook {
    /// Creates an empty peer book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a connected peer and returns its index.
    ///
    /// A peer that is already known keeps its index. Indices of new peers start at one.
    pub fn add(&self, peer_id: PeerId, host: Option<String>) -> PeerIdx {
        let mut peers = self.peers.write();
        if let Some((idx, info)) = peers.iter_mut().find(|(_, info)| info.peer_id == peer_id) {
            if host.is_some() {
                info.host = host;
            }
            return *idx;
        }

        let idx = peers.keys().next_back().map_or(1, |last| last + 1);
        peers.insert(idx, PeerInfo { peer_id, host });

        idx
    }

    /// The identity of the peer at `idx`.
    pub fn peer_id(&self, idx: PeerIdx) -> Option<PeerId> {
        self.peers.read().get(&idx).map(|info| info.peer_id)
    }

    /// The index of the peer with identity `peer_id`.
    pub fn idx_of(&self, peer_id: &PeerId) -> Option<PeerIdx> {
        self.peers
            .read()
            .iter()
            .find(|(_, info)| info.peer_id == *peer_id)
            .map(|(idx, _)| *idx)
    }

    /// Every known peer with its index.
    pub fn connected(&self) -> Vec<(PeerIdx, PeerInfo)> {
        self.peers
            .read()
            .iter()
            .map(|(idx, info)| (*idx, info.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use paychan_test_utils::bitcoin::generate_pubkey;

    use super::*;

    #[test]
    fn known_peers_keep_their_index() {
        let book = PeerBook::new();
        let alice = PeerId::new(generate_pubkey());
        let bob = PeerId::new(generate_pubkey());

        assert_eq!(book.add(alice, None), 1);
        assert_eq!(book.add(bob, Some("127.0.0.1:2448".to_string())), 2);
        assert_eq!(book.add(alice, Some("10.0.0.1:2448".to_string())), 1);

        assert_eq!(book.peer_id(2), Some(bob));
        assert_eq!(book.idx_of(&alice), Some(1));
        assert_eq!(book.connected()[0].1.host.as_deref(), Some("10.0.0.1:2448"));
    }
}
