//! The pair of elkrem trees that a channel keeps for revocation.

use bitcoin::hashes::{sha256d, Hash};
use secp256k1::{PublicKey, SecretKey, SECP256K1};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{ElkremError, ElkremResult},
    receiver::ElkremReceiver,
    sender::ElkremSender,
};

/// A secret revealed to revoke a commitment.
pub type RevocationSecret = sha256d::Hash;

/// Computes the revocation point for a secret, i.e. the public key of the secret used as a
/// scalar.
pub fn point_from_secret(secret: &RevocationSecret) -> ElkremResult<PublicKey> {
    let sk = SecretKey::from_slice(secret.as_byte_array()).map_err(|_| ElkremError::InvalidScalar)?;

    Ok(PublicKey::from_secret_key(SECP256K1, &sk))
}

/// The revocation chains of one channel.
///
/// The send side is this node's own tree: it advances when this node reveals a secret. The
/// receive side collects the counterparty's secrets and advances only after each one has been
/// verified against the point the counterparty committed to earlier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationChain {
    send: ElkremSender,
    receive: ElkremReceiver,
}

impl RevocationChain {
    /// Creates a chain with the given sending tree and nothing received yet.
    pub const fn new(send: ElkremSender) -> Self {
        Self {
            send,
            receive: ElkremReceiver::new(),
        }
    }

    /// Derives this node's secret at `index`.
    pub fn derive_secret(&self, index: u64) -> ElkremResult<RevocationSecret> {
        self.send.at_index(index)
    }

    /// Derives this node's revocation point at `index`.
    ///
    /// The point can be handed to the counterparty long before the secret is revealed.
    pub fn point_for_index(&self, index: u64) -> ElkremResult<PublicKey> {
        point_from_secret(&self.derive_secret(index)?)
    }

    /// Verifies a secret revealed by the counterparty and appends it to the receive side.
    ///
    /// The secret must be for the next index the receive side expects, must match the point the
    /// counterparty committed to for that index, and must be consistent with every secret received
    /// before. Any failure is reported as [`ElkremError::ChainVerificationFailed`] and leaves the
    /// chain untouched.
    pub fn verify_and_advance(
        &mut self,
        claimed: RevocationSecret,
        committed_point: &PublicKey,
        index: u64,
    ) -> ElkremResult<()> {
        let expected = self.receive.next_index();
        if index != expected {
            return Err(ElkremError::ChainVerificationFailed {
                index,
                reason: format!("receive chain expects index {expected}"),
            });
        }

        let point = point_from_secret(&claimed).map_err(|e| ElkremError::ChainVerificationFailed {
            index,
            reason: e.to_string(),
        })?;
        if point != *committed_point {
            return Err(ElkremError::ChainVerificationFailed {
                index,
                reason: "revealed secret does not match the committed point".to_string(),
            });
        }

        self.receive
            .add_next(claimed)
            .map_err(|e| ElkremError::ChainVerificationFailed {
                index,
                reason: e.to_string(),
            })
    }

    /// Returns a secret the counterparty revealed earlier.
    pub fn revealed_secret(&self, index: u64) -> ElkremResult<RevocationSecret> {
        self.receive.at_index(index)
    }

    /// The highest index received from the counterparty, if any.
    pub fn received_upto(&self) -> Option<u64> {
        self.receive.upto()
    }

    /// The index of the next secret expected from the counterparty.
    pub fn next_expected_index(&self) -> u64 {
        self.receive.next_index()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn chain(tag: &[u8]) -> RevocationChain {
        RevocationChain::new(ElkremSender::from_seed(&[1u8; 32], tag))
    }

    #[test]
    fn verifies_counterparty_secrets_in_order() {
        let theirs = chain(b"theirs");
        let mut ours = chain(b"ours");

        for index in 0..20 {
            let point = theirs.point_for_index(index).unwrap();
            let secret = theirs.derive_secret(index).unwrap();
            ours.verify_and_advance(secret, &point, index).unwrap();
        }

        assert_eq!(ours.received_upto(), Some(19));
        assert_eq!(
            ours.revealed_secret(7).unwrap(),
            theirs.derive_secret(7).unwrap()
        );
    }

    #[test]
    fn mismatched_point_is_rejected_without_advancing() {
        let theirs = chain(b"theirs");
        let mut ours = chain(b"ours");

        let wrong_point = theirs.point_for_index(1).unwrap();
        let secret = theirs.derive_secret(0).unwrap();
        let before = ours.clone();

        let err = ours.verify_and_advance(secret, &wrong_point, 0).unwrap_err();
        assert!(matches!(
            err,
            ElkremError::ChainVerificationFailed { index: 0, .. }
        ));
        assert_eq!(ours, before);
    }

    #[test]
    fn out_of_order_index_is_rejected() {
        let theirs = chain(b"theirs");
        let mut ours = chain(b"ours");

        let point = theirs.point_for_index(1).unwrap();
        let secret = theirs.derive_secret(1).unwrap();

        assert!(ours.verify_and_advance(secret, &point, 1).is_err());
        assert_eq!(ours.next_expected_index(), 0);
    }

    #[test]
    fn matching_point_from_another_tree_breaks_consistency() {
        let theirs = chain(b"theirs");
        let impostor = chain(b"impostor");
        let mut ours = chain(b"ours");

        for index in 0..2 {
            ours.verify_and_advance(
                theirs.derive_secret(index).unwrap(),
                &theirs.point_for_index(index).unwrap(),
                index,
            )
            .unwrap();
        }

        // the impostor commits to its own point, but its secret is not the parent of 0 and 1
        let secret = impostor.derive_secret(2).unwrap();
        let point = impostor.point_for_index(2).unwrap();
        assert!(ours.verify_and_advance(secret, &point, 2).is_err());
    }

    #[test]
    fn chain_survives_serialization() {
        let theirs = chain(b"theirs");
        let mut ours = chain(b"ours");
        ours.verify_and_advance(
            theirs.derive_secret(0).unwrap(),
            &theirs.point_for_index(0).unwrap(),
            0,
        )
        .unwrap();

        let bytes = bincode::serialize(&ours).unwrap();
        let restored: RevocationChain = bincode::deserialize(&bytes).unwrap();

        assert_eq!(restored, ours);
        assert_eq!(
            restored.point_for_index(5).unwrap(),
            ours.point_for_index(5).unwrap()
        );
    }

    proptest! {
        #[test]
        fn points_commit_to_their_secrets(index in 0u64..1_000_000) {
            let ours = chain(b"ours");
            let secret = ours.derive_secret(index).unwrap();
            prop_assert_eq!(
                point_from_secret(&secret).unwrap(),
                ours.point_for_index(index).unwrap()
            );
        }
    }
}
