//! What a commitment signature covers, and who produces it.
//!
//! A commitment is one party's view of a channel state: the state index, how much each side
//! holds, and the holder's revocation point for that index. Once the holder reveals the secret
//! behind the point, the commitment is revoked. Each party signs the counterparty's commitment
//! and keeps the counterparty's signature over its own.

use std::fmt;

use bitcoin::{
    hashes::{sha256, Hash, HashEngine},
    key::Keypair,
    Amount, OutPoint,
};
use paychan_primitives::{outpoint::outpoint_to_bytes, PeerId, StateIdx};
use secp256k1::{schnorr, Message, PublicKey, SecretKey, SECP256K1};

/// Domain separation tag for commitment digests.
const COMMITMENT_TAG: &[u8] = b"paychan/commitment";

/// The data that a commitment signature covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commitment {
    /// The funding outpoint of the channel.
    pub outpoint: OutPoint,
    /// The state the commitment is for.
    pub state_idx: StateIdx,
    /// The balance of the party holding the commitment.
    pub holder_amount: Amount,
    /// The balance of the other party.
    pub counterparty_amount: Amount,
    /// The holder's revocation point for `state_idx`.
    pub revocation_point: PublicKey,
}

impl Commitment {
    /// The digest that gets signed.
    pub fn digest(&self) -> [u8; 32] {
        let mut engine = sha256::Hash::engine();
        engine.input(COMMITMENT_TAG);
        engine.input(&outpoint_to_bytes(&self.outpoint));
        engine.input(&self.state_idx.to_be_bytes());
        engine.input(&self.holder_amount.to_sat().to_be_bytes());
        engine.input(&self.counterparty_amount.to_sat().to_be_bytes());
        engine.input(&self.revocation_point.serialize());

        sha256::Hash::from_engine(engine).to_byte_array()
    }

    /// Checks a signature over this commitment by `signer`.
    pub fn verify(&self, signature: &schnorr::Signature, signer: &PeerId) -> bool {
        SECP256K1
            .verify_schnorr(
                signature,
                &Message::from_digest(self.digest()),
                &signer.x_only_public_key(),
            )
            .is_ok()
    }
}

/// Signs commitments on behalf of this node.
pub trait CommitmentSigner: fmt::Debug + Send + Sync {
    /// Signs the commitment with the node identity key.
    fn sign(&self, commitment: &Commitment) -> schnorr::Signature;

    /// The identity the signatures verify under.
    fn identity(&self) -> PeerId;
}

/// A [`CommitmentSigner`] that holds the identity key in memory.
#[derive(Debug)]
pub struct LocalSigner {
    kp: Keypair,
}

impl LocalSigner {
    /// Creates a new [`LocalSigner`] with the given secret key.
    pub fn new(sk: SecretKey) -> Self {
        let kp = Keypair::from_secret_key(SECP256K1, &sk);
        Self { kp }
    }
}

impl From<Keypair> for LocalSigner {
    fn from(kp: Keypair) -> Self {
        Self { kp }
    }
}

impl CommitmentSigner for LocalSigner {
    fn sign(&self, commitment: &Commitment) -> schnorr::Signature {
        self.kp.sign_schnorr(Message::from_digest(commitment.digest()))
    }

    fn identity(&self) -> PeerId {
        PeerId::new(self.kp.public_key())
    }
}
