//! Module to generate random values for testing.

use bitcoin::{
    hashes::{sha256d, Hash},
    key::rand::{rngs::OsRng, Rng},
    secp256k1::{schnorr::Signature, Keypair, PublicKey, SecretKey, SECP256K1},
    OutPoint, Txid,
};
use paychan_elkrem::RevocationSecret;
use paychan_primitives::PeerId;

/// Generates a random transaction ID.
pub fn generate_txid() -> Txid {
    let mut txid = [0u8; 32];
    OsRng.fill(&mut txid);

    Txid::from_byte_array(txid)
}

/// Generates a random outpoint.
pub fn generate_outpoint() -> OutPoint {
    let vout: u32 = OsRng.gen();

    OutPoint {
        txid: generate_txid(),
        vout,
    }
}

/// Generates a random signature.
///
/// The signature does not verify under any key.
pub fn generate_signature() -> Signature {
    let mut sig = [0u8; 64];
    OsRng.fill(&mut sig);

    Signature::from_slice(&sig).expect("should be able to generate arbitrary signature")
}

/// Generates a random keypair.
pub fn generate_keypair() -> Keypair {
    let sk = SecretKey::new(&mut OsRng);

    Keypair::from_secret_key(SECP256K1, &sk)
}

/// Generates a random public key.
pub fn generate_pubkey() -> PublicKey {
    generate_keypair().public_key()
}

/// Generates the peer identity belonging to a keypair.
pub fn peer_id_of(keypair: &Keypair) -> PeerId {
    PeerId::new(keypair.public_key())
}

/// Generates a random revocation secret that is also a valid secp256k1 scalar.
pub fn generate_secret() -> RevocationSecret {
    let sk = SecretKey::new(&mut OsRng);

    sha256d::Hash::from_byte_array(sk.secret_bytes())
}

/// Generates a random 32-byte seed.
pub fn generate_seed() -> [u8; 32] {
    let mut seed = [0u8; 32];
    OsRng.fill(&mut seed);

    seed
}
