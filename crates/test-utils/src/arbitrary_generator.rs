//! Proptest strategies for types that come from external crates.

use bitcoin::{
    hashes::{sha256d, Hash},
    secp256k1::{schnorr::Signature, PublicKey, SecretKey, SECP256K1},
    OutPoint, Txid,
};
use paychan_elkrem::RevocationSecret;
use proptest::prelude::*;

/// Generates an arbitrary Txid.
pub fn arb_txid() -> impl Strategy<Value = Txid> {
    any::<[u8; 32]>().prop_map(Txid::from_byte_array)
}

/// Generates an arbitrary outpoint.
pub fn arb_outpoint() -> impl Strategy<Value = OutPoint> {
    (arb_txid(), any::<u32>()).prop_map(|(txid, vout)| OutPoint { txid, vout })
}

/// Generates an arbitrary signature. It does not verify under any key.
pub fn arb_signature() -> impl Strategy<Value = Signature> {
    prop::collection::vec(any::<u8>(), 64)
        .prop_map(|bytes| Signature::from_slice(&bytes).expect("64 bytes is a valid length"))
}

/// Generates an arbitrary secret key.
///
/// Bytes in `1..=200` keep the scalar non-zero and below the curve order.
pub fn arb_secret_key() -> impl Strategy<Value = SecretKey> {
    prop::array::uniform32(1u8..=200)
        .prop_map(|bytes| SecretKey::from_slice(&bytes).expect("scalar is in range"))
}

/// Generates an arbitrary public key.
pub fn arb_pubkey() -> impl Strategy<Value = PublicKey> {
    arb_secret_key().prop_map(|sk| sk.public_key(SECP256K1))
}

/// Generates an arbitrary revocation secret.
pub fn arb_secret() -> impl Strategy<Value = RevocationSecret> {
    any::<[u8; 32]>().prop_map(sha256d::Hash::from_byte_array)
}
