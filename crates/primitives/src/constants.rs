//! Protocol constants shared across the node.

use bitcoin::Amount;

/// Minimum balance that each party has to keep in a channel, unless configured otherwise.
pub const DEFAULT_MIN_BAL: Amount = Amount::from_sat(10_000);

/// Size of a serialized funding outpoint: txid (32) followed by the output index (4).
pub const OUTPOINT_SIZE: usize = 36;

/// Size of a BIP-340 Schnorr signature.
pub const SIGNATURE_SIZE: usize = 64;

/// Size of a revealed revocation secret.
pub const SECRET_SIZE: usize = 32;

/// Size of a compressed revocation point.
pub const POINT_SIZE: usize = 33;

/// Size of the signed delta carried by a balance-delta proposal.
pub const DELTA_SIZE: usize = 4;
