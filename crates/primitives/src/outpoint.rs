//! Fixed-width wire encoding of funding outpoints.
//!
//! Every channel message starts with the outpoint of the funding output it refers to. The layout
//! is the raw txid bytes followed by the big-endian output index.

use bitcoin::{hashes::Hash, OutPoint, Txid};

use crate::constants::OUTPOINT_SIZE;

/// Serializes an [`OutPoint`] into its 36-byte wire form.
pub fn outpoint_to_bytes(outpoint: &OutPoint) -> [u8; OUTPOINT_SIZE] {
    let mut buf = [0u8; OUTPOINT_SIZE];
    buf[..32].copy_from_slice(outpoint.txid.as_byte_array());
    buf[32..].copy_from_slice(&outpoint.vout.to_be_bytes());
    buf
}

/// Deserializes an [`OutPoint`] from its 36-byte wire form.
pub fn outpoint_from_bytes(bytes: &[u8; OUTPOINT_SIZE]) -> OutPoint {
    let mut txid = [0u8; 32];
    txid.copy_from_slice(&bytes[..32]);

    let mut vout = [0u8; 4];
    vout.copy_from_slice(&bytes[32..]);

    OutPoint {
        txid: Txid::from_byte_array(txid),
        vout: u32::from_be_bytes(vout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vout_is_big_endian_after_txid() {
        let outpoint = OutPoint {
            txid: Txid::from_byte_array([7u8; 32]),
            vout: 0x0102_0304,
        };

        let bytes = outpoint_to_bytes(&outpoint);
        assert_eq!(&bytes[..32], &[7u8; 32]);
        assert_eq!(&bytes[32..], &[1, 2, 3, 4]);
        assert_eq!(outpoint_from_bytes(&bytes), outpoint);
    }
}
