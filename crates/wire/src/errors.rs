//! Errors returned while decoding channel messages.

use thiserror::Error;

use crate::messages::MessageType;

/// Errors that can occur while decoding a channel message.
///
/// Any of these means the payload was malformed. Such payloads are dropped without a reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// The message type byte is not one of the update messages.
    #[error("unknown message type 0x{0:02x}")]
    UnknownMessageType(u8),

    /// The payload does not have the exact length of its message kind.
    #[error("{kind} payload must be {expected} bytes, got {actual}")]
    InvalidLength {
        /// The kind of message being decoded.
        kind: MessageType,
        /// The required length.
        expected: usize,
        /// The length of the payload received.
        actual: usize,
    },

    /// The next revocation point is not a valid public key.
    #[error("invalid revocation point: {0}")]
    InvalidPoint(secp256k1::Error),

    /// The signature bytes are not a valid schnorr signature.
    #[error("invalid signature: {0}")]
    InvalidSignature(secp256k1::Error),
}

/// The result type for decoding.
pub type WireResult<T> = Result<T, WireError>;
