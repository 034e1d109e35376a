//! The messages exchanged during a channel update round.

use std::fmt;

use bitcoin::{
    hashes::{sha256d, Hash},
    OutPoint,
};
use paychan_elkrem::RevocationSecret;
use paychan_primitives::{
    constants::{DELTA_SIZE, OUTPOINT_SIZE, POINT_SIZE, SECRET_SIZE, SIGNATURE_SIZE},
    outpoint::{outpoint_from_bytes, outpoint_to_bytes},
};
use secp256k1::{schnorr, PublicKey};

use crate::errors::{WireError, WireResult};

/// The type byte that the transport layer frames each update message with.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Balance-delta proposal.
    DeltaSig = 0x70,
    /// Counter-signature together with the revocation of the previous state.
    SigRev = 0x72,
    /// Final revocation that closes a round.
    Rev = 0x73,
}

impl MessageType {
    /// The exact payload length of this kind of message.
    pub const fn payload_len(self) -> usize {
        match self {
            MessageType::DeltaSig => OUTPOINT_SIZE + DELTA_SIZE + SIGNATURE_SIZE,
            MessageType::SigRev => OUTPOINT_SIZE + SIGNATURE_SIZE + SECRET_SIZE + POINT_SIZE,
            MessageType::Rev => OUTPOINT_SIZE + SECRET_SIZE + POINT_SIZE,
        }
    }
}

impl TryFrom<u8> for MessageType {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x70 => Ok(MessageType::DeltaSig),
            0x72 => Ok(MessageType::SigRev),
            0x73 => Ok(MessageType::Rev),
            other => Err(WireError::UnknownMessageType(other)),
        }
    }
}

impl From<MessageType> for u8 {
    fn from(value: MessageType) -> Self {
        value as u8
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageType::DeltaSig => "DeltaSig",
            MessageType::SigRev => "SigRev",
            MessageType::Rev => "Rev",
        };

        write!(f, "{name}")
    }
}

/// Proposes moving `delta` satoshis from the sender to the receiver.
///
/// The signature is the sender's signature over the receiver's commitment for the next state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaSig {
    /// The funding outpoint of the channel.
    pub outpoint: OutPoint,
    /// The amount being pushed. Receivers reject non-positive values.
    pub delta: i32,
    /// Signature over the receiver's next commitment.
    pub signature: schnorr::Signature,
}

/// Answers a [`DeltaSig`] by signing the proposer's next commitment and revoking the receiver's
/// current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigRev {
    /// The funding outpoint of the channel.
    pub outpoint: OutPoint,
    /// Signature over the proposer's next commitment.
    pub signature: schnorr::Signature,
    /// The sender's secret for the state being revoked.
    pub revealed_secret: RevocationSecret,
    /// The sender's revocation point for the state after the next one.
    pub next_point: PublicKey,
}

/// Revokes the proposer's previous state and completes a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rev {
    /// The funding outpoint of the channel.
    pub outpoint: OutPoint,
    /// The sender's secret for the state being revoked.
    pub revealed_secret: RevocationSecret,
    /// The sender's revocation point for the state after the next one.
    pub next_point: PublicKey,
}

impl DeltaSig {
    /// Serializes the message into its 104-byte payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(MessageType::DeltaSig.payload_len());
        buf.extend_from_slice(&outpoint_to_bytes(&self.outpoint));
        buf.extend_from_slice(&self.delta.to_be_bytes());
        buf.extend_from_slice(&self.signature.serialize());
        buf
    }

    /// Parses a 104-byte payload.
    pub fn decode(payload: &[u8]) -> WireResult<Self> {
        let mut reader = Reader::new(MessageType::DeltaSig, payload)?;

        Ok(Self {
            outpoint: reader.outpoint(),
            delta: i32::from_be_bytes(reader.array()),
            signature: reader.signature()?,
        })
    }
}

impl SigRev {
    /// Serializes the message into its 165-byte payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(MessageType::SigRev.payload_len());
        buf.extend_from_slice(&outpoint_to_bytes(&self.outpoint));
        buf.extend_from_slice(&self.signature.serialize());
        buf.extend_from_slice(self.revealed_secret.as_byte_array());
        buf.extend_from_slice(&self.next_point.serialize());
        buf
    }

    /// Parses a 165-byte payload.
    pub fn decode(payload: &[u8]) -> WireResult<Self> {
        let mut reader = Reader::new(MessageType::SigRev, payload)?;

        Ok(Self {
            outpoint: reader.outpoint(),
            signature: reader.signature()?,
            revealed_secret: reader.secret(),
            next_point: reader.point()?,
        })
    }
}

impl Rev {
    /// Serializes the message into its 101-byte payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(MessageType::Rev.payload_len());
        buf.extend_from_slice(&outpoint_to_bytes(&self.outpoint));
        buf.extend_from_slice(self.revealed_secret.as_byte_array());
        buf.extend_from_slice(&self.next_point.serialize());
        buf
    }

    /// Parses a 101-byte payload.
    pub fn decode(payload: &[u8]) -> WireResult<Self> {
        let mut reader = Reader::new(MessageType::Rev, payload)?;

        Ok(Self {
            outpoint: reader.outpoint(),
            revealed_secret: reader.secret(),
            next_point: reader.point()?,
        })
    }
}

/// Any of the three update messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMessage {
    /// See [`DeltaSig`].
    DeltaSig(DeltaSig),
    /// See [`SigRev`].
    SigRev(SigRev),
    /// See [`Rev`].
    Rev(Rev),
}

impl ChannelMessage {
    /// The type byte of the message.
    pub const fn msg_type(&self) -> MessageType {
        match self {
            ChannelMessage::DeltaSig(_) => MessageType::DeltaSig,
            ChannelMessage::SigRev(_) => MessageType::SigRev,
            ChannelMessage::Rev(_) => MessageType::Rev,
        }
    }

    /// The funding outpoint of the channel the message refers to.
    pub const fn outpoint(&self) -> OutPoint {
        match self {
            ChannelMessage::DeltaSig(msg) => msg.outpoint,
            ChannelMessage::SigRev(msg) => msg.outpoint,
            ChannelMessage::Rev(msg) => msg.outpoint,
        }
    }

    /// Serializes the payload of the message. The type byte is framed separately.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            ChannelMessage::DeltaSig(msg) => msg.encode(),
            ChannelMessage::SigRev(msg) => msg.encode(),
            ChannelMessage::Rev(msg) => msg.encode(),
        }
    }

    /// Parses a payload according to its type byte.
    pub fn decode(msg_type: u8, payload: &[u8]) -> WireResult<Self> {
        match MessageType::try_from(msg_type)? {
            MessageType::DeltaSig => DeltaSig::decode(payload).map(ChannelMessage::DeltaSig),
            MessageType::SigRev => SigRev::decode(payload).map(ChannelMessage::SigRev),
            MessageType::Rev => Rev::decode(payload).map(ChannelMessage::Rev),
        }
    }
}

impl From<DeltaSig> for ChannelMessage {
    fn from(msg: DeltaSig) -> Self {
        ChannelMessage::DeltaSig(msg)
    }
}

impl From<SigRev> for ChannelMessage {
    fn from(msg: SigRev) -> Self {
        ChannelMessage::SigRev(msg)
    }
}

impl From<Rev> for ChannelMessage {
    fn from(msg: Rev) -> Self {
        ChannelMessage::Rev(msg)
    }
}

/// Extracts consecutive fields from a payload whose length has already been validated.
struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(kind: MessageType, payload: &'a [u8]) -> WireResult<Self> {
        let expected = kind.payload_len();
        if payload.len() != expected {
            return Err(WireError::InvalidLength {
                kind,
                expected,
                actual: payload.len(),
            });
        }

        Ok(Self { buf: payload })
    }

    fn take(&mut self, len: usize) -> &'a [u8] {
        let (head, rest) = self.buf.split_at(len);
        self.buf = rest;
        head
    }

    fn array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N));
        out
    }

    fn outpoint(&mut self) -> OutPoint {
        outpoint_from_bytes(&self.array())
    }

    fn signature(&mut self) -> WireResult<schnorr::Signature> {
        schnorr::Signature::from_slice(self.take(SIGNATURE_SIZE))
            .map_err(WireError::InvalidSignature)
    }

    fn secret(&mut self) -> RevocationSecret {
        sha256d::Hash::from_byte_array(self.array())
    }

    fn point(&mut self) -> WireResult<PublicKey> {
        PublicKey::from_slice(self.take(POINT_SIZE)).map_err(WireError::InvalidPoint)
    }
}
