//! The interface to the transport layer.
//!
//! The transport frames messages as `(peer index, type byte, payload)` triples in both directions.

use paychan_primitives::PeerIdx;
use paychan_wire::ChannelMessage;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::trace;

use crate::errors::{NodeError, NodeResult};

/// A message received from a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// The index of the peer that sent the message.
    pub peer_idx: PeerIdx,
    /// The type byte the message was framed with.
    pub msg_type: u8,
    /// The undecoded payload.
    pub payload: Vec<u8>,
}

/// A message to be sent to a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// The index of the peer to send to.
    pub peer_idx: PeerIdx,
    /// The type byte to frame the message with.
    pub msg_type: u8,
    /// The encoded payload.
    pub payload: Vec<u8>,
}

impl OutboundMessage {
    /// Frames a channel message for `peer_idx`.
    pub fn new(peer_idx: PeerIdx, msg: &ChannelMessage) -> Self {
        Self {
            peer_idx,
            msg_type: msg.msg_type().into(),
            payload: msg.encode(),
        }
    }
}

/// The node's side of the outbound queue. Sending never blocks.
#[derive(Debug, Clone)]
pub struct Outbox {
    sender: UnboundedSender<OutboundMessage>,
}

impl Outbox {
    /// Creates an outbox and the receiver the transport drains.
    pub fn new() -> (Self, UnboundedReceiver<OutboundMessage>) {
        let (sender, receiver) = unbounded_channel();

        (Self { sender }, receiver)
    }

    /// Queues a message.
    pub fn send(&self, msg: OutboundMessage) -> NodeResult<()> {
        trace!(
            peer_idx = msg.peer_idx,
            msg_type = msg.msg_type,
            len = msg.payload.len(),
            "queueing message"
        );

        self.sender.send(msg).map_err(|_| NodeError::OutboxClosed)
    }
}
