//! The events that drive the channel state machine.

use std::fmt;

use bitcoin::Amount;
use paychan_wire::{ChannelMessage, DeltaSig, Rev, SigRev};

/// The events that affect a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The local user asked to push `amount` to the counterparty.
    PushRequested {
        /// The amount to push.
        amount: Amount,
    },
    /// The counterparty proposed a push.
    DeltaSigReceived(DeltaSig),
    /// The counterparty accepted our proposal and revoked its previous state.
    SigRevReceived(SigRev),
    /// The counterparty revoked its previous state, completing a round it proposed.
    RevReceived(Rev),
}

impl fmt::Display for ChannelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelEvent::PushRequested { amount } => write!(f, "PushRequested({amount})"),
            ChannelEvent::DeltaSigReceived(msg) => write!(f, "DeltaSigReceived({})", msg.delta),
            ChannelEvent::SigRevReceived(_) => write!(f, "SigRevReceived"),
            ChannelEvent::RevReceived(_) => write!(f, "RevReceived"),
        }
    }
}

impl From<DeltaSig> for ChannelEvent {
    fn from(msg: DeltaSig) -> Self {
        ChannelEvent::DeltaSigReceived(msg)
    }
}

impl From<SigRev> for ChannelEvent {
    fn from(msg: SigRev) -> Self {
        ChannelEvent::SigRevReceived(msg)
    }
}

impl From<Rev> for ChannelEvent {
    fn from(msg: Rev) -> Self {
        ChannelEvent::RevReceived(msg)
    }
}

impl From<ChannelMessage> for ChannelEvent {
    fn from(msg: ChannelMessage) -> Self {
        match msg {
            ChannelMessage::DeltaSig(msg) => msg.into(),
            ChannelMessage::SigRev(msg) => msg.into(),
            ChannelMessage::Rev(msg) => msg.into(),
        }
    }
}
