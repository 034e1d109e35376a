//! The duties that need to be performed in response to channel state transitions.

use std::fmt;

use paychan_wire::ChannelMessage;

/// The duties that need to be performed to drive a channel forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelDuty {
    /// Send the message to the counterparty.
    SendMessage(ChannelMessage),
}

impl fmt::Display for ChannelDuty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelDuty::SendMessage(msg) => {
                write!(f, "SendMessage({} for {})", msg.msg_type(), msg.outpoint())
            }
        }
    }
}
