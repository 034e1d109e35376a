//! The channel state machine.
//!
//! Responsible for moving a channel from one balance split to the next by reacting to events and
//! producing the messages that need to be sent.

use std::sync::Arc;

use bitcoin::{Amount, OutPoint, SignedAmount};
use paychan_elkrem::{RevocationChain, RevocationSecret};
use paychan_primitives::{PeerId, StateIdx};
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};

use crate::{
    config::ChannelCfg,
    context::ChannelCtx,
    duties::ChannelDuty,
    errors::{ChannelError, ChannelResult},
    events::ChannelEvent,
    signals::ChannelSignal,
    signer::Commitment,
    state::{ChannelState, UpdatePhase},
    state_machine::{SMOutput, StateMachine},
};

/// A payment channel: its immutable context and its current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Context associated with this channel.
    pub context: ChannelCtx,
    /// The current state of the channel.
    pub state: ChannelState,
}

impl StateMachine for Channel {
    type Config = Arc<ChannelCfg>;
    type Duty = ChannelDuty;
    type OutgoingSignal = ChannelSignal;
    type Event = ChannelEvent;
    type Error = ChannelError;

    fn process_event(
        &mut self,
        cfg: Self::Config,
        event: Self::Event,
    ) -> Result<SMOutput<Self::Duty, Self::OutgoingSignal>, Self::Error> {
        match event {
            ChannelEvent::PushRequested { amount } => self.process_push_requested(&cfg, amount),
            ChannelEvent::DeltaSigReceived(msg) => self.process_delta_sig(&cfg, msg),
            ChannelEvent::SigRevReceived(msg) => self.process_sig_rev(&cfg, msg),
            ChannelEvent::RevReceived(msg) => self.process_rev(msg),
        }
    }
}

/// The output of the channel state machine after processing an event.
pub type ChannelOutput = SMOutput<ChannelDuty, ChannelSignal>;

/// A read-only view of a channel for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSummary {
    /// The funding outpoint.
    pub outpoint: OutPoint,
    /// The counterparty.
    pub peer_id: PeerId,
    /// The total value locked.
    pub capacity: Amount,
    /// This node's balance.
    pub my_amount: Amount,
    /// The counterparty's balance.
    pub their_amount: Amount,
    /// The pending adjustment of this node's balance.
    pub delta: SignedAmount,
    /// The latest committed state.
    pub state_idx: StateIdx,
    /// Whether the channel is closed.
    pub closed: bool,
    /// Whether the channel is frozen.
    pub frozen: bool,
}

impl Channel {
    /// Creates a freshly opened channel at state zero.
    ///
    /// `their_point` and `their_next_point` are the counterparty's revocation points for states
    /// zero and one.
    pub fn new(
        context: ChannelCtx,
        my_amount: Amount,
        chain: RevocationChain,
        their_point: PublicKey,
        their_next_point: PublicKey,
    ) -> ChannelResult<Self> {
        if my_amount > context.capacity {
            return Err(ChannelError::InvalidAmount(format!(
                "balance {my_amount} exceeds capacity {}",
                context.capacity
            )));
        }

        Ok(Self {
            context,
            state: ChannelState::new(my_amount, chain, their_point, their_next_point),
        })
    }

    /// Returns a reference to the channel context.
    pub const fn context(&self) -> &ChannelCtx {
        &self.context
    }

    /// Returns a reference to the current state of the channel.
    pub const fn state(&self) -> &ChannelState {
        &self.state
    }

    /// Returns a mutable reference to the current state of the channel.
    pub const fn state_mut(&mut self) -> &mut ChannelState {
        &mut self.state
    }

    /// Returns the funding outpoint.
    pub const fn outpoint(&self) -> OutPoint {
        self.context.outpoint
    }

    /// The counterparty's balance.
    pub fn their_amount(&self) -> Amount {
        self.context.capacity - self.state.my_amount
    }

    /// Checks that `peer_id` is the counterparty of this channel.
    pub fn check_peer(&self, peer_id: &PeerId) -> ChannelResult<()> {
        if *peer_id == self.context.peer_id {
            Ok(())
        } else {
            Err(ChannelError::PeerMismatch {
                expected: self.context.peer_id,
                actual: *peer_id,
            })
        }
    }

    /// Returns a secret that the counterparty revealed earlier, i.e. the key to punish the
    /// counterparty for broadcasting the revoked state `index`.
    pub fn revealed_secret(&self, index: StateIdx) -> ChannelResult<RevocationSecret> {
        Ok(self.state.chain.revealed_secret(index)?)
    }

    /// A summary of the channel for display.
    pub fn summary(&self) -> ChannelSummary {
        ChannelSummary {
            outpoint: self.context.outpoint,
            peer_id: self.context.peer_id,
            capacity: self.context.capacity,
            my_amount: self.state.my_amount,
            their_amount: self.their_amount(),
            delta: self.state.delta(),
            state_idx: self.state.state_idx,
            closed: self.state.closed,
            frozen: self.state.frozen,
        }
    }

    /// Fails unless the channel can take part in rounds.
    pub(crate) fn ensure_operational(&self) -> ChannelResult<()> {
        if self.state.is_operational() {
            return Ok(());
        }

        let reason = if self.state.closed { "closed" } else { "frozen" };
        Err(ChannelError::InvalidState(format!(
            "channel {} is {reason}",
            self.outpoint()
        )))
    }

    /// This node's commitment at `state_idx` with the given balances.
    pub(crate) fn own_commitment(
        &self,
        state_idx: StateIdx,
        my_amount: Amount,
    ) -> ChannelResult<Commitment> {
        Ok(Commitment {
            outpoint: self.context.outpoint,
            state_idx,
            holder_amount: my_amount,
            counterparty_amount: self.context.capacity - my_amount,
            revocation_point: self.state.chain.point_for_index(state_idx)?,
        })
    }

    /// The counterparty's commitment at `state_idx` with the given balance for this node.
    ///
    /// `their_point` is the counterparty's revocation point for `state_idx`.
    pub(crate) fn their_commitment(
        &self,
        state_idx: StateIdx,
        my_amount: Amount,
        their_point: PublicKey,
    ) -> Commitment {
        Commitment {
            outpoint: self.context.outpoint,
            state_idx,
            holder_amount: self.context.capacity - my_amount,
            counterparty_amount: my_amount,
            revocation_point: their_point,
        }
    }
}
