use bitcoin::Amount;
use paychan_wire::{DeltaSig, MessageType, SigRev};
use tracing::debug;

use crate::{
    config::ChannelCfg,
    duties::ChannelDuty,
    errors::{ChannelError, ChannelResult, Side},
    machine::{Channel, ChannelOutput},
    state::UpdatePhase,
};

impl Channel {
    /// Accepts a push proposed by the counterparty.
    ///
    /// The proposal is checked against the reserve and its signature against this node's
    /// commitment for the next state before anything changes. On success the channel moves to the
    /// next state right away and answers with a counter-signature and the revocation of the
    /// previous state.
    pub(crate) fn process_delta_sig(
        &mut self,
        cfg: &ChannelCfg,
        msg: DeltaSig,
    ) -> ChannelResult<ChannelOutput> {
        self.ensure_operational()?;
        if !self.state.is_idle() {
            return Err(ChannelError::ProtocolViolation {
                message: MessageType::DeltaSig,
                phase: self.state.phase,
            });
        }

        if msg.delta <= 0 {
            return Err(ChannelError::InvalidAmount(format!(
                "proposed delta {} is not positive",
                msg.delta
            )));
        }
        let amount = Amount::from_sat(msg.delta as u64);

        let min_bal = cfg.min_bal();
        let their_amount = self.their_amount();
        if amount + min_bal > their_amount {
            return Err(ChannelError::InsufficientBalance {
                side: Side::Remote,
                balance: their_amount,
                required: amount + min_bal,
            });
        }
        let my_after = self.state.my_amount + amount;
        if my_after < min_bal {
            return Err(ChannelError::InsufficientBalance {
                side: Side::Local,
                balance: my_after,
                required: min_bal,
            });
        }

        let next_idx = self.state.state_idx + 1;
        let commitment = self.own_commitment(next_idx, my_after)?;
        if !commitment.verify(&msg.signature, &self.context.peer_id) {
            return Err(ChannelError::SignatureInvalid {
                state_idx: next_idx,
            });
        }

        let mut next = self.clone();
        next.state.state_idx = next_idx;
        next.state.my_amount = my_after;
        next.state.their_sig = Some(msg.signature);
        next.state.phase = UpdatePhase::ReceiverCommitted { amount };
        let reply = next.build_sig_rev(cfg)?;
        *self = next;

        debug!(outpoint = %self.outpoint(), %amount, state_idx = next_idx, "accepted push");

        Ok(ChannelOutput::with_duties(vec![ChannelDuty::SendMessage(
            reply.into(),
        )]))
    }

    /// Builds the answer to an accepted proposal: a signature over the counterparty's commitment
    /// for the current state and the revocation of the previous one.
    pub(crate) fn build_sig_rev(&self, cfg: &ChannelCfg) -> ChannelResult<SigRev> {
        let state_idx = self.state.state_idx;
        let revoked_idx = state_idx.checked_sub(1).ok_or(ChannelError::NothingToSend(state_idx))?;

        let commitment =
            self.their_commitment(state_idx, self.state.my_amount, self.state.their_next_point);

        Ok(SigRev {
            outpoint: self.outpoint(),
            signature: cfg.signer().sign(&commitment),
            revealed_secret: self.state.chain.derive_secret(revoked_idx)?,
            next_point: self.state.chain.point_for_index(state_idx + 1)?,
        })
    }
}
