use paychan_wire::{MessageType, Rev, SigRev};
use tracing::{error, info};

use crate::{
    config::ChannelCfg,
    duties::ChannelDuty,
    errors::{ChannelError, ChannelResult},
    machine::{Channel, ChannelOutput},
    signals::ChannelSignal,
    state::UpdatePhase,
};

impl Channel {
    /// Completes a push proposed by this node.
    ///
    /// The counter-signature has to cover this node's commitment for the next state, and the
    /// revealed secret has to match the point the counterparty committed to for the current
    /// state. A bad signature leaves the channel waiting. A bad secret freezes the channel.
    pub(crate) fn process_sig_rev(
        &mut self,
        cfg: &ChannelCfg,
        msg: SigRev,
    ) -> ChannelResult<ChannelOutput> {
        self.ensure_operational()?;
        let UpdatePhase::ProposerWaiting { amount } = self.state.phase else {
            return Err(ChannelError::ProtocolViolation {
                message: MessageType::SigRev,
                phase: self.state.phase,
            });
        };

        let revoked_idx = self.state.state_idx;
        let next_idx = revoked_idx + 1;
        let my_after = self.state.my_amount - amount;

        let commitment = self.own_commitment(next_idx, my_after)?;
        if !commitment.verify(&msg.signature, &self.context.peer_id) {
            return Err(ChannelError::SignatureInvalid {
                state_idx: next_idx,
            });
        }

        let mut next = self.clone();
        let their_point = next.state.their_point;
        if let Err(e) = next
            .state
            .chain
            .verify_and_advance(msg.revealed_secret, &their_point, revoked_idx)
        {
            error!(
                outpoint = %self.outpoint(),
                %e,
                "counterparty revealed an invalid secret, freezing channel"
            );
            self.state.frozen = true;
            return Err(ChannelError::ChainVerificationFailed(e));
        }

        next.state.state_idx = next_idx;
        next.state.my_amount = my_after;
        next.state.their_sig = Some(msg.signature);
        next.state.their_point = next.state.their_next_point;
        next.state.their_next_point = msg.next_point;
        next.state.phase = UpdatePhase::Idle;
        let reply = next.build_rev()?;
        *self = next;

        info!(outpoint = %self.outpoint(), %amount, state_idx = next_idx, "push cleared");

        Ok(ChannelOutput::with_duties_and_signals(
            vec![ChannelDuty::SendMessage(reply.into())],
            vec![ChannelSignal::PushCleared {
                outpoint: self.outpoint(),
                amount,
                state_idx: next_idx,
            }],
        ))
    }

    /// Builds the revocation of the state before the current one.
    pub(crate) fn build_rev(&self) -> ChannelResult<Rev> {
        let state_idx = self.state.state_idx;
        let revoked_idx = state_idx.checked_sub(1).ok_or(ChannelError::NothingToSend(state_idx))?;

        Ok(Rev {
            outpoint: self.outpoint(),
            revealed_secret: self.state.chain.derive_secret(revoked_idx)?,
            next_point: self.state.chain.point_for_index(state_idx + 1)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::Amount;
    use paychan_test_utils::bitcoin::{generate_secret, generate_signature};
    use paychan_wire::{ChannelMessage, MessageType, SigRev};

    use crate::{
        errors::ChannelError,
        signals::ChannelSignal,
        state::UpdatePhase,
        testing::{channel_pair, sent},
    };

    fn counter_signature(msg: ChannelMessage) -> SigRev {
        match msg {
            ChannelMessage::SigRev(msg) => msg,
            other => panic!("expected a counter-signature, got {other:?}"),
        }
    }

    #[test]
    fn counter_signature_finalizes_push() {
        let (mut a, mut b) = channel_pair(1_000_000, 500_000, 10_000);
        let sig_rev = sent(b.deliver(sent(a.push(50_000).unwrap())).unwrap());

        let output = a.deliver(sig_rev).unwrap();

        assert_eq!(
            output.signals,
            vec![ChannelSignal::PushCleared {
                outpoint: a.channel.outpoint(),
                amount: Amount::from_sat(50_000),
                state_idx: 1,
            }]
        );
        assert_eq!(sent(output).msg_type(), MessageType::Rev);
        assert_eq!(a.my_sats(), 450_000);
        assert_eq!(a.channel.state.state_idx, 1);
        assert_eq!(a.channel.state.phase, UpdatePhase::Idle);
        assert_eq!(a.channel.state.chain.received_upto(), Some(0));
    }

    #[test]
    fn bad_secret_freezes_channel() {
        let (mut a, mut b) = channel_pair(1_000_000, 500_000, 10_000);
        let mut msg = counter_signature(sent(b.deliver(sent(a.push(50_000).unwrap())).unwrap()));
        msg.revealed_secret = generate_secret();
        let before = a.channel.clone();

        let err = a.process(msg).unwrap_err();

        assert!(matches!(err, ChannelError::ChainVerificationFailed(_)));
        assert!(err.is_fatal());
        assert!(a.channel.state.frozen);
        // nothing but the flag changed
        let mut expected = before;
        expected.state.frozen = true;
        assert_eq!(a.channel, expected);

        // a frozen channel sends nothing on its own
        assert!(matches!(
            a.channel.next_message(&a.cfg),
            Err(ChannelError::InvalidState(_))
        ));
    }

    #[test]
    fn bad_counter_signature_is_recoverable() {
        let (mut a, mut b) = channel_pair(1_000_000, 500_000, 10_000);
        let good = counter_signature(sent(b.deliver(sent(a.push(50_000).unwrap())).unwrap()));
        let mut forged = good;
        forged.signature = generate_signature();

        let err = a.process(forged).unwrap_err();
        assert_eq!(err, ChannelError::SignatureInvalid { state_idx: 1 });
        assert!(!err.is_fatal());
        assert!(!a.channel.state.frozen);

        // the genuine answer still completes the round
        a.process(good).unwrap();
        assert_eq!(a.my_sats(), 450_000);
    }

    #[test]
    fn unsolicited_counter_signature_is_a_protocol_violation() {
        let (mut a, mut b) = channel_pair(1_000_000, 500_000, 10_000);
        let msg = sent(b.deliver(sent(a.push(50_000).unwrap())).unwrap());
        a.deliver(msg).unwrap();

        assert!(matches!(
            a.deliver(msg),
            Err(ChannelError::ProtocolViolation {
                message: MessageType::SigRev,
                phase: UpdatePhase::Idle,
            })
        ));
    }
}
