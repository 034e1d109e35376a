use paychan_wire::{MessageType, Rev};
use tracing::{debug, error, info, warn};

use crate::{
    errors::{ChannelError, ChannelResult},
    machine::{Channel, ChannelOutput},
    signals::ChannelSignal,
    state::UpdatePhase,
};

impl Channel {
    /// Completes a push proposed by the counterparty once it revokes its previous state.
    ///
    /// A revocation received while idle repeats one that was already processed and is ignored,
    /// even once the channel is closed or frozen.
    pub(crate) fn process_rev(&mut self, msg: Rev) -> ChannelResult<ChannelOutput> {
        let amount = match self.state.phase {
            UpdatePhase::ReceiverCommitted { amount } => amount,
            UpdatePhase::Idle => {
                self.log_repeated_rev(&msg);
                return Ok(ChannelOutput::new());
            }
            UpdatePhase::ProposerWaiting { .. } => {
                return Err(ChannelError::ProtocolViolation {
                    message: MessageType::Rev,
                    phase: self.state.phase,
                });
            }
        };
        self.ensure_operational()?;

        // in ReceiverCommitted the state index has already moved past the revoked state
        let revoked_idx = self.state.state_idx - 1;

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

        next.state.their_point = next.state.their_next_point;
        next.state.their_next_point = msg.next_point;
        next.state.phase = UpdatePhase::Idle;
        *self = next;

        info!(
            outpoint = %self.outpoint(),
            %amount,
            state_idx = self.state.state_idx,
            "push received"
        );

        Ok(ChannelOutput::with_duties_and_signals(
            Vec::new(),
            vec![ChannelSignal::RevocationReceived {
                outpoint: self.outpoint(),
                amount,
                revoked_idx,
            }],
        ))
    }

    fn log_repeated_rev(&self, msg: &Rev) {
        let matches_last = self
            .state
            .state_idx
            .checked_sub(1)
            .and_then(|idx| self.state.chain.revealed_secret(idx).ok())
            .is_some_and(|secret| secret == msg.revealed_secret);

        if matches_last {
            debug!(outpoint = %self.outpoint(), "ignoring duplicate revocation");
        } else {
            warn!(outpoint = %self.outpoint(), "ignoring revocation received while idle");
        }
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::Amount;
    use paychan_test_utils::bitcoin::generate_secret;
    use paychan_wire::{ChannelMessage, MessageType, Rev};

    use crate::{
        errors::ChannelError,
        signals::ChannelSignal,
        state::UpdatePhase,
        testing::{channel_pair, sent},
    };

    fn revocation(msg: ChannelMessage) -> Rev {
        match msg {
            ChannelMessage::Rev(msg) => msg,
            other => panic!("expected a revocation, got {other:?}"),
        }
    }

    #[test]
    fn revocation_completes_received_push() {
        let (mut a, mut b) = channel_pair(1_000_000, 500_000, 10_000);
        let sig_rev = sent(b.deliver(sent(a.push(50_000).unwrap())).unwrap());
        let rev = sent(a.deliver(sig_rev).unwrap());

        let output = b.deliver(rev).unwrap();

        assert!(output.duties.is_empty());
        assert_eq!(
            output.signals,
            vec![ChannelSignal::RevocationReceived {
                outpoint: b.channel.outpoint(),
                amount: Amount::from_sat(50_000),
                revoked_idx: 0,
            }]
        );
        assert_eq!(b.channel.state.phase, UpdatePhase::Idle);
        assert_eq!(b.channel.state.chain.received_upto(), Some(0));
    }

    #[test]
    fn duplicate_revocation_is_a_no_op() {
        let (mut a, mut b) = channel_pair(1_000_000, 500_000, 10_000);
        let sig_rev = sent(b.deliver(sent(a.push(50_000).unwrap())).unwrap());
        let rev = sent(a.deliver(sig_rev).unwrap());
        b.deliver(rev).unwrap();
        let before = b.channel.clone();

        let output = b.deliver(rev).unwrap();

        assert!(output.is_empty());
        assert_eq!(b.channel, before);
    }

    #[test]
    fn duplicate_revocation_on_closed_channel_is_ignored() {
        let (mut a, mut b) = channel_pair(1_000_000, 500_000, 10_000);
        let sig_rev = sent(b.deliver(sent(a.push(50_000).unwrap())).unwrap());
        let rev = sent(a.deliver(sig_rev).unwrap());
        b.deliver(rev).unwrap();
        b.channel.state.closed = true;
        let before = b.channel.clone();

        let output = b.deliver(rev).unwrap();

        assert!(output.is_empty());
        assert_eq!(b.channel, before);
        assert!(matches!(
            b.push(1_000),
            Err(ChannelError::InvalidState(_))
        ));
    }

    #[test]
    fn bad_secret_freezes_channel() {
        let (mut a, mut b) = channel_pair(1_000_000, 500_000, 10_000);
        let sig_rev = sent(b.deliver(sent(a.push(50_000).unwrap())).unwrap());
        let mut rev = revocation(sent(a.deliver(sig_rev).unwrap()));
        rev.revealed_secret = generate_secret();

        let err = b.process(rev).unwrap_err();

        assert!(err.is_fatal());
        assert!(b.channel.state.frozen);
        assert_eq!(b.channel.state.chain.received_upto(), None);
        assert!(matches!(
            b.push(1_000),
            Err(ChannelError::InvalidState(_))
        ));
    }

    #[test]
    fn revocation_while_proposing_is_a_protocol_violation() {
        let (mut a, mut b) = channel_pair(1_000_000, 500_000, 10_000);
        let sig_rev = sent(b.deliver(sent(a.push(50_000).unwrap())).unwrap());
        let rev = sent(a.deliver(sig_rev).unwrap());
        b.deliver(rev).unwrap();

        b.push(1_000).unwrap();
        assert!(matches!(
            b.deliver(rev),
            Err(ChannelError::ProtocolViolation {
                message: MessageType::Rev,
                ..
            })
        ));
    }
}
