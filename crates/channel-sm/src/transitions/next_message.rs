use paychan_wire::ChannelMessage;

use crate::{
    config::ChannelCfg,
    errors::{ChannelError, ChannelResult},
    machine::Channel,
    state::UpdatePhase,
};

impl Channel {
    /// Rebuilds the message that is due next, e.g. after a reconnection.
    ///
    /// A proposer still waiting repeats its proposal and a receiver that accepted a proposal
    /// repeats its answer. An idle channel repeats the last revocation, which the counterparty
    /// ignores if it has already processed it.
    pub fn next_message(&self, cfg: &ChannelCfg) -> ChannelResult<ChannelMessage> {
        self.ensure_operational()?;

        match self.state.phase {
            UpdatePhase::ProposerWaiting { amount } => {
                Ok(self.build_delta_sig(cfg, amount)?.into())
            }
            UpdatePhase::ReceiverCommitted { .. } => Ok(self.build_sig_rev(cfg)?.into()),
            UpdatePhase::Idle if self.state.state_idx == 0 => {
                Err(ChannelError::NothingToSend(self.state.state_idx))
            }
            UpdatePhase::Idle => Ok(self.build_rev()?.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use paychan_wire::MessageType;

    use crate::{
        errors::ChannelError,
        testing::{channel_pair, full_round, sent},
    };

    #[test]
    fn fresh_channel_has_nothing_to_send() {
        let (a, _b) = channel_pair(1_000_000, 500_000, 10_000);

        assert_eq!(
            a.channel.next_message(&a.cfg),
            Err(ChannelError::NothingToSend(0))
        );
    }

    #[test]
    fn resent_messages_drive_an_interrupted_round() {
        let (mut a, mut b) = channel_pair(1_000_000, 500_000, 10_000);

        // the first proposal is lost
        let _lost = sent(a.push(50_000).unwrap());
        let resent = a.channel.next_message(&a.cfg).unwrap();
        assert_eq!(resent.msg_type(), MessageType::DeltaSig);

        // the first answer is lost
        let _lost = sent(b.deliver(resent).unwrap());
        let resent = b.channel.next_message(&b.cfg).unwrap();
        assert_eq!(resent.msg_type(), MessageType::SigRev);

        let rev = sent(a.deliver(resent).unwrap());
        assert_eq!(a.channel.next_message(&a.cfg).unwrap(), rev);

        b.deliver(rev).unwrap();
        assert_eq!(a.my_sats(), 450_000);
        assert_eq!(b.my_sats(), 550_000);
    }

    #[test]
    fn idle_channel_resends_harmless_revocation() {
        let (mut a, mut b) = channel_pair(1_000_000, 500_000, 10_000);
        full_round(&mut a, &mut b, 50_000);
        let before = b.channel.clone();

        for party in [&a, &b] {
            let msg = party.channel.next_message(&party.cfg).unwrap();
            assert_eq!(msg.msg_type(), MessageType::Rev);
        }

        let again = a.channel.next_message(&a.cfg).unwrap();
        assert!(b.deliver(again).unwrap().is_empty());
        assert_eq!(b.channel, before);
    }
}
