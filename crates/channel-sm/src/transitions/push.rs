use bitcoin::Amount;
use paychan_wire::DeltaSig;
use tracing::debug;

use crate::{
    config::ChannelCfg,
    duties::ChannelDuty,
    errors::{ChannelError, ChannelResult, Side},
    machine::{Channel, ChannelOutput},
    state::UpdatePhase,
};

impl Channel {
    /// Starts a round that pushes `amount` to the counterparty.
    ///
    /// Both parties have to keep the reserve after the push. Only the phase changes: the state
    /// index and balances move once the counterparty has answered.
    pub(crate) fn process_push_requested(
        &mut self,
        cfg: &ChannelCfg,
        amount: Amount,
    ) -> ChannelResult<ChannelOutput> {
        self.ensure_operational()?;
        if !self.state.is_idle() {
            return Err(ChannelError::InvalidState(format!(
                "round already in flight on {} ({})",
                self.outpoint(),
                self.state.phase
            )));
        }

        if amount == Amount::ZERO {
            return Err(ChannelError::InvalidAmount("cannot push zero".to_string()));
        }

        let min_bal = cfg.min_bal();
        let required = amount
            .checked_add(min_bal)
            .ok_or_else(|| ChannelError::InvalidAmount(format!("{amount} overflows")))?;
        if required > self.state.my_amount {
            return Err(ChannelError::InsufficientBalance {
                side: Side::Local,
                balance: self.state.my_amount,
                required,
            });
        }

        let their_after = self.their_amount() + amount;
        if their_after < min_bal {
            return Err(ChannelError::InsufficientBalance {
                side: Side::Remote,
                balance: their_after,
                required: min_bal,
            });
        }

        let msg = self.build_delta_sig(cfg, amount)?;
        self.state.phase = UpdatePhase::ProposerWaiting { amount };

        debug!(outpoint = %self.outpoint(), %amount, "proposing push");

        Ok(ChannelOutput::with_duties(vec![ChannelDuty::SendMessage(
            msg.into(),
        )]))
    }

    /// Builds the proposal for pushing `amount`: a signature over the counterparty's commitment
    /// for the next state.
    pub(crate) fn build_delta_sig(
        &self,
        cfg: &ChannelCfg,
        amount: Amount,
    ) -> ChannelResult<DeltaSig> {
        let delta = i32::try_from(amount.to_sat()).map_err(|_| {
            ChannelError::InvalidAmount(format!("{amount} does not fit into a signed delta"))
        })?;

        let commitment = self.their_commitment(
            self.state.state_idx + 1,
            self.state.my_amount - amount,
            self.state.their_next_point,
        );

        Ok(DeltaSig {
            outpoint: self.outpoint(),
            delta,
            signature: cfg.signer().sign(&commitment),
        })
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::Amount;

    use crate::{
        errors::{ChannelError, Side},
        state::UpdatePhase,
        testing::{channel_pair, sent},
    };

    #[test]
    fn push_only_changes_phase() {
        let (mut a, _b) = channel_pair(1_000_000, 500_000, 10_000);

        let msg = sent(a.push(50_000).unwrap());

        assert_eq!(msg.msg_type(), paychan_wire::MessageType::DeltaSig);
        assert_eq!(a.my_sats(), 500_000);
        assert_eq!(a.channel.state.state_idx, 0);
        assert_eq!(
            a.channel.state.phase,
            UpdatePhase::ProposerWaiting {
                amount: Amount::from_sat(50_000)
            }
        );
        assert_eq!(a.channel.state.delta().to_sat(), -50_000);
    }

    #[test]
    fn push_must_leave_reserve() {
        let (mut a, _b) = channel_pair(1_000_000, 15_000, 10_000);
        let before = a.channel.clone();

        let err = a.push(10_000).unwrap_err();

        assert_eq!(
            err,
            ChannelError::InsufficientBalance {
                side: Side::Local,
                balance: Amount::from_sat(15_000),
                required: Amount::from_sat(20_000),
            }
        );
        assert_eq!(a.channel, before);

        // exactly the reserve left is fine
        assert!(a.push(5_000).is_ok());
    }

    #[test]
    fn counterparty_must_reach_reserve() {
        let (mut a, _b) = channel_pair(1_000_000, 995_000, 10_000);

        let err = a.push(4_000).unwrap_err();
        assert!(matches!(
            err,
            ChannelError::InsufficientBalance {
                side: Side::Remote,
                ..
            }
        ));
    }

    #[test]
    fn second_push_while_in_flight_is_rejected() {
        let (mut a, _b) = channel_pair(1_000_000, 500_000, 10_000);
        a.push(1_000).unwrap();
        let before = a.channel.clone();

        assert!(matches!(a.push(1_000), Err(ChannelError::InvalidState(_))));
        assert_eq!(a.channel, before);
    }

    #[test]
    fn zero_and_oversized_amounts_are_rejected() {
        let (mut a, _b) = channel_pair(u32::MAX as u64 * 2, u32::MAX as u64, 10_000);

        assert!(matches!(a.push(0), Err(ChannelError::InvalidAmount(_))));
        assert!(matches!(
            a.push(i32::MAX as u64 + 1),
            Err(ChannelError::InvalidAmount(_))
        ));
        assert!(a.channel.state.is_idle());
    }

    #[test]
    fn closed_or_frozen_channels_reject_pushes() {
        let (mut a, _b) = channel_pair(1_000_000, 500_000, 10_000);
        a.channel.state.closed = true;
        assert!(matches!(a.push(1_000), Err(ChannelError::InvalidState(_))));

        a.channel.state.closed = false;
        a.channel.state.frozen = true;
        assert!(matches!(a.push(1_000), Err(ChannelError::InvalidState(_))));
    }
}
