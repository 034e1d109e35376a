//! State transitions of the channel state machine, one module per event, and the rebuilding of
//! the message that is due next.

mod delta_sig;
mod next_message;
mod push;
mod rev;
mod sig_rev;

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::{
        state::UpdatePhase,
        testing::{channel_pair, full_round},
    };

    #[test]
    fn full_round_moves_funds_and_advances_both_sides() {
        let (mut a, mut b) = channel_pair(1_000_000, 500_000, 10_000);

        full_round(&mut a, &mut b, 50_000);

        assert_eq!(a.my_sats(), 450_000);
        assert_eq!(b.my_sats(), 550_000);
        for party in [&a, &b] {
            assert_eq!(party.channel.state.state_idx, 1);
            assert_eq!(party.channel.state.phase, UpdatePhase::Idle);
            assert!(party.channel.state.their_sig.is_some());
        }
    }

    #[test]
    fn rounds_in_both_directions_keep_chains_in_lock_step() {
        let (mut a, mut b) = channel_pair(1_000_000, 500_000, 10_000);

        full_round(&mut a, &mut b, 50_000);
        full_round(&mut b, &mut a, 20_000);
        full_round(&mut b, &mut a, 1);
        full_round(&mut a, &mut b, 70_000);

        assert_eq!(a.my_sats(), 400_001);
        assert_eq!(b.my_sats(), 599_999);
        assert_eq!(a.channel.state.state_idx, 4);
        assert_eq!(b.channel.state.state_idx, 4);

        // every revoked state of the counterparty can be punished
        for idx in 0..4 {
            assert_eq!(
                a.channel.revealed_secret(idx).unwrap(),
                b.channel.state.chain.derive_secret(idx).unwrap()
            );
            assert_eq!(
                b.channel.revealed_secret(idx).unwrap(),
                a.channel.state.chain.derive_secret(idx).unwrap()
            );
        }
        assert!(a.channel.revealed_secret(4).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn random_rounds_conserve_balance(
            pushes in prop::collection::vec((any::<bool>(), 1u64..=40_000), 1..12)
        ) {
            let capacity = 1_000_000;
            let (mut a, mut b) = channel_pair(capacity, 500_000, 10_000);

            for (a_pushes, sats) in pushes {
                let before = a.channel.state.state_idx;
                let (proposer, receiver) = if a_pushes {
                    (&mut a, &mut b)
                } else {
                    (&mut b, &mut a)
                };
                full_round(proposer, receiver, sats);

                prop_assert_eq!(a.my_sats() + b.my_sats(), capacity);
                prop_assert_eq!(a.channel.state.state_idx, before + 1);
                prop_assert_eq!(b.channel.state.state_idx, before + 1);
                prop_assert_eq!(a.channel.state.chain.received_upto(), Some(before));
                prop_assert_eq!(b.channel.state.chain.received_upto(), Some(before));
            }
        }
    }
}
