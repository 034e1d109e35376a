//! Fixtures for driving pairs of channels through update rounds.

use std::sync::Arc;

use bitcoin::Amount;
use paychan_elkrem::{ElkremSender, RevocationChain};
use paychan_primitives::{outpoint::outpoint_to_bytes, PeerId};
use paychan_test_utils::bitcoin::{generate_keypair, generate_outpoint, generate_seed};
use paychan_wire::ChannelMessage;

use crate::{
    config::ChannelCfg,
    context::ChannelCtx,
    duties::ChannelDuty,
    errors::ChannelResult,
    events::ChannelEvent,
    machine::{Channel, ChannelOutput},
    signer::{CommitmentSigner, LocalSigner},
    state_machine::StateMachine,
};

/// One side of a channel together with the configuration of its node.
#[derive(Debug, Clone)]
pub(crate) struct Party {
    pub(crate) channel: Channel,
    pub(crate) cfg: Arc<ChannelCfg>,
}

impl Party {
    pub(crate) fn process(
        &mut self,
        event: impl Into<ChannelEvent>,
    ) -> ChannelResult<ChannelOutput> {
        self.channel.process_event(self.cfg.clone(), event.into())
    }

    pub(crate) fn push(&mut self, sats: u64) -> ChannelResult<ChannelOutput> {
        self.process(ChannelEvent::PushRequested {
            amount: Amount::from_sat(sats),
        })
    }

    pub(crate) fn deliver(&mut self, msg: ChannelMessage) -> ChannelResult<ChannelOutput> {
        self.process(msg)
    }

    pub(crate) fn my_sats(&self) -> u64 {
        self.channel.state.my_amount.to_sat()
    }
}

/// Creates both ends of a fresh channel in which `proposer` owns `proposer_sats`.
pub(crate) fn channel_pair(capacity: u64, proposer_sats: u64, min_bal: u64) -> (Party, Party) {
    let outpoint = generate_outpoint();
    let context_bytes = outpoint_to_bytes(&outpoint);

    let signer_a = Arc::new(LocalSigner::from(generate_keypair()));
    let signer_b = Arc::new(LocalSigner::from(generate_keypair()));
    let id_a = signer_a.identity();
    let id_b = signer_b.identity();

    let chain_a = RevocationChain::new(ElkremSender::from_seed(&generate_seed(), &context_bytes));
    let chain_b = RevocationChain::new(ElkremSender::from_seed(&generate_seed(), &context_bytes));

    let party = |signer: Arc<LocalSigner>,
                 peer_id: PeerId,
                 my_sats: u64,
                 chain: RevocationChain,
                 theirs: &RevocationChain| {
        let context = ChannelCtx {
            outpoint,
            capacity: Amount::from_sat(capacity),
            peer_id,
            peer_idx: 0,
        };
        let channel = Channel::new(
            context,
            Amount::from_sat(my_sats),
            chain,
            theirs.point_for_index(0).unwrap(),
            theirs.point_for_index(1).unwrap(),
        )
        .unwrap();
        let cfg = Arc::new(ChannelCfg::new(signer).with_min_bal(Amount::from_sat(min_bal)));

        Party { channel, cfg }
    };

    let a = party(signer_a, id_b, proposer_sats, chain_a.clone(), &chain_b);
    let b = party(signer_b, id_a, capacity - proposer_sats, chain_b, &chain_a);

    (a, b)
}

/// Extracts the single message an output asks to send.
pub(crate) fn sent(output: ChannelOutput) -> ChannelMessage {
    match output.duties.as_slice() {
        [ChannelDuty::SendMessage(msg)] => *msg,
        other => panic!("expected exactly one message, got {other:?}"),
    }
}

/// Runs a complete round in which `proposer` pushes `sats` to `receiver`.
pub(crate) fn full_round(proposer: &mut Party, receiver: &mut Party, sats: u64) {
    let delta_sig = sent(proposer.push(sats).expect("push must be accepted"));
    let sig_rev = sent(receiver.deliver(delta_sig).expect("proposal must be accepted"));
    let rev = sent(proposer.deliver(sig_rev).expect("counter-signature must be accepted"));
    let output = receiver.deliver(rev).expect("revocation must be accepted");
    assert!(output.duties.is_empty());
}
