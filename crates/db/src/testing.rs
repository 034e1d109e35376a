//! Channel fixtures for database tests.

use bitcoin::Amount;
use paychan_channel_sm::{context::ChannelCtx, Channel};
use paychan_elkrem::{ElkremSender, RevocationChain};
use paychan_primitives::PeerId;
use paychan_test_utils::bitcoin::{generate_outpoint, generate_pubkey, generate_seed};

/// Creates a fresh channel with `peer_id` on a random outpoint.
pub(crate) fn generate_channel(peer_id: PeerId) -> Channel {
    let context = ChannelCtx {
        outpoint: generate_outpoint(),
        capacity: Amount::from_sat(1_000_000),
        peer_id,
        peer_idx: 1,
    };
    let chain = RevocationChain::new(ElkremSender::from_seed(&generate_seed(), b"db"));

    Channel::new(
        context,
        Amount::from_sat(400_000),
        chain,
        generate_pubkey(),
        generate_pubkey(),
    )
    .expect("balance is within capacity")
}
