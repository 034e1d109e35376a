//! Database interface for channels.

use async_trait::async_trait;
use bitcoin::OutPoint;
use paychan_channel_sm::Channel;
use paychan_primitives::PeerId;

use crate::errors::DbResult;

/// Interface to load and save channels.
///
/// Channels are keyed by their funding outpoint. Callers that act on behalf of a peer check the
/// loaded channel's counterparty themselves.
#[async_trait]
pub trait ChannelDb: Send + Sync {
    /// Gets, if present, the channel funded by `outpoint`.
    async fn get_channel(&self, outpoint: OutPoint) -> DbResult<Option<Channel>>;

    /// Saves a channel, replacing any earlier version of it.
    ///
    /// The channel is durable once this returns, and either the old or the new version is stored
    /// if it fails.
    async fn set_channel(&self, channel: &Channel) -> DbResult<()>;

    /// Gets every stored channel.
    async fn get_all_channels(&self) -> DbResult<Vec<Channel>>;

    /// Gets every stored channel with the given counterparty.
    async fn get_channels_by_peer(&self, peer_id: PeerId) -> DbResult<Vec<Channel>> {
        Ok(self
            .get_all_channels()
            .await?
            .into_iter()
            .filter(|channel| channel.context().peer_id() == peer_id)
            .collect())
    }
}
