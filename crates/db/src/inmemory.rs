//! In-memory implementation of the channel database.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bitcoin::OutPoint;
use paychan_channel_sm::Channel;
use tokio::sync::RwLock;
use tracing::trace;

use crate::{channel::ChannelDb, errors::DbResult};

/// In-memory database for channels.
#[derive(Debug, Default, Clone)]
pub struct ChannelDbInMemory {
    /// funding outpoint -> channel
    channels: Arc<RwLock<HashMap<OutPoint, Channel>>>,
}

#[async_trait]
impl ChannelDb for ChannelDbInMemory {
    async fn get_channel(&self, outpoint: OutPoint) -> DbResult<Option<Channel>> {
        Ok(self.channels.read().await.get(&outpoint).cloned())
    }

    async fn set_channel(&self, channel: &Channel) -> DbResult<()> {
        trace!(
            outpoint = %channel.outpoint(),
            state_idx = channel.state().state_idx,
            "saving channel"
        );

        self.channels
            .write()
            .await
            .insert(channel.outpoint(), channel.clone());

        Ok(())
    }

    async fn get_all_channels(&self) -> DbResult<Vec<Channel>> {
        Ok(self.channels.read().await.values().cloned().collect())
    }
}
