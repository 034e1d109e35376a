//! Sled implementation of the persistent storage layer.
//!
//! Channels live in a single tree, keyed by the 36-byte wire encoding of their funding outpoint
//! and stored as bincode. Unless the [`DbConfig`] says otherwise, every write is flushed to disk
//! before it is acknowledged.

use std::path::Path;

use async_trait::async_trait;
use bitcoin::OutPoint;
use paychan_channel_sm::Channel;
use paychan_primitives::outpoint::outpoint_to_bytes;
use sled::{IVec, Tree};
use tracing::{trace, warn};

use super::{config::DbConfig, errors::StorageError};
use crate::{channel::ChannelDb, errors::DbResult};

/// Channel database backed by sled.
#[derive(Debug, Clone)]
pub struct SledChannelDb {
    tree: Tree,
    config: DbConfig,
}

impl SledChannelDb {
    /// Opens the configured channel tree in an already open sled database.
    pub fn new(db: &sled::Db, config: DbConfig) -> DbResult<Self> {
        let tree = db
            .open_tree(config.tree_name())
            .map_err(StorageError::from)?;

        Ok(Self { tree, config })
    }

    /// Opens (or creates) the sled database at `path`.
    pub fn open(path: impl AsRef<Path>, config: DbConfig) -> DbResult<Self> {
        let db = sled::open(path).map_err(StorageError::from)?;

        Self::new(&db, config)
    }

    /// Opens a database that is deleted once dropped.
    pub fn temporary(config: DbConfig) -> DbResult<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(StorageError::from)?;

        Self::new(&db, config)
    }

    async fn try_store(&self, key: &[u8], value: &[u8]) -> Result<(), sled::Error> {
        self.tree.insert(key, value)?;
        if self.config.flush_on_write() {
            self.tree.flush_async().await?;
        }

        Ok(())
    }
}

fn decode(key: &[u8], value: &IVec) -> Result<Channel, StorageError> {
    let channel: Channel = bincode::deserialize(value)?;
    if outpoint_to_bytes(&channel.outpoint()) != key {
        return Err(StorageError::InvalidData(format!(
            "entry for {} stored under another key",
            channel.outpoint()
        )));
    }

    Ok(channel)
}

#[async_trait]
impl ChannelDb for SledChannelDb {
    async fn get_channel(&self, outpoint: OutPoint) -> DbResult<Option<Channel>> {
        let key = outpoint_to_bytes(&outpoint);
        let value = self.tree.get(key).map_err(StorageError::from)?;

        Ok(value.map(|value| decode(&key, &value)).transpose()?)
    }

    async fn set_channel(&self, channel: &Channel) -> DbResult<()> {
        let key = outpoint_to_bytes(&channel.outpoint());
        let value = bincode::serialize(channel).map_err(StorageError::from)?;

        let mut attempt = 0;
        loop {
            match self.try_store(&key, &value).await {
                Ok(()) => {
                    trace!(
                        outpoint = %channel.outpoint(),
                        state_idx = channel.state().state_idx,
                        "saved channel"
                    );
                    return Ok(());
                }
                Err(e) if attempt < self.config.max_retry_count() => {
                    attempt += 1;
                    warn!(
                        outpoint = %channel.outpoint(),
                        %e,
                        %attempt,
                        "failed to save channel, retrying"
                    );
                    tokio::time::sleep(self.config.backoff_period()).await;
                }
                Err(e) => return Err(StorageError::from(e).into()),
            }
        }
    }

    async fn get_all_channels(&self) -> DbResult<Vec<Channel>> {
        let mut channels = Vec::new();
        for entry in self.tree.iter() {
            let (key, value) = entry.map_err(StorageError::from)?;
            channels.push(decode(&key, &value)?);
        }

        Ok(channels)
    }
}
