//! Fixtures for driving nodes by hand.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use bitcoin::{Amount, OutPoint};
use paychan_channel_sm::{signer::LocalSigner, Channel};
use paychan_db::{
    channel::ChannelDb,
    errors::DbResult,
    inmemory::ChannelDbInMemory,
    persistent::errors::StorageError,
};
use paychan_primitives::PeerIdx;
use paychan_test_utils::bitcoin::{generate_keypair, generate_outpoint, generate_seed};
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};

use crate::{
    config::NodeConfig,
    errors::NodeResult,
    node::Node,
    router::open_channel_between,
    transport::{InboundMessage, OutboundMessage, Outbox},
};

/// A channel database whose writes can be made to fail.
#[derive(Debug, Default)]
pub(crate) struct FailingDb {
    inner: ChannelDbInMemory,
    fail_writes: AtomicBool,
}

impl FailingDb {
    pub(crate) fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChannelDb for FailingDb {
    async fn get_channel(&self, outpoint: OutPoint) -> DbResult<Option<Channel>> {
        self.inner.get_channel(outpoint).await
    }

    async fn set_channel(&self, channel: &Channel) -> DbResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::InvalidData("disk full".to_string()).into());
        }

        self.inner.set_channel(channel).await
    }

    async fn get_all_channels(&self) -> DbResult<Vec<Channel>> {
        self.inner.get_all_channels().await
    }
}

/// A node whose outgoing messages are collected instead of delivered.
pub(crate) struct TestNode {
    pub(crate) node: Node,
    pub(crate) outbox: UnboundedReceiver<OutboundMessage>,
}

impl TestNode {
    pub(crate) fn new(db: Arc<dyn ChannelDb>, push_timeout: Duration) -> Self {
        let config = NodeConfig {
            min_bal: Amount::from_sat(10_000),
            push_timeout,
        };
        let signer = Arc::new(LocalSigner::from(generate_keypair()));
        let (outbox, receiver) = Outbox::new();
        let node = Node::new(config, signer, generate_seed(), db, outbox);

        Self {
            node,
            outbox: receiver,
        }
    }

    pub(crate) fn in_memory() -> Self {
        Self::new(Arc::new(ChannelDbInMemory::default()), Duration::from_secs(5))
    }

    /// The next message this node sent.
    pub(crate) async fn next_sent(&mut self) -> OutboundMessage {
        self.outbox.recv().await.expect("outbox must stay open")
    }
}

/// Starts a push of `sats` in the background. Its proposal shows up in the node's outbox.
pub(crate) fn spawn_push(node: &Node, outpoint: OutPoint, sats: u64) -> JoinHandle<NodeResult<()>> {
    let node = node.clone();

    tokio::spawn(async move { node.request_push(outpoint, Amount::from_sat(sats)).await })
}

/// Delivers a message as coming from the peer known under `from`.
pub(crate) fn as_inbound(msg: OutboundMessage, from: PeerIdx) -> InboundMessage {
    InboundMessage {
        peer_idx: from,
        msg_type: msg.msg_type,
        payload: msg.payload,
    }
}

/// Makes two nodes know each other and opens a 1,000,000 sat channel split evenly between them.
///
/// Returns the outpoint, the index of `b` at `a` and the index of `a` at `b`.
pub(crate) async fn linked(a: &TestNode, b: &TestNode) -> (OutPoint, PeerIdx, PeerIdx) {
    let b_at_a = a.node.peers().add(b.node.identity(), None);
    let a_at_b = b.node.peers().add(a.node.identity(), None);
    let outpoint = generate_outpoint();

    open_channel_between(
        &a.node,
        &b.node,
        outpoint,
        Amount::from_sat(1_000_000),
        Amount::from_sat(500_000),
    )
    .await
    .expect("channel must open");

    (outpoint, b_at_a, a_at_b)
}
