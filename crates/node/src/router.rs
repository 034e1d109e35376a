//! Delivers messages between nodes that live in the same process.
//!
//! Used by the dev binary and tests in place of a network transport.

use std::collections::HashMap;

use bitcoin::{Amount, OutPoint};
use paychan_channel_sm::{context::ChannelCtx, errors::ChannelError};
use paychan_primitives::PeerIdx;
use tokio::{
    sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    errors::{NodeError, NodeResult},
    node::Node,
    transport::{InboundMessage, OutboundMessage},
};

#[derive(Debug)]
struct Route {
    inbox: UnboundedSender<InboundMessage>,
    /// The index under which the receiving node knows the sender.
    remote_idx: PeerIdx,
}

/// Drains one node's outbox into the inboxes of its peers.
#[derive(Debug, Default)]
pub struct InProcessRouter {
    routes: HashMap<PeerIdx, Route>,
}

impl InProcessRouter {
    /// Creates a router without routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes messages addressed to `peer_idx` into `inbox`, marked as coming from `remote_idx`.
    pub fn add_route(
        &mut self,
        peer_idx: PeerIdx,
        inbox: UnboundedSender<InboundMessage>,
        remote_idx: PeerIdx,
    ) {
        self.routes.insert(peer_idx, Route { inbox, remote_idx });
    }

    /// Starts routing the messages of `outbox` until every sender of the outbox is dropped.
    pub fn spawn(self, mut outbox: UnboundedReceiver<OutboundMessage>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(msg) = outbox.recv().await {
                let Some(route) = self.routes.get(&msg.peer_idx) else {
                    warn!(peer_idx = msg.peer_idx, "no route to peer, dropping message");
                    continue;
                };

                let delivered = InboundMessage {
                    peer_idx: route.remote_idx,
                    msg_type: msg.msg_type,
                    payload: msg.payload,
                };
                if route.inbox.send(delivered).is_err() {
                    warn!(peer_idx = msg.peer_idx, "peer inbox closed, dropping message");
                }
            }

            debug!("outbox closed, stopping router");
        })
    }
}

/// Connects two nodes through their routers and starts a reader task on each side.
///
/// Returns the index under which `a` knows `b` and the index under which `b` knows `a`. Must be
/// called from within a tokio runtime, before the routers are spawned.
pub fn connect_in_process(
    a: &Node,
    router_a: &mut InProcessRouter,
    b: &Node,
    router_b: &mut InProcessRouter,
) -> (PeerIdx, PeerIdx) {
    let b_at_a = a.peers().add(b.identity(), None);
    let a_at_b = b.peers().add(a.identity(), None);

    let (a_inbox, a_reader) = unbounded_channel();
    let (b_inbox, b_reader) = unbounded_channel();
    tokio::spawn(a.clone().run_peer_reader(a_reader));
    tokio::spawn(b.clone().run_peer_reader(b_reader));

    router_a.add_route(b_at_a, b_inbox, a_at_b);
    router_b.add_route(a_at_b, a_inbox, b_at_a);

    info!(a = %a.identity(), b = %b.identity(), "connected nodes");

    (b_at_a, a_at_b)
}

/// Opens a channel of `capacity` funded by `outpoint` between two connected nodes, in which `a`
/// starts with `a_amount`.
pub async fn open_channel_between(
    a: &Node,
    b: &Node,
    outpoint: OutPoint,
    capacity: Amount,
    a_amount: Amount,
) -> NodeResult<()> {
    let b_amount = capacity.checked_sub(a_amount).ok_or_else(|| {
        ChannelError::InvalidAmount(format!("balance {a_amount} exceeds capacity {capacity}"))
    })?;

    let b_at_a = a
        .peers()
        .idx_of(&b.identity())
        .ok_or(NodeError::NotConnected(b.identity()))?;
    let a_at_b = b
        .peers()
        .idx_of(&a.identity())
        .ok_or(NodeError::NotConnected(a.identity()))?;

    let (a_first, a_second) = a.initial_points(outpoint)?;
    let (b_first, b_second) = b.initial_points(outpoint)?;

    let a_ctx = ChannelCtx {
        outpoint,
        capacity,
        peer_id: b.identity(),
        peer_idx: b_at_a,
    };
    a.adopt_channel(a_ctx, a_amount, b_first, b_second).await?;

    let b_ctx = ChannelCtx {
        outpoint,
        capacity,
        peer_id: a.identity(),
        peer_idx: a_at_b,
    };
    b.adopt_channel(b_ctx, b_amount, a_first, a_second).await
}
