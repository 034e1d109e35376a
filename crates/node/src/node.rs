//! The node that owns the channels of one identity.

use std::{fmt, sync::Arc, time::Duration};

use bitcoin::{Amount, OutPoint};
use paychan_channel_sm::{
    config::ChannelCfg,
    context::ChannelCtx,
    duties::ChannelDuty,
    errors::ChannelError,
    events::ChannelEvent,
    signals::ChannelSignal,
    signer::CommitmentSigner,
    state_machine::StateMachine,
    Channel, ChannelSummary, UpdatePhase,
};
use paychan_db::channel::ChannelDb;
use paychan_elkrem::{ElkremSender, RevocationChain, RevocationSecret};
use paychan_primitives::{outpoint::outpoint_to_bytes, PeerId, StateIdx};
use paychan_wire::{ChannelMessage, MessageType};
use secp256k1::PublicKey;
use tokio::{sync::mpsc::UnboundedReceiver, time::timeout};
use tracing::{debug, error, info, warn};

use crate::{
    config::NodeConfig,
    errors::{NodeError, NodeResult, RoundFailure},
    peers::PeerBook,
    registry::{ChannelLocks, PushRegistry},
    transport::{InboundMessage, OutboundMessage, Outbox},
};

/// A payment channel node.
///
/// Cloning is cheap and every clone drives the same channels, so the node can be handed to as
/// many tasks as needed.
#[derive(Debug, Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

struct NodeInner {
    cfg: Arc<ChannelCfg>,
    push_timeout: Duration,
    elkrem_seed: [u8; 32],
    db: Arc<dyn ChannelDb>,
    peers: PeerBook,
    pending: PushRegistry,
    locks: ChannelLocks,
    outbox: Outbox,
}

impl fmt::Debug for NodeInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeInner")
            .field("cfg", &self.cfg)
            .field("push_timeout", &self.push_timeout)
            .field("elkrem_seed", &"<redacted>")
            .field("peers", &self.peers)
            .field("pending", &self.pending)
            .field("outbox", &self.outbox)
            .finish_non_exhaustive()
    }
}

impl Node {
    /// Creates a new node.
    ///
    /// `elkrem_seed` is the private seed every revocation chain of the node is derived from. It
    /// has to stay the same across restarts.
    pub fn new(
        config: NodeConfig,
        signer: Arc<dyn CommitmentSigner>,
        elkrem_seed: [u8; 32],
        db: Arc<dyn ChannelDb>,
        outbox: Outbox,
    ) -> Self {
        let cfg = ChannelCfg::new(signer).with_min_bal(config.min_bal);

        Self {
            inner: Arc::new(NodeInner {
                cfg: Arc::new(cfg),
                push_timeout: config.push_timeout,
                elkrem_seed,
                db,
                peers: PeerBook::new(),
                pending: PushRegistry::new(),
                locks: ChannelLocks::new(),
                outbox,
            }),
        }
    }

    /// The identity of this node.
    pub fn identity(&self) -> PeerId {
        self.inner.cfg.signer().identity()
    }

    /// The peers this node knows about.
    pub fn peers(&self) -> &PeerBook {
        &self.inner.peers
    }

    /// The pushes that are waiting for their counterparty.
    pub fn pending_pushes(&self) -> &PushRegistry {
        &self.inner.pending
    }

    /// The revocation chain this node uses for the channel funded by `outpoint`.
    pub fn revocation_chain_for(&self, outpoint: OutPoint) -> RevocationChain {
        let context = outpoint_to_bytes(&outpoint);
        let sender = ElkremSender::from_seed(&self.inner.elkrem_seed, &context);

        RevocationChain::new(sender)
    }

    /// The revocation points for states zero and one of the channel funded by `outpoint`, which
    /// the counterparty needs to adopt the channel.
    pub fn initial_points(&self, outpoint: OutPoint) -> NodeResult<(PublicKey, PublicKey)> {
        let chain = self.revocation_chain_for(outpoint);
        let first = chain.point_for_index(0).map_err(ChannelError::from)?;
        let second = chain.point_for_index(1).map_err(ChannelError::from)?;

        Ok((first, second))
    }

    /// Starts tracking a freshly funded channel.
    ///
    /// `their_point` and `their_next_point` are the counterparty's
    /// [initial points](Self::initial_points).
    pub async fn adopt_channel(
        &self,
        context: ChannelCtx,
        my_amount: Amount,
        their_point: PublicKey,
        their_next_point: PublicKey,
    ) -> NodeResult<()> {
        let outpoint = context.outpoint();
        let lock = self.inner.locks.lock_for(outpoint);
        let _guard = lock.lock().await;

        if self.inner.db.get_channel(outpoint).await?.is_some() {
            return Err(NodeError::DuplicateChannel(outpoint));
        }

        let chain = self.revocation_chain_for(outpoint);
        let channel = Channel::new(context, my_amount, chain, their_point, their_next_point)?;
        self.inner.db.set_channel(&channel).await?;

        info!(
            %outpoint,
            peer = %context.peer_id(),
            %my_amount,
            capacity = %context.capacity(),
            "adopted channel"
        );

        Ok(())
    }

    /// Pushes `amount` to the counterparty of the channel funded by `outpoint` and waits until
    /// the counterparty has accepted the push.
    ///
    /// Fails with [`NodeError::PushTimeout`] if the counterparty does not answer within the push
    /// timeout. The proposal stays in flight in that case and can be repeated with
    /// [`Node::dispatch_next_message`].
    pub async fn request_push(&self, outpoint: OutPoint, amount: Amount) -> NodeResult<()> {
        let completion = {
            let lock = self.inner.locks.lock_for(outpoint);
            let _guard = lock.lock().await;

            let mut channel = self.load(outpoint).await?;
            let output = channel.process_event(
                self.inner.cfg.clone(),
                ChannelEvent::PushRequested { amount },
            )?;
            self.inner.db.set_channel(&channel).await?;

            // registered before the proposal leaves so that the answer always finds it
            let completion = self.inner.pending.register(outpoint);
            if let Err(e) = self.perform_duties(channel.context(), output.duties) {
                self.inner.pending.abandon(outpoint);
                return Err(e);
            }

            completion
        };

        debug!(%outpoint, %amount, pending = self.inner.pending.len(), "waiting for counterparty");

        match timeout(self.inner.push_timeout, completion).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(failure))) => Err(failure.into()),
            Ok(Err(_canceled)) => Err(RoundFailure::Abandoned.into()),
            Err(_elapsed) => {
                self.inner.pending.abandon(outpoint);
                warn!(%outpoint, %amount, timeout = ?self.inner.push_timeout, "push timed out");

                Err(NodeError::PushTimeout(outpoint))
            }
        }
    }

    /// Processes a message received from a peer.
    ///
    /// The channel is saved after every accepted transition and before any reply leaves. A
    /// channel frozen by the message is saved as well.
    pub async fn handle_message(&self, msg: InboundMessage) -> NodeResult<()> {
        let InboundMessage {
            peer_idx,
            msg_type,
            payload,
        } = msg;

        let peer_id = self
            .inner
            .peers
            .peer_id(peer_idx)
            .ok_or(NodeError::UnknownPeer(peer_idx))?;
        let msg = ChannelMessage::decode(msg_type, &payload)?;
        let outpoint = msg.outpoint();

        let lock = self.inner.locks.lock_for(outpoint);
        let _guard = lock.lock().await;

        let mut channel = self.load(outpoint).await?;
        channel.check_peer(&peer_id)?;

        let completes_push = msg.msg_type() == MessageType::SigRev
            && matches!(channel.state().phase, UpdatePhase::ProposerWaiting { .. });

        debug!(%outpoint, %peer_id, msg_type = %msg.msg_type(), "processing message");

        match channel.process_event(self.inner.cfg.clone(), msg.into()) {
            Ok(output) => {
                if let Err(e) = self.inner.db.set_channel(&channel).await {
                    error!(%outpoint, %e, "could not save channel");
                    if completes_push {
                        self.inner
                            .pending
                            .resolve(outpoint, Err(RoundFailure::Storage(e.to_string())));
                    }

                    return Err(e.into());
                }

                self.handle_signals(output.signals);
                self.perform_duties(channel.context(), output.duties)
            }
            // a recoverable rejection leaves the channel waiting, so a genuine answer can still
            // complete the push before it times out
            Err(e) if e.is_fatal() => {
                if let Err(db_err) = self.inner.db.set_channel(&channel).await {
                    error!(%outpoint, %db_err, "could not save frozen channel");
                }
                if completes_push {
                    self.inner
                        .pending
                        .resolve(outpoint, Err(RoundFailure::Rejected(e.clone())));
                }

                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Sends the message that is due next on the channel again, e.g. after the peer reconnected.
    pub async fn dispatch_next_message(&self, outpoint: OutPoint) -> NodeResult<()> {
        let lock = self.inner.locks.lock_for(outpoint);
        let _guard = lock.lock().await;

        let channel = self.load(outpoint).await?;
        let msg = channel.next_message(&self.inner.cfg)?;

        info!(%outpoint, msg_type = %msg.msg_type(), "resending message");

        self.perform_duties(channel.context(), vec![ChannelDuty::SendMessage(msg)])
    }

    /// Processes the messages of one peer in the order they arrive, until the transport closes
    /// the inbox.
    ///
    /// Errors are logged and the next message is processed.
    pub async fn run_peer_reader(self, mut inbox: UnboundedReceiver<InboundMessage>) {
        while let Some(msg) = inbox.recv().await {
            let peer_idx = msg.peer_idx;
            if let Err(e) = self.handle_message(msg).await {
                if e.channel_error().is_some_and(ChannelError::is_fatal) {
                    error!(%peer_idx, %e, "peer broke the revocation chain");
                } else {
                    warn!(%peer_idx, %e, "rejected message");
                }
            }
        }

        debug!("inbox closed, stopping peer reader");
    }

    /// Summaries of every channel of this node.
    pub async fn list_channels(&self) -> NodeResult<Vec<ChannelSummary>> {
        let channels = self.inner.db.get_all_channels().await?;

        Ok(channels.iter().map(Channel::summary).collect())
    }

    /// Summaries of the channels this node has with `peer_id`.
    pub async fn channels_with(&self, peer_id: PeerId) -> NodeResult<Vec<ChannelSummary>> {
        let channels = self.inner.db.get_channels_by_peer(peer_id).await?;

        Ok(channels.iter().map(Channel::summary).collect())
    }

    /// The summary of the channel funded by `outpoint`.
    pub async fn channel_summary(&self, outpoint: OutPoint) -> NodeResult<ChannelSummary> {
        Ok(self.load(outpoint).await?.summary())
    }

    /// A secret the counterparty revealed to revoke its state `index`.
    pub async fn revealed_secret(
        &self,
        outpoint: OutPoint,
        index: StateIdx,
    ) -> NodeResult<RevocationSecret> {
        Ok(self.load(outpoint).await?.revealed_secret(index)?)
    }

    /// Stops all updates of the channel, e.g. once its funding output has been spent.
    ///
    /// A push waiting on the channel fails.
    pub async fn mark_closed(&self, outpoint: OutPoint) -> NodeResult<()> {
        let lock = self.inner.locks.lock_for(outpoint);
        let _guard = lock.lock().await;

        let mut channel = self.load(outpoint).await?;
        channel.state_mut().closed = true;
        self.inner.db.set_channel(&channel).await?;
        self.inner
            .pending
            .resolve(outpoint, Err(RoundFailure::Abandoned));

        info!(%outpoint, "channel closed");

        Ok(())
    }

    async fn load(&self, outpoint: OutPoint) -> NodeResult<Channel> {
        self.inner
            .db
            .get_channel(outpoint)
            .await?
            .ok_or(NodeError::ChannelNotFound(outpoint))
    }

    fn perform_duties(&self, context: &ChannelCtx, duties: Vec<ChannelDuty>) -> NodeResult<()> {
        let peer_idx = self
            .inner
            .peers
            .idx_of(&context.peer_id())
            .unwrap_or(context.peer_idx());

        for duty in duties {
            debug!(%duty, %peer_idx, "performing duty");
            match duty {
                ChannelDuty::SendMessage(msg) => {
                    self.inner.outbox.send(OutboundMessage::new(peer_idx, &msg))?;
                }
            }
        }

        Ok(())
    }

    fn handle_signals(&self, signals: Vec<ChannelSignal>) {
        for signal in signals {
            match signal {
                ChannelSignal::PushCleared {
                    outpoint,
                    amount,
                    state_idx,
                } => {
                    if !self.inner.pending.resolve(outpoint, Ok(())) {
                        debug!(
                            %outpoint,
                            %amount,
                            %state_idx,
                            "push cleared without a waiting caller"
                        );
                    }
                }
                ChannelSignal::RevocationReceived {
                    outpoint,
                    amount,
                    revoked_idx,
                } => {
                    info!(%outpoint, %amount, %revoked_idx, "received push");
                }
            }
        }
    }
}
