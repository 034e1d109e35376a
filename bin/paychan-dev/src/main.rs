//! Runs two payment channel nodes in one process, opens a channel between them and pushes funds
//! from the first to the second.
//!
//! Each node keeps its channels in its own sled database under the data directory. Running again
//! with the same seed and data directory resumes the channel where the last run left it.

use std::{fs, path::Path, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use bitcoin::{
    hashes::{sha256, Hash, HashEngine},
    secp256k1::SecretKey,
    Amount, OutPoint, Txid,
};
use clap::Parser;
use config::Config;
use constants::{DEFAULT_THREAD_COUNT, SETTLE_MAX_POLLS, SETTLE_POLL_INTERVAL};
use paychan_channel_sm::{errors::ChannelError, signer::LocalSigner};
use paychan_common::{logging, logging::LoggerConfig};
use paychan_db::persistent::SledChannelDb;
use paychan_node::{
    config::NodeConfig,
    errors::NodeError,
    router::{connect_in_process, open_channel_between, InProcessRouter},
    transport::{OutboundMessage, Outbox},
    Node,
};
use serde::de::DeserializeOwned;
use tokio::{runtime, sync::mpsc::UnboundedReceiver, time::sleep};
use tracing::{debug, info, trace, warn};

mod args;
mod config;
mod constants;

fn main() -> anyhow::Result<()> {
    let cli = args::Cli::parse();

    let mut logger_config = LoggerConfig::with_base_name("paychan-dev");
    if cli.log_source {
        logger_config.set_source_annotations(true);
    }
    logging::init(logger_config);

    let mut config = parse_toml::<Config>(&cli.config)?;
    if let Some(datadir) = cli.datadir {
        config.datadir = datadir;
    }
    if let Some(num_pushes) = cli.num_pushes {
        config.channel.num_pushes = num_pushes;
    }

    let runtime = runtime::Builder::new_multi_thread()
        .worker_threads(config.num_threads.unwrap_or(DEFAULT_THREAD_COUNT).into())
        .enable_all()
        .build()
        .context("could not create runtime")?;

    runtime.block_on(run(config))?;

    info!("dev node shutdown complete");

    Ok(())
}

async fn run(config: Config) -> anyhow::Result<()> {
    let seed = parse_seed(&config.seed)?;

    let (a, a_outbox) = build_node("node-a", &seed, &config)?;
    let (b, b_outbox) = build_node("node-b", &seed, &config)?;
    info!(a = %a.identity(), b = %b.identity(), "started nodes");

    let mut router_a = InProcessRouter::new();
    let mut router_b = InProcessRouter::new();
    connect_in_process(&a, &mut router_a, &b, &mut router_b);
    router_a.spawn(a_outbox);
    router_b.spawn(b_outbox);

    let outpoint = OutPoint {
        txid: Txid::from_byte_array(derive(&seed, "funding")),
        vout: 0,
    };
    let channel = config.channel;

    match open_channel_between(
        &a,
        &b,
        outpoint,
        Amount::from_sat(channel.capacity),
        Amount::from_sat(channel.a_amount),
    )
    .await
    {
        Ok(()) => info!(%outpoint, "opened channel"),
        Err(NodeError::DuplicateChannel(_)) => {
            info!(%outpoint, "resuming channel");
            for node in [&a, &b] {
                if let Err(e) = node.dispatch_next_message(outpoint).await {
                    debug!(%e, "nothing to resend");
                }
            }
            wait_until_idle(&a, outpoint).await?;
        }
        Err(e) => return Err(e.into()),
    }

    let push_amount = Amount::from_sat(channel.push_amount);
    for round in 1..=channel.num_pushes {
        match a.request_push(outpoint, push_amount).await {
            Ok(()) => {}
            Err(e)
                if matches!(
                    e.channel_error(),
                    Some(ChannelError::InsufficientBalance { .. })
                ) =>
            {
                warn!(%round, %e, "stopping pushes");
                break;
            }
            Err(e) => return Err(e).with_context(|| format!("push {round} failed")),
        }

        let state_idx = a.channel_summary(outpoint).await?.state_idx;
        wait_until_settled(&b, outpoint, state_idx).await?;
        info!(%round, %state_idx, amount = %push_amount, "push settled");
    }

    for (name, node) in [("node-a", &a), ("node-b", &b)] {
        info!(%name, channels = node.list_channels().await?.len(), "channel summaries");
        for (peer_idx, peer) in node.peers().connected() {
            for summary in node.channels_with(peer.peer_id).await? {
                info!(
                    %name,
                    %peer_idx,
                    outpoint = %summary.outpoint,
                    capacity = %summary.capacity,
                    my_amount = %summary.my_amount,
                    their_amount = %summary.their_amount,
                    state_idx = %summary.state_idx,
                    frozen = %summary.frozen,
                    "channel"
                );
            }
        }
    }

    Ok(())
}

fn build_node(
    name: &str,
    seed: &[u8; 32],
    config: &Config,
) -> anyhow::Result<(Node, UnboundedReceiver<OutboundMessage>)> {
    let sk = SecretKey::from_slice(&derive(seed, &format!("{name}/identity")))
        .context("seed does not yield a valid identity key")?;
    let db = SledChannelDb::open(config.datadir.join(name), config.db.clone())
        .with_context(|| format!("could not open database of {name}"))?;

    let node_config = NodeConfig {
        min_bal: Amount::from_sat(config.min_bal),
        push_timeout: Duration::from_secs(config.push_timeout),
    };
    let (outbox, receiver) = Outbox::new();
    let node = Node::new(
        node_config,
        Arc::new(LocalSigner::new(sk)),
        derive(seed, &format!("{name}/elkrem")),
        Arc::new(db),
        outbox,
    );

    Ok((node, receiver))
}

/// Waits until the channel at `node` is idle in state `state_idx`.
async fn wait_until_settled(node: &Node, outpoint: OutPoint, state_idx: u64) -> anyhow::Result<()> {
    for _ in 0..SETTLE_MAX_POLLS {
        let summary = node.channel_summary(outpoint).await?;
        if summary.state_idx == state_idx && summary.delta.to_sat() == 0 {
            return Ok(());
        }
        sleep(SETTLE_POLL_INTERVAL).await;
    }

    bail!("channel {outpoint} did not settle at state {state_idx}")
}

async fn wait_until_idle(node: &Node, outpoint: OutPoint) -> anyhow::Result<()> {
    for _ in 0..SETTLE_MAX_POLLS {
        if node.channel_summary(outpoint).await?.delta.to_sat() == 0 {
            return Ok(());
        }
        sleep(SETTLE_POLL_INTERVAL).await;
    }

    bail!("round on channel {outpoint} did not complete")
}

fn derive(seed: &[u8; 32], tag: &str) -> [u8; 32] {
    let mut engine = sha256::Hash::engine();
    engine.input(seed);
    engine.input(tag.as_bytes());

    sha256::Hash::from_engine(engine).to_byte_array()
}

fn parse_seed(seed: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = hex::decode(seed).context("seed must be hex")?;

    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| anyhow::anyhow!("seed must be 32 bytes, got {}", bytes.len()))
}

/// Reads and parses a TOML file from the given path into the given type `T`.
fn parse_toml<T>(path: impl AsRef<Path>) -> anyhow::Result<T>
where
    T: std::fmt::Debug + DeserializeOwned,
{
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read TOML file {}", path.display()))?;
    trace!(?contents, "read file");

    let parsed = toml::from_str::<T>(&contents).context("failed to parse TOML file")?;
    debug!(?parsed, "parsed TOML file");

    Ok(parsed)
}
