use std::path::PathBuf;

use paychan_db::persistent::config::DbConfig;
use serde::{Deserialize, Serialize};

/// The configuration of the dev node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Config {
    /// The directory each node keeps its database in.
    pub datadir: PathBuf,

    /// Hex-encoded 32-byte seed that the identities, the revocation chains and the funding
    /// outpoint are derived from. The same seed resumes the same channel.
    pub seed: String,

    /// The reserve each party keeps, in satoshis.
    pub min_bal: u64,

    /// How long a push waits for the counterparty, in seconds.
    pub push_timeout: u64,

    /// The number of worker threads of the runtime.
    pub num_threads: Option<u8>,

    /// The configuration of the sled databases.
    pub db: DbConfig,

    /// The channel to open and the pushes to run on it.
    pub channel: ChannelConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ChannelConfig {
    /// Total value of the channel in satoshis.
    pub capacity: u64,

    /// What the first node starts with, in satoshis.
    pub a_amount: u64,

    /// What every push moves from the first node to the second, in satoshis.
    pub push_amount: u64,

    pub num_pushes: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_toml() {
        let config = r#"
            datadir = ".data"
            seed = "00000000000000000000000000000000000000000000000000000000000000aa"
            min_bal = 10000
            push_timeout = 30

            [db]
            max_retry_count = 3
            backoff_period = { secs = 1, nanos = 0 }

            [channel]
            capacity = 1000000
            a_amount = 500000
            push_amount = 50000
            num_pushes = 3
        "#;

        let config = toml::from_str::<Config>(config);
        assert!(
            config.is_ok(),
            "must be able to deserialize config from toml but got: {}",
            config.unwrap_err()
        );

        let config = config.unwrap();
        assert_eq!(config.num_threads, None);
        assert_eq!(config.channel.num_pushes, 3);
        assert_eq!(config.db.tree_name(), "channels");
        assert!(config.db.flush_on_write());
        assert_eq!(config.db.max_retry_count(), 3);

        let serialized = toml::to_string(&config).unwrap();
        let deserialized = toml::from_str::<Config>(&serialized).unwrap();
        assert_eq!(
            deserialized, config,
            "must be able to serialize and deserialize config to toml"
        );
    }
}
