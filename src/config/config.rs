// src/config/config.rs
use crate::{types::GpuPlatform, utils::error::SwitchError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Main configuration structure for the coin switcher
///
/// Every section has defaults, so a file only needs to list what differs.
/// A file that is supplied must still name at least one coin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ranking feed settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Tick and cadence settings
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Miner executable settings
    #[serde(default)]
    pub miner: MinerConfig,

    /// Switch journal settings
    #[serde(default)]
    pub journal: JournalConfig,

    /// Coins this installation is willing to mine, keyed by feed identifier
    pub coins: BTreeMap<String, CoinConfig>,
}

/// Where and how to fetch the profitability ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Ranking document URL
    pub url: String,
    /// Algorithm family this installation mines (e.g. "Ethash")
    pub algorithm: String,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            url: "https://whattomine.com/coins.json".into(),
            algorithm: "Ethash".into(),
            timeout_secs: 30,
        }
    }
}

/// Control loop cadences, all measured in ticks of `tick_secs`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Base tick; the miner liveness check runs every tick
    pub tick_secs: u64,
    /// The feed is polled every this many ticks
    pub poll_every_ticks: u32,
    /// Minimum time a freshly started miner runs before it may be switched
    pub min_runtime_ticks: u32,
    /// How long a stopping miner may take to exit after SIGINT
    pub stop_grace_secs: u64,
    /// Pause after a miner exits so the GPUs are released before relaunch
    pub relaunch_delay_secs: u64,
    /// Statistics report interval
    pub stats_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            tick_secs: 10,
            poll_every_ticks: 30,
            min_runtime_ticks: 3,
            stop_grace_secs: 30,
            relaunch_delay_secs: 1,
            stats_interval_secs: 300,
        }
    }
}

impl ScheduleConfig {
    /// Base tick interval
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_secs)
    }

    /// Interval between two feed polls
    pub fn poll_interval(&self) -> Duration {
        self.tick().saturating_mul(self.poll_every_ticks)
    }

    /// Minimum-runtime guard of a freshly started miner
    pub fn min_runtime(&self) -> Duration {
        self.tick().saturating_mul(self.min_runtime_ticks)
    }
}

/// Miner executable and the arguments shared by every coin
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Path to the miner binary
    pub executable: PathBuf,
    /// Arguments placed before the platform flag and the coin arguments
    pub common_args: Vec<String>,
    /// GPU platform (selects `-U` or `-G`)
    pub platform: GpuPlatform,
    /// Worker name substituted for `{worker}`; defaults per platform
    pub worker: Option<String>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        MinerConfig {
            executable: PathBuf::from("/usr/local/bin/ethminer"),
            common_args: ["-R", "--display-interval", "30", "--noeval"]
                .into_iter()
                .map(String::from)
                .collect(),
            platform: GpuPlatform::default(),
            worker: None,
        }
    }
}

impl MinerConfig {
    /// Worker name after applying the platform default
    pub fn worker_name(&self) -> &str {
        self.worker
            .as_deref()
            .unwrap_or_else(|| self.platform.default_worker())
    }
}

/// Append-only switch journal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Write switch records to `path` (they are always mirrored to stdout)
    pub enabled: bool,
    /// Journal file location
    pub path: PathBuf,
}

impl Default for JournalConfig {
    fn default() -> Self {
        JournalConfig {
            enabled: true,
            path: PathBuf::from("whatlog.txt"),
        }
    }
}

/// One supported coin as written in the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinConfig {
    /// Pool fee as a fraction in [0, 1)
    pub pool_fee: f64,
    /// Exchange fee as a fraction in [0, 1)
    #[serde(default)]
    pub exchange_fee: f64,
    /// Coin-specific miner arguments; may contain `{wallet}` and `{worker}`
    pub command: String,
    /// Literal wallet address for `{wallet}`
    #[serde(default)]
    pub wallet: Option<String>,
    /// Environment variable holding the wallet address for `{wallet}`
    #[serde(default)]
    pub wallet_env: Option<String>,
}

impl Default for Config {
    /// Built-in catalog used when no configuration file is given
    fn default() -> Self {
        let mut coins = BTreeMap::new();
        coins.insert(
            "Ethereum".to_string(),
            CoinConfig {
                pool_fee: 0.01,
                exchange_fee: 0.0,
                command: "-P stratum+tls12://{wallet}.{worker}@us1.ethermine.org:5555".into(),
                wallet: None,
                wallet_env: Some("ETHWALLET".into()),
            },
        );
        coins.insert(
            "EthereumClassic".to_string(),
            CoinConfig {
                pool_fee: 0.01,
                exchange_fee: 0.0,
                command: "-P stratum+tls12://{wallet}.{worker}@us1-etc.ethermine.org:5555".into(),
                wallet: None,
                wallet_env: Some("ETCWALLET".into()),
            },
        );

        Config {
            feed: FeedConfig::default(),
            schedule: ScheduleConfig::default(),
            miner: MinerConfig::default(),
            journal: JournalConfig::default(),
            coins,
        }
    }
}

impl Config {
    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded and validated configuration
    /// * `Err(SwitchError::ConfigError)` - If the file couldn't be read, parsed or validated
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SwitchError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path).map_err(|e| {
            SwitchError::ConfigError(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml(&config_str)
    }

    /// Parses and validates configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, SwitchError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the control loop relies on
    ///
    /// Wallet placeholders are resolved later, when the catalog is built.
    pub fn validate(&self) -> Result<(), SwitchError> {
        let url = Url::parse(&self.feed.url).map_err(|e| {
            SwitchError::ConfigError(format!("Invalid feed URL '{}': {}", self.feed.url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SwitchError::ConfigError(format!(
                "Feed URL '{}' must use http or https",
                self.feed.url
            )));
        }
        if self.feed.algorithm.trim().is_empty() {
            return Err(SwitchError::ConfigError("feed.algorithm is empty".into()));
        }

        let schedule = &self.schedule;
        if schedule.tick_secs == 0 || schedule.poll_every_ticks == 0 {
            return Err(SwitchError::ConfigError(
                "schedule.tick_secs and schedule.poll_every_ticks must be positive".into(),
            ));
        }
        let (Some(poll_interval), Some(_)) = (
            schedule.tick().checked_mul(schedule.poll_every_ticks),
            schedule.tick().checked_mul(schedule.min_runtime_ticks),
        ) else {
            return Err(SwitchError::ConfigError(format!(
                "schedule.tick_secs ({}) overflows the poll interval or minimum runtime",
                schedule.tick_secs
            )));
        };
        if self.feed.timeout_secs == 0 || self.feed.timeout() >= poll_interval {
            return Err(SwitchError::ConfigError(format!(
                "feed.timeout_secs ({}) must be positive and below the poll interval ({}s)",
                self.feed.timeout_secs,
                poll_interval.as_secs()
            )));
        }

        if self.miner.executable.as_os_str().is_empty() {
            return Err(SwitchError::ConfigError("miner.executable is empty".into()));
        }

        if self.coins.is_empty() {
            return Err(SwitchError::ConfigError("No coins configured".into()));
        }
        for (id, coin) in &self.coins {
            for (name, fee) in [("pool_fee", coin.pool_fee), ("exchange_fee", coin.exchange_fee)] {
                if !(0.0..1.0).contains(&fee) {
                    return Err(SwitchError::ConfigError(format!(
                        "{} of coin '{}' must be in [0, 1), got {}",
                        name, id, fee
                    )));
                }
            }
            if coin.command.trim().is_empty() {
                return Err(SwitchError::ConfigError(format!(
                    "Coin '{}' has an empty command",
                    id
                )));
            }
        }

        Ok(())
    }

    /// Generates a configuration template string
    ///
    /// The template mirrors the built-in defaults and loads back as-is.
    pub fn generate_template() -> String {
        let mut template = String::new();
        template.push_str("# Coin switcher configuration\n\n");

        template.push_str("[feed]\n");
        template.push_str("url = \"https://whattomine.com/coins.json\"\n");
        template.push_str("# Only coins reported with this algorithm are considered\n");
        template.push_str("algorithm = \"Ethash\"\n");
        template.push_str("# Must stay below tick_secs * poll_every_ticks\n");
        template.push_str("timeout_secs = 30\n\n");

        template.push_str("[schedule]\n");
        template.push_str("# Miner liveness is checked every tick\n");
        template.push_str("tick_secs = 10\n");
        template.push_str("# The feed is polled every N ticks\n");
        template.push_str("poll_every_ticks = 30\n");
        template.push_str("# A new miner runs at least this many ticks before it may be switched\n");
        template.push_str("min_runtime_ticks = 3\n");
        template.push_str("stop_grace_secs = 30\n");
        template.push_str("relaunch_delay_secs = 1\n");
        template.push_str("stats_interval_secs = 300\n\n");

        template.push_str("[miner]\n");
        template.push_str("executable = \"/usr/local/bin/ethminer\"\n");
        template.push_str("common_args = [\"-R\", \"--display-interval\", \"30\", \"--noeval\"]\n");
        template.push_str("# cuda (-U) or opencl (-G)\n");
        template.push_str("platform = \"cuda\"\n");
        template.push_str("# worker = \"miner0\"\n\n");

        template.push_str("[journal]\n");
        template.push_str("enabled = true\n");
        template.push_str("path = \"whatlog.txt\"\n\n");

        template.push_str("# One table per supported coin, keyed by its name in the feed.\n");
        template.push_str("# {wallet} comes from `wallet` or the `wallet_env` variable.\n");
        template.push_str("[coins.Ethereum]\n");
        template.push_str("pool_fee = 0.01\n");
        template.push_str("exchange_fee = 0.0\n");
        template.push_str(
            "command = \"-P stratum+tls12://{wallet}.{worker}@us1.ethermine.org:5555\"\n",
        );
        template.push_str("wallet_env = \"ETHWALLET\"\n\n");

        template.push_str("[coins.EthereumClassic]\n");
        template.push_str("pool_fee = 0.01\n");
        template.push_str("exchange_fee = 0.0\n");
        template.push_str(
            "command = \"-P stratum+tls12://{wallet}.{worker}@us1-etc.ethermine.org:5555\"\n",
        );
        template.push_str("wallet_env = \"ETCWALLET\"\n");

        template
    }
}

impl FeedConfig {
    /// HTTP request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
