// src/coins/catalog.rs
//! Supported coin catalog
//!
//! Built once at startup from the configuration. Wallet and worker
//! placeholders in each coin's command are resolved here, so a missing
//! wallet is reported before the control loop ever starts.

use crate::config::{CoinConfig, Config};
use crate::utils::error::SwitchError;
use std::collections::BTreeMap;

const WALLET_PLACEHOLDER: &str = "{wallet}";
const WORKER_PLACEHOLDER: &str = "{worker}";

/// A coin this installation is willing to mine
#[derive(Debug, Clone, PartialEq)]
pub struct CoinEntry {
    /// Coin identifier as keyed in the ranking feed
    pub id: String,
    /// Pool fee fraction in [0, 1)
    pub pool_fee: f64,
    /// Exchange fee fraction in [0, 1)
    pub exchange_fee: f64,
    /// Coin-specific miner arguments with all placeholders resolved
    pub launch_args: String,
}

impl CoinEntry {
    /// Fraction of the reported revenue left after pool and exchange fees
    pub fn fee_rate(&self) -> f64 {
        (1.0 - self.pool_fee) * (1.0 - self.exchange_fee)
    }

    /// Net revenue for a raw reported revenue figure
    pub fn net_revenue(&self, raw: f64) -> f64 {
        raw * self.fee_rate()
    }
}

/// Read-only table of supported coins
///
/// Iterates in coin identifier order.
#[derive(Debug, Clone, Default)]
pub struct CoinCatalog {
    coins: BTreeMap<String, CoinEntry>,
}

impl CoinCatalog {
    /// Builds the catalog from entries that are already resolved
    pub fn new(entries: impl IntoIterator<Item = CoinEntry>) -> Self {
        CoinCatalog {
            coins: entries.into_iter().map(|e| (e.id.clone(), e)).collect(),
        }
    }

    /// Builds the catalog from configuration, resolving `{wallet}` and `{worker}`
    ///
    /// # Errors
    /// `ConfigError` when the catalog is empty or a coin uses `{wallet}`
    /// without a literal wallet or a set `wallet_env` variable.
    pub fn from_config(config: &Config) -> Result<Self, SwitchError> {
        if config.coins.is_empty() {
            return Err(SwitchError::ConfigError("No coins configured".into()));
        }

        let worker = config.miner.worker_name();
        let entries = config
            .coins
            .iter()
            .map(|(id, coin)| resolve(id, coin, worker))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(entries))
    }

    /// Looks up a coin by identifier
    pub fn lookup(&self, id: &str) -> Option<&CoinEntry> {
        self.coins.get(id)
    }

    /// Iterates over all coins in identifier order
    pub fn iter(&self) -> impl Iterator<Item = &CoinEntry> {
        self.coins.values()
    }

    /// Number of supported coins
    pub fn len(&self) -> usize {
        self.coins.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }
}

fn resolve(id: &str, coin: &CoinConfig, worker: &str) -> Result<CoinEntry, SwitchError> {
    let mut launch_args = coin.command.replace(WORKER_PLACEHOLDER, worker);

    if launch_args.contains(WALLET_PLACEHOLDER) {
        let wallet = wallet_for(id, coin)?;
        launch_args = launch_args.replace(WALLET_PLACEHOLDER, &wallet);
    }

    Ok(CoinEntry {
        id: id.to_string(),
        pool_fee: coin.pool_fee,
        exchange_fee: coin.exchange_fee,
        launch_args,
    })
}

fn wallet_for(id: &str, coin: &CoinConfig) -> Result<String, SwitchError> {
    if let Some(wallet) = coin.wallet.as_deref().filter(|w| !w.trim().is_empty()) {
        return Ok(wallet.trim().to_string());
    }

    match coin.wallet_env.as_deref() {
        Some(var) => match std::env::var(var) {
            Ok(wallet) if !wallet.trim().is_empty() => Ok(wallet.trim().to_string()),
            _ => Err(SwitchError::ConfigError(format!(
                "Coin '{}' needs a wallet but environment variable {} is not set",
                id, var
            ))),
        },
        None => Err(SwitchError::ConfigError(format!(
            "Coin '{}' uses {} but has neither `wallet` nor `wallet_env`",
            id, WALLET_PLACEHOLDER
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(command: &str, wallet: Option<&str>, wallet_env: Option<&str>) -> CoinConfig {
        CoinConfig {
            pool_fee: 0.01,
            exchange_fee: 0.002,
            command: command.into(),
            wallet: wallet.map(String::from),
            wallet_env: wallet_env.map(String::from),
        }
    }

    fn config_with(coins: Vec<(&str, CoinConfig)>) -> Config {
        Config {
            coins: coins.into_iter().map(|(id, c)| (id.to_string(), c)).collect(),
            ..Config::default()
        }
    }

    #[test]
    fn placeholders_are_resolved() {
        let cfg = config_with(vec![(
            "Ethereum",
            coin("-P stratum://{wallet}.{worker}@pool:5555", Some("0xabc"), None),
        )]);
        let catalog = CoinCatalog::from_config(&cfg).unwrap();
        let eth = catalog.lookup("Ethereum").unwrap();
        assert_eq!(eth.launch_args, "-P stratum://0xabc.miner0@pool:5555");
        assert_eq!(eth.pool_fee, 0.01);
        assert_eq!(eth.exchange_fee, 0.002);
    }

    #[test]
    fn command_without_wallet_needs_no_wallet() {
        let cfg = config_with(vec![("Solo", coin("-P http://127.0.0.1:8545", None, None))]);
        let catalog = CoinCatalog::from_config(&cfg).unwrap();
        assert_eq!(catalog.lookup("Solo").unwrap().launch_args, "-P http://127.0.0.1:8545");
    }

    #[test]
    fn unresolvable_wallet_is_fatal() {
        let cfg = config_with(vec![(
            "Ethereum",
            coin("-P {wallet}@pool", None, Some("COIN_SWITCH_TEST_UNSET_WALLET")),
        )]);
        let err = CoinCatalog::from_config(&cfg).unwrap_err();
        assert!(matches!(err, SwitchError::ConfigError(_)));
        assert!(err.to_string().contains("COIN_SWITCH_TEST_UNSET_WALLET"));

        let cfg = config_with(vec![("Ethereum", coin("-P {wallet}@pool", None, None))]);
        assert!(CoinCatalog::from_config(&cfg).is_err());
    }

    #[test]
    fn wallet_from_environment() {
        // PATH is always present, which is all this needs
        let path = std::env::var("PATH").unwrap();
        let cfg = config_with(vec![("Ethereum", coin("-P {wallet}", None, Some("PATH")))]);
        let catalog = CoinCatalog::from_config(&cfg).unwrap();
        assert_eq!(catalog.lookup("Ethereum").unwrap().launch_args, format!("-P {}", path.trim()));
    }

    #[test]
    fn lookup_and_iteration_order() {
        let catalog = CoinCatalog::new(vec![
            CoinEntry { id: "Zcoin".into(), pool_fee: 0.0, exchange_fee: 0.0, launch_args: "z".into() },
            CoinEntry { id: "Aeon".into(), pool_fee: 0.0, exchange_fee: 0.0, launch_args: "a".into() },
        ]);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.lookup("Bitcoin").is_none());
        let ids: Vec<_> = catalog.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["Aeon", "Zcoin"]);
    }

    #[test]
    fn net_revenue_applies_both_fees() {
        let entry = CoinEntry {
            id: "X".into(),
            pool_fee: 0.1,
            exchange_fee: 0.5,
            launch_args: String::new(),
        };
        assert!((entry.net_revenue(10.0) - 4.5).abs() < 1e-12);
    }
}
