// src/coins/selector.rs
//! Coin selection
//!
//! Cross-references the ranked feed against the catalog and picks the coin
//! with the highest net revenue. Pure and deterministic.

use crate::coins::catalog::CoinCatalog;
use crate::types::RankedCoin;

/// Net revenue of one supported coin in the current feed
#[derive(Debug, Clone, PartialEq)]
pub struct CoinRevenue {
    /// Coin identifier
    pub id: String,
    /// Revenue after pool and exchange fees
    pub net_revenue: f64,
}

/// Outcome of one selection cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionResult {
    /// Most profitable supported coin, `None` when no supported coin qualifies
    pub best: Option<String>,
    /// Net revenue of `best`, zero when absent
    pub net_revenue: f64,
    /// Every supported coin seen in the feed, in feed order
    pub candidates: Vec<CoinRevenue>,
}

/// Picks the supported coin with the strictly greatest net revenue
///
/// Ties keep the coin that appears first in `ranked` (feed order). Coins
/// absent from `catalog` are ignored, and a coin must earn more than zero
/// to be selected.
pub fn select(ranked: &[RankedCoin], catalog: &CoinCatalog) -> SelectionResult {
    let mut result = SelectionResult::default();

    for coin in ranked {
        let Some(entry) = catalog.lookup(&coin.id) else {
            continue;
        };

        let net_revenue = entry.net_revenue(coin.btc_revenue);
        log::debug!("{:<20} {}", coin.id, net_revenue);

        if net_revenue > result.net_revenue {
            result.net_revenue = net_revenue;
            result.best = Some(coin.id.clone());
        }
        result.candidates.push(CoinRevenue {
            id: coin.id.clone(),
            net_revenue,
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coins::catalog::CoinEntry;

    fn entry(id: &str, pool_fee: f64, exchange_fee: f64) -> CoinEntry {
        CoinEntry {
            id: id.into(),
            pool_fee,
            exchange_fee,
            launch_args: format!("-P {}", id),
        }
    }

    fn ethash(id: &str, revenue: f64) -> RankedCoin {
        RankedCoin::new(id, "Ethash", revenue)
    }

    #[test]
    fn net_revenue_formula_is_exact() {
        let catalog = CoinCatalog::new(vec![entry("Ethereum", 0.01, 0.0)]);
        let result = select(&[ethash("Ethereum", 100.0)], &catalog);
        assert_eq!(result.best.as_deref(), Some("Ethereum"));
        assert_eq!(result.net_revenue, 99.0);
    }

    #[test]
    fn picks_highest_net_revenue_after_fees() {
        let catalog = CoinCatalog::new(vec![entry("CoinA", 0.0, 0.0), entry("CoinB", 0.1, 0.0)]);
        let ranked = [ethash("CoinA", 50.0), ethash("CoinB", 80.0)];

        let result = select(&ranked, &catalog);
        assert_eq!(result.best.as_deref(), Some("CoinB"));
        assert_eq!(result.net_revenue, 72.0);
        assert_eq!(
            result.candidates,
            vec![
                CoinRevenue { id: "CoinA".into(), net_revenue: 50.0 },
                CoinRevenue { id: "CoinB".into(), net_revenue: 72.0 },
            ]
        );
    }

    #[test]
    fn unsupported_coins_never_win() {
        let catalog = CoinCatalog::new(vec![entry("Ethereum", 0.01, 0.0)]);
        let ranked = [ethash("Expanse", 1000.0), ethash("Ubiq", 500.0)];

        let result = select(&ranked, &catalog);
        assert_eq!(result, SelectionResult::default());
        assert_eq!(result.net_revenue, 0.0);
    }

    #[test]
    fn unsupported_coin_does_not_shadow_supported_one() {
        let catalog = CoinCatalog::new(vec![entry("Ethereum", 0.0, 0.0)]);
        let ranked = [ethash("Expanse", 1000.0), ethash("Ethereum", 1.0)];
        assert_eq!(select(&ranked, &catalog).best.as_deref(), Some("Ethereum"));
    }

    #[test]
    fn ties_keep_first_in_feed_order() {
        let catalog = CoinCatalog::new(vec![entry("Alpha", 0.0, 0.0), entry("Beta", 0.0, 0.0)]);

        let result = select(&[ethash("Beta", 10.0), ethash("Alpha", 10.0)], &catalog);
        assert_eq!(result.best.as_deref(), Some("Beta"));

        let result = select(&[ethash("Alpha", 10.0), ethash("Beta", 10.0)], &catalog);
        assert_eq!(result.best.as_deref(), Some("Alpha"));
    }

    #[test]
    fn selection_is_deterministic_and_catalog_order_free() {
        let ranked = [ethash("A", 3.0), ethash("B", 7.0), ethash("C", 5.0)];
        let forward = CoinCatalog::new(vec![entry("A", 0.0, 0.0), entry("B", 0.0, 0.0), entry("C", 0.0, 0.0)]);
        let backward = CoinCatalog::new(vec![entry("C", 0.0, 0.0), entry("B", 0.0, 0.0), entry("A", 0.0, 0.0)]);

        let first = select(&ranked, &forward);
        assert_eq!(first, select(&ranked, &forward));
        assert_eq!(first, select(&ranked, &backward));
        assert_eq!(first.best.as_deref(), Some("B"));
    }

    #[test]
    fn zero_revenue_coin_is_not_selected() {
        let catalog = CoinCatalog::new(vec![entry("Ethereum", 0.0, 0.0)]);
        let result = select(&[ethash("Ethereum", 0.0)], &catalog);
        assert!(result.best.is_none());
        assert_eq!(result.candidates.len(), 1);
    }
}
