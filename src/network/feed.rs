// src/network/feed.rs

//! Profitability ranking feed
//!
//! Retrieves a whattomine-style `coins.json` document and flattens it into
//! [`RankedCoin`]s for the configured algorithm. The document is nested as
//! `{ family -> { coin -> { "algorithm": .., "btc_revenue": .., .. } } }`.
use crate::config::FeedConfig;
use crate::types::RankedCoin;
use crate::utils::error::SwitchError;
use reqwest::Client;
use serde_json::Value;
use std::future::Future;

/// Source of ranked coins for the scheduler
///
/// Any failure comes back as `NetworkError` or `ParseError`, never as a
/// partial list.
pub trait RankingSource {
    /// Fetches the current ranking
    fn fetch(&self) -> impl Future<Output = Result<Vec<RankedCoin>, SwitchError>> + Send;
}

/// HTTP client for the ranking feed
pub struct FeedClient {
    /// Feed location, algorithm filter and timeout
    config: FeedConfig,
    /// HTTP client with the request timeout applied
    client: Client,
}

impl FeedClient {
    /// Creates a new FeedClient
    ///
    /// # Errors
    /// Returns `SwitchError::HttpError` if the HTTP client can't be built
    pub fn new(config: FeedConfig) -> Result<Self, SwitchError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(format!("coin_switch-rs/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(FeedClient { config, client })
    }

    /// Feed URL this client polls
    pub fn url(&self) -> &str {
        &self.config.url
    }

    async fn download(&self) -> Result<String, SwitchError> {
        let response = self
            .client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| SwitchError::NetworkError(format!("{}: {}", self.config.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SwitchError::NetworkError(format!(
                "{} answered {}",
                self.config.url, status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| SwitchError::NetworkError(format!("Reading feed body failed: {}", e)))
    }
}

impl RankingSource for FeedClient {
    async fn fetch(&self) -> Result<Vec<RankedCoin>, SwitchError> {
        let body = self.download().await?;
        let ranked = parse_feed(&body, &self.config.algorithm)?;
        log::debug!(
            "Feed returned {} {} coins",
            ranked.len(),
            self.config.algorithm
        );
        Ok(ranked)
    }
}

/// Flattens a ranking document, keeping coins whose algorithm matches
///
/// Coins keep document order. The algorithm comparison ignores ASCII case.
/// A missing, non-numeric, negative or non-finite `btc_revenue` counts as
/// zero for that coin only.
///
/// # Errors
/// `ParseError` if the body is not JSON, its root is not an object, or no
/// algorithm family inside it is an object.
pub fn parse_feed(body: &str, algorithm: &str) -> Result<Vec<RankedCoin>, SwitchError> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| SwitchError::ParseError(format!("Feed is not valid JSON: {}", e)))?;
    let families = root
        .as_object()
        .ok_or_else(|| SwitchError::ParseError("Feed root is not an object".to_string()))?;

    let mut ranked = Vec::new();
    let mut saw_family = false;

    for (family, coins) in families {
        let Some(coins) = coins.as_object() else {
            log::debug!("Skipping non-object feed member '{}'", family);
            continue;
        };
        saw_family = true;

        for (id, details) in coins {
            let Some(tag) = details.get("algorithm").and_then(Value::as_str) else {
                continue;
            };
            if !tag.eq_ignore_ascii_case(algorithm) {
                continue;
            }

            ranked.push(RankedCoin::new(
                id.as_str(),
                tag,
                parse_revenue(details.get("btc_revenue")),
            ));
        }
    }

    if !saw_family {
        return Err(SwitchError::ParseError(
            "Feed contains no coin families".to_string(),
        ));
    }

    Ok(ranked)
}

fn parse_revenue(value: Option<&Value>) -> f64 {
    let revenue = match value {
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    };

    revenue.filter(|r| r.is_finite() && *r >= 0.0).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use std::time::Duration;
    use tokio::net::TcpListener;

    const FEED: &str = r#"{
        "coins": {
            "Ethereum": {"id": 151, "tag": "ETH", "algorithm": "Ethash", "btc_revenue": "0.00021"},
            "Ravencoin": {"id": 234, "tag": "RVN", "algorithm": "KawPow", "btc_revenue": "0.00030"},
            "EthereumClassic": {"id": 162, "tag": "ETC", "algorithm": "Ethash", "btc_revenue": "0.00019"},
            "Nicehash-Ethash": {"id": 1, "tag": "NICEHASH", "algorithm": "Ethash", "btc_revenue": 0.00025}
        }
    }"#;

    #[test]
    fn flattens_and_filters_by_algorithm() {
        let ranked = parse_feed(FEED, "Ethash").unwrap();
        let ids: Vec<_> = ranked.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["Ethereum", "EthereumClassic", "Nicehash-Ethash"]);
        assert_eq!(ranked[0].btc_revenue, 0.00021);
        assert_eq!(ranked[2].btc_revenue, 0.00025);
        assert!(ranked.iter().all(|c| c.algorithm == "Ethash"));
    }

    #[test]
    fn algorithm_match_ignores_case() {
        let ranked = parse_feed(FEED, "kawpow").unwrap();
        assert_eq!(ranked, vec![RankedCoin::new("Ravencoin", "KawPow", 0.0003)]);
    }

    #[test]
    fn bad_revenue_counts_as_zero() {
        let body = r#"{"coins": {
            "A": {"algorithm": "Ethash"},
            "B": {"algorithm": "Ethash", "btc_revenue": "n/a"},
            "C": {"algorithm": "Ethash", "btc_revenue": "-3"},
            "D": {"algorithm": "Ethash", "btc_revenue": " 1.5 "}
        }}"#;
        let revenues: Vec<_> = parse_feed(body, "Ethash")
            .unwrap()
            .into_iter()
            .map(|c| c.btc_revenue)
            .collect();
        assert_eq!(revenues, [0.0, 0.0, 0.0, 1.5]);
    }

    #[test]
    fn entries_without_algorithm_are_skipped() {
        let body = r#"{"coins": {"A": {"btc_revenue": "1"}, "B": "oops", "C": {"algorithm": "Ethash"}}}"#;
        let ranked = parse_feed(body, "Ethash").unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, "C");
    }

    #[test]
    fn structurally_invalid_documents_are_errors() {
        for body in ["<html>502</html>", "[1, 2, 3]", r#"{"errors": ["rate limited"]}"#] {
            let err = parse_feed(body, "Ethash").unwrap_err();
            assert!(matches!(err, SwitchError::ParseError(_)), "{body}: {err}");
        }
    }

    #[test]
    fn empty_family_is_not_an_error() {
        assert!(parse_feed(r#"{"coins": {}}"#, "Ethash").unwrap().is_empty());
    }

    /// Serves a single canned HTTP response and returns the feed URL
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        format!("http://{}/coins.json", addr)
    }

    fn client_for(url: String) -> FeedClient {
        FeedClient::new(FeedConfig {
            url,
            algorithm: "Ethash".into(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn fetches_over_http() {
        let url = serve_once("200 OK", FEED).await;
        let ranked = client_for(url).fetch().await.unwrap();
        assert_eq!(ranked.len(), 3);
    }

    #[tokio::test]
    async fn non_success_status_is_network_error() {
        let url = serve_once("503 Service Unavailable", "{}").await;
        let err = client_for(url).fetch().await.unwrap_err();
        assert!(matches!(err, SwitchError::NetworkError(_)));
        assert!(err.is_fetch_failure());
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept, then never answer
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = FeedClient::new(FeedConfig {
            url: format!("http://{}/coins.json", addr),
            algorithm: "Ethash".into(),
            timeout_secs: 1,
        })
        .unwrap();

        let started = std::time::Instant::now();
        let err = client.fetch().await.unwrap_err();
        assert!(matches!(err, SwitchError::NetworkError(_)), "{err}");
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        // Bind then drop to get a port nobody listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let err = client_for(format!("http://127.0.0.1:{}/coins.json", port))
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, SwitchError::NetworkError(_)));
    }
}
