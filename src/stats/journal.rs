// src/stats/journal.rs
//! Append-only switch journal
//!
//! One plain-text record per coin switch, appended to a file and mirrored
//! to stdout.

use crate::coins::CoinRevenue;
use crate::config::JournalConfig;
use crate::utils::error::SwitchError;
use chrono::{DateTime, Local};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Everything written for one switch
#[derive(Debug, Clone)]
pub struct SwitchRecord {
    /// When the switch happened
    pub timestamp: DateTime<Local>,
    /// Coin being switched to
    pub coin: String,
    /// Its net revenue
    pub net_revenue: f64,
    /// Wall-clock time since the previous switch
    pub runtime: Duration,
    /// Net revenue of every supported coin this cycle
    pub candidates: Vec<CoinRevenue>,
    /// Full miner command line
    pub command: String,
}

impl fmt::Display for SwitchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for candidate in &self.candidates {
            writeln!(f, "{:<20} {}", candidate.id, candidate.net_revenue)?;
        }
        writeln!(f, "Runtime: {} minutes", self.runtime.as_secs() as f64 / 60.0)?;
        writeln!(f, "===")?;
        writeln!(
            f,
            "Switching to: {}, {}, {}",
            self.coin,
            self.net_revenue,
            self.timestamp.format("%a %b %e %H:%M:%S %Y")
        )?;
        writeln!(f, "Command: {}", self.command)
    }
}

/// Destination of switch records
#[derive(Debug, Clone)]
pub struct SwitchJournal {
    /// Journal file, `None` for stdout only
    path: Option<PathBuf>,
}

impl SwitchJournal {
    /// Creates a journal appending to `path`
    pub fn new(path: Option<PathBuf>) -> Self {
        SwitchJournal { path }
    }

    /// Creates a journal from configuration
    pub fn from_config(config: &JournalConfig) -> Self {
        Self::new(config.enabled.then(|| config.path.clone()))
    }

    /// Journal file location, if any
    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    /// Prints the record and appends it to the journal file
    ///
    /// # Errors
    /// `IoError` if the journal file can't be opened or written. The record
    /// has already been printed to stdout by then.
    pub fn append(&self, record: &SwitchRecord) -> Result<(), SwitchError> {
        let text = record.to_string();
        print!("{}", text);
        let _ = std::io::stdout().flush();

        if let Some(path) = &self.path {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            file.write_all(text.as_bytes())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(coin: &str) -> SwitchRecord {
        SwitchRecord {
            timestamp: Local.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap(),
            coin: coin.into(),
            net_revenue: 72.0,
            runtime: Duration::from_secs(90),
            candidates: vec![
                CoinRevenue { id: "CoinA".into(), net_revenue: 50.0 },
                CoinRevenue { id: "CoinB".into(), net_revenue: 72.0 },
            ],
            command: "/usr/local/bin/ethminer -U -P pool".into(),
        }
    }

    #[test]
    fn record_layout() {
        let text = record("CoinB").to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "CoinA                50",
                "CoinB                72",
                "Runtime: 1.5 minutes",
                "===",
                "Switching to: CoinB, 72, Thu Mar  4 05:06:07 2021",
                "Command: /usr/local/bin/ethminer -U -P pool",
            ]
        );
    }

    #[test]
    fn appends_to_file() {
        let path = std::env::temp_dir().join(format!(
            "coin-switch-journal-{}.txt",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let journal = SwitchJournal::new(Some(path.clone()));
        journal.append(&record("CoinA")).unwrap();
        journal.append(&record("CoinB")).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Switching to: CoinA"));
        assert!(contents.contains("Switching to: CoinB"));
        assert_eq!(contents.matches("===").count(), 2);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn disabled_journal_has_no_file() {
        let journal = SwitchJournal::from_config(&JournalConfig {
            enabled: false,
            ..JournalConfig::default()
        });
        assert!(journal.path().is_none());
        journal.append(&record("CoinA")).unwrap();
    }
}
