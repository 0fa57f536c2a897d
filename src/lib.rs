//! Coin switcher - profitability-driven miner supervisor
//!
//! This crate periodically polls a profitability ranking feed, picks the
//! most profitable coin among the ones this installation supports, and
//! keeps an external miner process mining that coin:
//! - Coin catalog with pool and exchange fees
//! - Ranking feed client
//! - Miner process supervision with graceful handoff
//! - Switch journal and runtime statistics

#![warn(missing_docs)]
#![deny(unsafe_code)]

/// Supported coin catalog and profitability selection
pub mod coins;

/// Miner process supervision and the switching control loop
pub mod miner;

/// Ranking feed client
pub mod network;

/// Switch journal and statistics reporting
pub mod stats;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use cli::Commands;
pub use coins::{CoinCatalog, CoinEntry, SelectionResult, select};
pub use config::Config;
pub use miner::{LaunchTemplate, MinerControl, ProcessSupervisor, SchedulerLoop};
pub use network::{FeedClient, RankingSource};
pub use stats::{StatsReporter, SwitchJournal};
pub use types::{GpuPlatform, RankedCoin};
pub use utils::{SwitchError, init_logging};
