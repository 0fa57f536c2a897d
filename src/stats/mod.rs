//! Statistics and switch history
//!
//! This module provides:
//! - The append-only switch journal (one record per coin switch)
//! - Runtime counters (switches, miner self-exits, failed polls)
//! - Periodic reporting of the miner process's resource usage
//!
//! The main components are [`SwitchJournal`] and [`StatsReporter`].

/// Switch journal written on every coin switch
pub mod journal;

/// Submodule containing the statistics reporter implementation
///
/// The reporter handles:
/// - Atomic collection of switch statistics
/// - Miner process monitoring
/// - Periodic reporting of stats
/// - A channel for receiving events from the scheduler
pub mod reporter;

// Re-export main components
pub use journal::{SwitchJournal, SwitchRecord};
pub use reporter::{ActiveMiner, ProcessStats, StatsReporter, SwitchEvent, SwitchStats};
