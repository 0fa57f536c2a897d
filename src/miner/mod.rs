// src/miner/mod.rs
//! Miner orchestration
//!
//! This module contains everything around the external miner process:
//! - Command line construction per coin
//! - Child process supervision (start, liveness, stop)
//! - The poll/decide/supervise control loop

/// Miner command line construction
pub mod launch;

/// Coin switching control loop
///
/// Polls the ranking feed on a slow cadence, checks the miner every tick,
/// and swaps the miner when a more profitable coin shows up.
pub mod scheduler;

/// Child process supervisor
///
/// Owns the single miner process and hides the spawn and signal primitives
/// behind [`MinerControl`].
pub mod supervisor;

// Re-export main components for cleaner imports
pub use self::launch::{LaunchCommand, LaunchTemplate};
pub use self::scheduler::{Cadence, SchedulerLoop, TickOutcome, TickReport};
pub use self::supervisor::{MinerControl, ProcessSupervisor};
