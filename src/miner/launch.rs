// src/miner/launch.rs
//! Miner command line construction
//!
//! The argument vector is always
//! `[executable, common args.., platform flag, coin args.., pass-through args..]`.

use crate::config::MinerConfig;
use crate::types::GpuPlatform;
use std::fmt;
use std::path::PathBuf;

/// The parts of the miner command line shared by every coin
#[derive(Debug, Clone)]
pub struct LaunchTemplate {
    /// Miner binary
    executable: PathBuf,
    /// Fixed arguments placed right after the executable
    common_args: Vec<String>,
    /// GPU platform flag source
    platform: GpuPlatform,
    /// Extra arguments given to the switcher itself, appended last
    passthrough: Vec<String>,
}

impl LaunchTemplate {
    /// Builds the template from miner settings plus pass-through arguments
    pub fn new(config: &MinerConfig, passthrough: Vec<String>) -> Self {
        LaunchTemplate {
            executable: config.executable.clone(),
            common_args: config.common_args.clone(),
            platform: config.platform,
            passthrough,
        }
    }

    /// Full command line for one coin
    ///
    /// `coin_args` is split on whitespace, the same way the coin's
    /// `command` string is written in the configuration.
    pub fn command_for(&self, coin_args: &str) -> LaunchCommand {
        let mut args = self.common_args.clone();
        args.push(self.platform.flag().to_string());
        args.extend(coin_args.split_whitespace().map(String::from));
        args.extend(self.passthrough.iter().cloned());

        LaunchCommand {
            program: self.executable.clone(),
            args,
        }
    }
}

/// A fully built miner invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    /// Executable to run
    pub program: PathBuf,
    /// Arguments after the executable
    pub args: Vec<String>,
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
