// src/cli/commands.rs
use crate::types::GpuPlatform;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Coin switcher - mines whichever supported coin currently pays best
#[derive(Parser, Debug)]
#[command(name = "coin-switch")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// The action to perform (run the switcher, rank coins once, or generate config)
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands for the switcher
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Supervise the miner, switching coins as profitability changes
    Run(RunOptions),

    /// Fetch the ranking once and print the net revenue of every supported coin
    Rank(RankOptions),

    /// Generate configuration file template
    Config(ConfigOptions),
}

/// Options for running the switcher
#[derive(Parser, Debug)]
pub struct RunOptions {
    /// Path to configuration file (built-in coin catalog if omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// GPU platform (overrides config)
    #[arg(short, long)]
    pub platform: Option<GpuPlatform>,

    /// Base tick in seconds (overrides config)
    #[arg(short, long)]
    pub tick_secs: Option<u64>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Extra arguments passed to the miner verbatim (after `--`)
    #[arg(last = true)]
    pub miner_args: Vec<String>,
}

/// Options for a one-shot ranking
#[derive(Parser, Debug)]
pub struct RankOptions {
    /// Path to configuration file (built-in coin catalog if omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Options for generating configuration files
#[derive(Parser, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = "coin-switch.toml")]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_accepts_passthrough_args() {
        let cli = Commands::try_parse_from([
            "coin-switch",
            "run",
            "-c",
            "rig.toml",
            "--platform",
            "opencl",
            "--",
            "--opencl-devices",
            "0",
        ])
        .unwrap();

        let Action::Run(opts) = cli.action else {
            panic!("expected run");
        };
        assert_eq!(opts.config, Some(PathBuf::from("rig.toml")));
        assert_eq!(opts.platform, Some(GpuPlatform::OpenCl));
        assert_eq!(opts.miner_args, ["--opencl-devices", "0"]);
    }

    #[test]
    fn config_has_default_output() {
        let cli = Commands::try_parse_from(["coin-switch", "config"]).unwrap();
        let Action::Config(opts) = cli.action else {
            panic!("expected config");
        };
        assert_eq!(opts.output, PathBuf::from("coin-switch.toml"));
    }
}
