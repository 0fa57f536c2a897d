// src/main.rs
use clap::Parser;
use coin_switch_rs::miner::{LaunchTemplate, ProcessSupervisor, SchedulerLoop};
use coin_switch_rs::network::{FeedClient, RankingSource};
use coin_switch_rs::stats::{StatsReporter, SwitchJournal};
use coin_switch_rs::utils::{init_logging, init_verbose_logging};
use coin_switch_rs::{self, *};
use std::time::Duration;
use tokio::runtime::Runtime;

/// Main entry point for the coin switcher
///
/// # Returns
/// - `Ok(())` on clean shutdown
/// - `Err(SwitchError)` on a fatal startup error, which exits non-zero
fn main() -> Result<(), SwitchError> {
    let cli = cli::Commands::parse();

    match cli.action {
        cli::Action::Run(opts) => run_switcher(opts),
        cli::Action::Rank(opts) => rank_once(opts),
        cli::Action::Config(opts) => generate_config(opts),
    }
}

/// Runs the switcher until SIGINT or SIGTERM
///
/// # Operations
/// 1. Initializes logging
/// 2. Loads and validates configuration, builds the coin catalog
/// 3. Sets up the switch journal and statistics reporting
/// 4. Enters the poll/decide/supervise loop
fn run_switcher(opts: cli::RunOptions) -> Result<(), SwitchError> {
    if opts.verbose {
        init_verbose_logging();
    } else {
        init_logging();
    }

    let mut config = config::load(opts.config.as_deref())?;
    // Apply CLI overrides
    if let Some(platform) = opts.platform {
        config.miner.platform = platform;
    }
    if let Some(tick_secs) = opts.tick_secs {
        config.schedule.tick_secs = tick_secs;
        config.validate()?;
    }

    let catalog = CoinCatalog::from_config(&config)?;
    log::info!(
        "Supported coins: {}",
        catalog.iter().map(|c| c.id.as_str()).collect::<Vec<_>>().join(", ")
    );

    // Statistics reporting
    let reporter = StatsReporter::new(Duration::from_secs(config.schedule.stats_interval_secs));
    let events = reporter.event_sender();
    reporter.start_reporting();

    let feed = FeedClient::new(config.feed.clone())?;
    let supervisor = ProcessSupervisor::from_schedule(&config.schedule);
    let launcher = LaunchTemplate::new(&config.miner, opts.miner_args);
    let journal = SwitchJournal::from_config(&config.journal);

    let scheduler = SchedulerLoop::new(
        feed,
        supervisor,
        catalog,
        launcher,
        journal,
        config.schedule.tick(),
        config.schedule.poll_every_ticks,
    )
    .with_events(events);

    let rt = Runtime::new()?;
    rt.block_on(scheduler.run())
}

/// Fetches the ranking once and prints every supported coin's net revenue
fn rank_once(opts: cli::RankOptions) -> Result<(), SwitchError> {
    init_logging();

    let config = config::load(opts.config.as_deref())?;
    let catalog = CoinCatalog::from_config(&config)?;
    let feed = FeedClient::new(config.feed.clone())?;

    let rt = Runtime::new()?;
    let ranked = rt.block_on(feed.fetch())?;
    let selection = select(&ranked, &catalog);

    for candidate in &selection.candidates {
        println!("{:<20} {}", candidate.id, candidate.net_revenue);
    }
    match selection.best {
        Some(best) => println!("Best: {}, {}", best, selection.net_revenue),
        None => println!(
            "No supported {} coin in {}",
            config.feed.algorithm,
            feed.url()
        ),
    }
    Ok(())
}

/// Writes the configuration template to the requested file
fn generate_config(opts: cli::ConfigOptions) -> Result<(), SwitchError> {
    let template = config::generate_template();
    std::fs::write(&opts.output, template)?;
    println!("Configuration template written to {}", opts.output.display());
    Ok(())
}
