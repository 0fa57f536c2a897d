// src/miner/scheduler.rs
//! Coin switching control loop
//!
//! One sequential loop with two cadences measured in ticks: the miner's
//! liveness is checked every tick, and every `poll_every_ticks` ticks the
//! feed is polled and the best coin selected. A better coin stops the
//! running miner and launches a new one.

use crate::coins::{CoinCatalog, SelectionResult, select};
use crate::miner::launch::LaunchTemplate;
use crate::miner::supervisor::MinerControl;
use crate::network::RankingSource;
use crate::stats::{ActiveMiner, SwitchEvent, SwitchJournal, SwitchRecord};
use crate::utils::error::SwitchError;
use chrono::Local;
use crossbeam_channel::Sender;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

/// Counts ticks down to the next slow-cadence firing
#[derive(Debug, Clone)]
pub struct Cadence {
    every: u32,
    remaining: u32,
}

impl Cadence {
    /// Fires on the first tick and then every `every` ticks
    pub fn new(every: u32) -> Self {
        Cadence {
            every: every.max(1),
            remaining: 0,
        }
    }

    /// Advances one tick, returning whether the cadence fires on it
    pub fn fire(&mut self) -> bool {
        if self.remaining == 0 {
            self.remaining = self.every - 1;
            true
        } else {
            self.remaining -= 1;
            false
        }
    }

    /// Makes the current tick fire
    pub fn rearm(&mut self) {
        self.remaining = 0;
    }
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Not a polling tick
    Waiting,
    /// The feed could not be fetched; nothing changed
    FetchFailed,
    /// Polled, but no switch was warranted
    NoChange,
    /// A better coin was found but the running miner is inside its minimum runtime
    Deferred {
        /// Coin that would have been switched to
        coin: String,
    },
    /// The miner was (re)launched for `coin`
    Switched {
        /// New coin
        coin: String,
        /// Its net revenue
        net_revenue: f64,
    },
}

/// Result of [`SchedulerLoop::tick`]
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// The committed miner was found to have exited on its own this tick
    pub miner_exited: bool,
    /// What the rest of the tick did
    pub outcome: TickOutcome,
}

/// The last switch that was carried out
#[derive(Debug, Clone)]
struct Commitment {
    coin: Option<String>,
    net_revenue: f64,
    switched_at: Instant,
}

/// Poll/decide/supervise loop
///
/// Owns all mutable state of the switcher: the committed coin and revenue,
/// the cadence counter and the miner supervisor.
pub struct SchedulerLoop<F, M> {
    feed: F,
    miner: M,
    catalog: CoinCatalog,
    launcher: LaunchTemplate,
    journal: SwitchJournal,
    events: Option<Sender<SwitchEvent>>,
    tick_interval: Duration,
    cadence: Cadence,
    committed: Commitment,
}

impl<F: RankingSource, M: MinerControl> SchedulerLoop<F, M> {
    /// Creates a new SchedulerLoop
    ///
    /// # Arguments
    /// * `feed` - Ranking source polled on the slow cadence
    /// * `miner` - Supervisor of the child miner process
    /// * `catalog` - Supported coins
    /// * `launcher` - Builds miner command lines
    /// * `journal` - Receives one record per switch
    /// * `tick` - Base tick interval
    /// * `poll_every_ticks` - Slow cadence, in ticks
    pub fn new(
        feed: F,
        miner: M,
        catalog: CoinCatalog,
        launcher: LaunchTemplate,
        journal: SwitchJournal,
        tick: Duration,
        poll_every_ticks: u32,
    ) -> Self {
        SchedulerLoop {
            feed,
            miner,
            catalog,
            launcher,
            journal,
            events: None,
            tick_interval: tick,
            cadence: Cadence::new(poll_every_ticks),
            committed: Commitment {
                coin: None,
                net_revenue: 0.0,
                switched_at: Instant::now(),
            },
        }
    }

    /// Reports switch events to a statistics listener
    pub fn with_events(mut self, events: Sender<SwitchEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Coin of the last committed switch, if any
    pub fn committed_coin(&self) -> Option<&str> {
        self.committed.coin.as_deref()
    }

    /// Net revenue of the last committed switch (0 after a reset)
    pub fn committed_revenue(&self) -> f64 {
        self.committed.net_revenue
    }

    /// The supervised miner
    pub fn miner(&self) -> &M {
        &self.miner
    }

    /// Runs until SIGINT or SIGTERM, then stops the miner
    pub async fn run(mut self) -> Result<(), SwitchError> {
        self.run_until(shutdown_signal()).await
    }

    /// Ticks until `shutdown` resolves, then stops the miner
    ///
    /// Recoverable errors never end the loop; only a failure to stop the
    /// miner on shutdown is returned.
    pub async fn run_until(
        &mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), SwitchError> {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        log::info!(
            "Entering switch loop: tick {:?}, feed polled every {} ticks, {} supported coins",
            self.tick_interval,
            self.cadence.every,
            self.catalog.len()
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let report = self.tick().await;
                    log::debug!("Tick: {:?}", report);
                }
                _ = &mut shutdown => {
                    log::info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.miner.stop().await?;
        self.emit(SwitchEvent::Stopped);
        log::info!("Miner stopped, exiting");
        Ok(())
    }

    /// Performs one tick of work
    pub async fn tick(&mut self) -> TickReport {
        let miner_exited = self.check_miner();

        let outcome = if self.cadence.fire() {
            self.poll_and_switch().await
        } else {
            TickOutcome::Waiting
        };

        TickReport {
            miner_exited,
            outcome,
        }
    }

    /// Fast cadence: detects a miner that exited on its own
    ///
    /// Forgets the committed coin and revenue so any profitable coin counts
    /// as an improvement, and makes this tick poll the feed right away.
    fn check_miner(&mut self) -> bool {
        if self.committed.coin.is_none() || self.miner.is_alive() {
            return false;
        }

        log::warn!(
            "Miner for {} terminated on its own, relaunching",
            self.committed.coin.as_deref().unwrap_or("?")
        );
        self.committed.coin = None;
        self.committed.net_revenue = 0.0;
        self.cadence.rearm();
        self.emit(SwitchEvent::MinerExited);
        true
    }

    /// Slow cadence: fetch, select and switch if warranted
    async fn poll_and_switch(&mut self) -> TickOutcome {
        let ranked = match self.feed.fetch().await {
            Ok(ranked) => ranked,
            Err(e) => {
                log::warn!("Skipping this cycle, feed unavailable: {}", e);
                self.emit(SwitchEvent::FetchFailed);
                return TickOutcome::FetchFailed;
            }
        };

        let selection = select(&ranked, &self.catalog);
        let Some(coin) = self.switch_target(&selection) else {
            return TickOutcome::NoChange;
        };

        if self.miner.cooldown_active() {
            log::info!(
                "{} pays more but {} is inside its minimum runtime, deferring",
                coin,
                self.miner.current_coin().unwrap_or("?")
            );
            return TickOutcome::Deferred { coin };
        }

        self.switch_to(coin, selection).await
    }

    /// Coin to switch to, if the selection warrants a switch
    ///
    /// Requires a different coin and a different net revenue (exact comparison).
    fn switch_target(&self, selection: &SelectionResult) -> Option<String> {
        let best = selection.best.as_deref()?;
        if Some(best) == self.committed.coin.as_deref() {
            return None;
        }
        if selection.net_revenue == self.committed.net_revenue {
            return None;
        }
        Some(best.to_string())
    }

    async fn switch_to(&mut self, coin: String, selection: SelectionResult) -> TickOutcome {
        if let Err(e) = self.miner.stop().await {
            log::error!("Failed to stop the current miner: {}", e);
        }

        let now = Instant::now();
        let runtime = now.duration_since(self.committed.switched_at);
        let net_revenue = selection.net_revenue;

        // The catalog lookup cannot fail: the selector only returns catalog coins
        let coin_args = self
            .catalog
            .lookup(&coin)
            .map(|entry| entry.launch_args.as_str())
            .unwrap_or_default();
        let command = self.launcher.command_for(coin_args);

        let record = SwitchRecord {
            timestamp: Local::now(),
            coin: coin.clone(),
            net_revenue,
            runtime,
            candidates: selection.candidates,
            command: command.to_string(),
        };
        if let Err(e) = self.journal.append(&record) {
            log::error!("Failed to write switch journal: {}", e);
        }

        if let Err(e) = self.miner.start(&command, &coin) {
            log::error!("Miner launch for {} failed: {}", coin, e);
        }

        self.committed = Commitment {
            coin: Some(coin.clone()),
            net_revenue,
            switched_at: now,
        };
        self.emit(SwitchEvent::Switched(ActiveMiner {
            coin: coin.clone(),
            pid: self.miner.pid(),
            net_revenue,
        }));

        TickOutcome::Switched { coin, net_revenue }
    }

    fn emit(&self, event: SwitchEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

/// Resolves on Ctrl+C, or SIGTERM from an init system
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                log::warn!("Cannot listen for SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
