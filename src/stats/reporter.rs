// src/stats/reporter.rs
use arc_swap::ArcSwap;
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use sysinfo::{Components, Pid, ProcessesToUpdate, System};

/// Counters describing the switcher's behaviour so far
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SwitchStats {
    /// Number of coin switches (miner launches)
    pub switches: u64,
    /// Number of times the miner exited on its own
    pub self_exits: u64,
    /// Number of feed polls that failed
    pub fetch_failures: u64,
    /// Time since the reporter was created
    pub uptime: Duration,
}

/// Resource usage of the running miner process
#[derive(Debug, Clone)]
pub struct ProcessStats {
    /// CPU usage of the miner process in percent (may exceed 100 on multi-core)
    pub cpu_usage: f32,
    /// Resident memory of the miner process in bytes
    pub memory_used: u64,
    /// Hottest hardware component in Celsius, 0 if unknown
    pub temperature: f32,
}

/// The miner currently believed to be running
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveMiner {
    /// Coin being mined
    pub coin: String,
    /// Miner process id
    pub pid: Option<u32>,
    /// Net revenue at the time of the switch
    pub net_revenue: f64,
}

/// Events the scheduler reports
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchEvent {
    /// A miner was launched for a new coin
    Switched(ActiveMiner),
    /// The miner exited without being asked to
    MinerExited,
    /// A feed poll failed
    FetchFailed,
    /// The miner was stopped on shutdown
    Stopped,
}

/// Collects switch statistics and periodically logs them
///
/// Purely observational: nothing it computes feeds back into decisions.
pub struct StatsReporter {
    /// Atomic counters
    stats: Arc<SwitchStatsAtomic>,
    /// Miner currently running, if any
    active: Arc<ArcSwap<Option<ActiveMiner>>>,
    /// Process information collector
    system: System,
    /// Hardware component information collector
    components: Components,
    /// Interval at which stats are reported
    report_interval: Duration,
}

/// Atomic version of SwitchStats for thread-safe updates
struct SwitchStatsAtomic {
    switches: AtomicU64,
    self_exits: AtomicU64,
    fetch_failures: AtomicU64,
    start_time: Instant,
}

impl StatsReporter {
    /// Creates a new StatsReporter with the specified reporting interval
    pub fn new(report_interval: Duration) -> Self {
        StatsReporter {
            stats: Arc::new(SwitchStatsAtomic {
                switches: AtomicU64::new(0),
                self_exits: AtomicU64::new(0),
                fetch_failures: AtomicU64::new(0),
                start_time: Instant::now(),
            }),
            active: Arc::new(ArcSwap::from_pointee(None)),
            system: System::new(),
            components: Components::new_with_refreshed_list(),
            report_interval,
        }
    }

    /// Creates and returns a channel sender for switch events
    ///
    /// Events are folded into the counters on a background thread.
    pub fn event_sender(&self) -> Sender<SwitchEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.start_event_listener(rx);
        tx
    }

    /// Snapshot of the counters
    pub fn get_stats(&self) -> SwitchStats {
        SwitchStats {
            switches: self.stats.switches.load(Ordering::Acquire),
            self_exits: self.stats.self_exits.load(Ordering::Acquire),
            fetch_failures: self.stats.fetch_failures.load(Ordering::Relaxed),
            uptime: self.stats.start_time.elapsed(),
        }
    }

    /// Miner currently believed to be running
    pub fn active_miner(&self) -> Option<ActiveMiner> {
        (**self.active.load()).clone()
    }

    /// Resource usage of the running miner
    ///
    /// Returns `None` when no miner is running or its process is gone.
    /// CPU usage needs two refreshes to be meaningful, so the first report
    /// after a switch shows 0%.
    pub fn get_process_stats(&mut self) -> Option<ProcessStats> {
        let pid = Pid::from_u32(self.active_miner()?.pid?);
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        self.components.refresh(true);

        let process = self.system.process(pid)?;
        let temperature = self
            .components
            .iter()
            .filter_map(|c| c.temperature())
            .fold(0.0_f32, f32::max);

        Some(ProcessStats {
            cpu_usage: process.cpu_usage(),
            memory_used: process.memory(),
            temperature,
        })
    }

    /// Starts the periodic reporting of statistics
    ///
    /// This spawns a background thread that logs stats at the configured interval.
    pub fn start_reporting(&self) {
        let stats = self.stats.clone();
        let active = self.active.clone();
        let interval = self.report_interval;

        std::thread::spawn(move || {
            let mut reporter = StatsReporter {
                stats,
                active,
                system: System::new(),
                components: Components::new_with_refreshed_list(),
                report_interval: interval,
            };

            loop {
                std::thread::sleep(interval);
                let counters = reporter.get_stats();
                let mining = match reporter.active_miner() {
                    Some(miner) => format!("{} ({})", miner.coin, miner.net_revenue),
                    None => "nothing".to_string(),
                };

                match reporter.get_process_stats() {
                    Some(proc_stats) => log::info!(
                        "Mining {} | CPU: {:.1}% | RSS: {} MiB | Temp: {:.1}°C | switches/exits/fetch failures: {}/{}/{}",
                        mining,
                        proc_stats.cpu_usage,
                        proc_stats.memory_used / (1024 * 1024),
                        proc_stats.temperature,
                        counters.switches,
                        counters.self_exits,
                        counters.fetch_failures
                    ),
                    None => log::info!(
                        "Mining {} | switches/exits/fetch failures: {}/{}/{}",
                        mining,
                        counters.switches,
                        counters.self_exits,
                        counters.fetch_failures
                    ),
                }
            }
        });
    }

    /// Starts a listener for switch events on a background thread
    fn start_event_listener(&self, receiver: Receiver<SwitchEvent>) {
        let stats = self.stats.clone();
        let active = self.active.clone();

        std::thread::spawn(move || {
            for event in receiver {
                match event {
                    // Active miner first, so a reader that sees the new count sees it too
                    SwitchEvent::Switched(miner) => {
                        active.store(Arc::new(Some(miner)));
                        stats.switches.fetch_add(1, Ordering::Release);
                    }
                    SwitchEvent::MinerExited => {
                        active.store(Arc::new(None));
                        stats.self_exits.fetch_add(1, Ordering::Release);
                    }
                    SwitchEvent::FetchFailed => {
                        stats.fetch_failures.fetch_add(1, Ordering::Relaxed);
                    }
                    SwitchEvent::Stopped => active.store(Arc::new(None)),
                }
            }
        });
    }
}
