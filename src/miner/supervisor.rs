// src/miner/supervisor.rs
//! Child miner process supervision
//!
//! Owns the one external miner process: start, liveness check, graceful
//! stop with escalation to a hard kill. At most one child is alive at a time.

use crate::config::ScheduleConfig;
use crate::miner::launch::LaunchCommand;
use crate::utils::error::SwitchError;
use std::future::Future;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};

/// Control surface the scheduler uses to run the miner
///
/// State machine: `Idle --start--> Running(coin) --(stop | self-exit)--> Idle`.
pub trait MinerControl {
    /// Non-blocking liveness check
    ///
    /// A child that exited on its own (or never spawned) is forgotten here,
    /// which also clears the minimum-runtime guard.
    fn is_alive(&mut self) -> bool;

    /// Stops the running child and waits for it to exit; no-op when idle
    fn stop(&mut self) -> impl Future<Output = Result<(), SwitchError>>;

    /// Launches the miner for `coin`
    ///
    /// # Errors
    /// * `SupervisorError` if a child is already running (nothing is spawned)
    /// * `SpawnError` if the executable could not be launched; the coin is
    ///   still recorded so the next [`MinerControl::is_alive`] reports an exit
    fn start(&mut self, command: &LaunchCommand, coin: &str) -> Result<(), SwitchError>;

    /// Coin of the running child, if any
    fn current_coin(&self) -> Option<&str>;

    /// OS process id of the running child, if any
    fn pid(&self) -> Option<u32>;

    /// Whether the running child is still inside its minimum runtime
    fn cooldown_active(&self) -> bool;
}

enum SupervisorState {
    Idle,
    Running {
        coin: String,
        /// `None` when the spawn itself failed
        child: Option<Child>,
        started: Instant,
    },
}

/// Supervises the external miner process
pub struct ProcessSupervisor {
    state: SupervisorState,
    /// Minimum runtime before a fresh child may be switched away from
    min_runtime: Duration,
    /// How long a child gets to exit after SIGINT before it is killed
    stop_grace: Duration,
    /// Pause after a child exits so devices are released before relaunch
    relaunch_delay: Duration,
}

impl ProcessSupervisor {
    /// Creates an idle supervisor
    pub fn new(min_runtime: Duration, stop_grace: Duration, relaunch_delay: Duration) -> Self {
        ProcessSupervisor {
            state: SupervisorState::Idle,
            min_runtime,
            stop_grace,
            relaunch_delay,
        }
    }

    /// Creates an idle supervisor from the schedule settings
    pub fn from_schedule(schedule: &ScheduleConfig) -> Self {
        Self::new(
            schedule.min_runtime(),
            Duration::from_secs(schedule.stop_grace_secs),
            Duration::from_secs(schedule.relaunch_delay_secs),
        )
    }
}

impl MinerControl for ProcessSupervisor {
    fn is_alive(&mut self) -> bool {
        let SupervisorState::Running { coin, child, .. } = &mut self.state else {
            return false;
        };

        let exited = match child {
            None => {
                log::warn!("Miner for {} is not running (launch failed)", coin);
                true
            }
            Some(child) => match child.try_wait() {
                Ok(None) => false,
                Ok(Some(status)) => {
                    log::warn!("Miner for {} exited on its own: {}", coin, status);
                    true
                }
                Err(e) => {
                    log::error!("Failed to poll miner for {}: {}", coin, e);
                    true
                }
            },
        };

        if exited {
            self.state = SupervisorState::Idle;
        }
        !exited
    }

    async fn stop(&mut self) -> Result<(), SwitchError> {
        let state = std::mem::replace(&mut self.state, SupervisorState::Idle);
        let SupervisorState::Running {
            coin,
            child: Some(mut child),
            ..
        } = state
        else {
            return Ok(());
        };

        log::info!("Stopping miner for {} (pid {:?})", coin, child.id());
        interrupt(&mut child);

        match tokio::time::timeout(self.stop_grace, child.wait()).await {
            Ok(Ok(status)) => log::info!("Miner for {} stopped: {}", coin, status),
            Ok(Err(e)) => {
                log::error!("Waiting for miner {} failed: {}, killing it", coin, e);
                child.kill().await?;
            }
            Err(_) => {
                log::warn!(
                    "Miner for {} ignored SIGINT for {:?}, killing it",
                    coin,
                    self.stop_grace
                );
                child.kill().await?;
            }
        }

        tokio::time::sleep(self.relaunch_delay).await;
        Ok(())
    }

    fn start(&mut self, command: &LaunchCommand, coin: &str) -> Result<(), SwitchError> {
        if let SupervisorState::Running { coin: running, .. } = &self.state {
            return Err(SwitchError::SupervisorError(format!(
                "Cannot start {} while the miner for {} is still running",
                coin, running
            )));
        }

        let spawned = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn();

        let (child, result) = match spawned {
            Ok(child) => {
                log::info!("Started miner for {} (pid {:?})", coin, child.id());
                (Some(child), Ok(()))
            }
            Err(e) => {
                let msg = format!("{}: {}", command.program.display(), e);
                log::error!("Failed to launch miner for {}: {}", coin, msg);
                (None, Err(SwitchError::SpawnError(msg)))
            }
        };

        self.state = SupervisorState::Running {
            coin: coin.to_string(),
            child,
            started: Instant::now(),
        };
        result
    }

    fn current_coin(&self) -> Option<&str> {
        match &self.state {
            SupervisorState::Running { coin, .. } => Some(coin),
            SupervisorState::Idle => None,
        }
    }

    fn pid(&self) -> Option<u32> {
        match &self.state {
            SupervisorState::Running {
                child: Some(child), ..
            } => child.id(),
            _ => None,
        }
    }

    fn cooldown_active(&self) -> bool {
        match &self.state {
            SupervisorState::Running {
                child: Some(_),
                started,
                ..
            } => started.elapsed() < self.min_runtime,
            _ => false,
        }
    }
}

/// Asks the child to shut down the way an operator's Ctrl+C would
#[cfg(unix)]
#[allow(unsafe_code)]
fn interrupt(child: &mut Child) {
    let Some(pid) = child.id() else {
        return;
    };
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        let _ = child.start_kill();
        return;
    };

    // SAFETY: kill(2) has no memory preconditions; `pid` is our own unreaped child.
    let rc = unsafe { libc::kill(pid, libc::SIGINT) };
    if rc != 0 {
        log::warn!(
            "SIGINT to miner pid {} failed: {}",
            pid,
            std::io::Error::last_os_error()
        );
        let _ = child.start_kill();
    }
}

#[cfg(not(unix))]
fn interrupt(child: &mut Child) {
    let _ = child.start_kill();
}
