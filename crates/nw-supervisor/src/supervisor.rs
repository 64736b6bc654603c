use std::fs;
use std::io;

use nw_process::ProcessControl;
use tracing::{info, warn};

use crate::config::SupervisorConfig;
use crate::error::SupervisorError;
use crate::logs;
use crate::mode::{Pruning, RunMode};
use crate::prompt::{self, Prompt};
use crate::state::StateStore;

/// Result of a [`Supervisor::start`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A node process was launched and confirmed alive after the grace
    /// period; both bookkeeping files have been written.
    Started {
        pid: u32,
        mode: RunMode,
        /// The previous recorded mode was archive and this start is not.
        /// Switching away from archival storage usually needs a purge, so
        /// the caller should surface the warning.
        switched_from_archive: bool,
    },

    /// A tracked process is already alive; nothing was done.
    AlreadyRunning { pid: u32 },
}

/// Result of a [`Supervisor::stop`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The process exited; `forced` is set when SIGKILL was needed.
    Stopped { forced: bool },

    /// Nothing was running: either no process was ever started, or the
    /// recorded handle was stale and has been cleaned up.
    NotRunning,
}

/// Result of a [`Supervisor::purge`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeOutcome {
    /// Database directory removed and mode reset to unknown.
    Purged,

    /// Operator declined the confirmation.
    Cancelled,
}

/// Result of a [`Supervisor::purge_logs`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogPurgeOutcome {
    /// Log file truncated to empty.
    Truncated,

    /// Operator declined the confirmation.
    Cancelled,
}

/// What [`Supervisor::status`] observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeStatus {
    Running {
        pid: u32,
        /// Last recorded mode; `None` renders as "unknown".
        mode: Option<RunMode>,
        /// Last few lines of the node log (empty when the log is missing).
        log_tail: Vec<String>,
    },

    NotRunning {
        /// Last recorded mode, if any start ever completed.
        mode: Option<RunMode>,
    },
}

/// Supervises a single long-running node process.
///
/// The lifecycle it tracks is: absent, starting (spawned, inside the grace
/// period), running (liveness confirmed, PID and mode recorded), stopping
/// (signalled, waiting for exit), and stale (recorded PID no longer refers
/// to a live process).  Staleness is detected lazily whenever an action
/// inspects the PID record and always resolves immediately to absent by
/// deleting the record.
///
/// All file access goes through the [`StateStore`], all process access
/// through [`ProcessControl`] and all operator interaction through
/// [`Prompt`], so the whole machine can be exercised in tests with scripted
/// doubles.
pub struct Supervisor<S, P, I> {
    config: SupervisorConfig,
    store: S,
    process: P,
    prompt: I,
}

impl<S, P, I> Supervisor<S, P, I>
where
    S: StateStore,
    P: ProcessControl,
    I: Prompt,
{
    pub fn new(config: SupervisorConfig, store: S, process: P, prompt: I) -> Self {
        Self {
            config,
            store,
            process,
            prompt,
        }
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// Launch the node after interactively choosing a run mode.
    ///
    /// No-ops when a tracked process is still alive.  On a confirmed launch
    /// the PID and mode files are written; on a failed launch (the process
    /// dies within the grace period) any partial record is removed and an
    /// error is returned.
    pub async fn start(&mut self) -> Result<StartOutcome, SupervisorError> {
        let state = self.store.load()?;

        if let Some(pid) = state.pid {
            if self.process.is_alive(pid) {
                info!(pid, "node already running");
                return Ok(StartOutcome::AlreadyRunning { pid });
            }
            warn!(pid, "stale pid record removed");
            self.store.clear_pid()?;
        }

        if !self.config.install_dir.is_dir() {
            return Err(SupervisorError::InstallDirUnreachable(
                self.config.install_dir.clone(),
            ));
        }

        let mode = prompt::ask_mode(&mut self.prompt)?;
        let pruning = if mode.prunes() {
            Pruning::Blocks(prompt::ask_retention(
                &mut self.prompt,
                self.config.default_retention,
            )?)
        } else {
            warn!("archive mode requires a fresh database; it cannot reuse a pruned one");
            Pruning::Archive
        };

        let switched_from_archive =
            state.mode == Some(RunMode::Archive) && mode != RunMode::Archive;
        if switched_from_archive {
            warn!(
                new_mode = %mode,
                "node was last run in archive mode; switching away usually requires a database purge"
            );
        }

        let spec = self.config.launch_spec(mode, pruning);
        info!(mode = %mode, pruning = %pruning, "launching node");
        let pid = self.process.spawn(&spec).await?;

        tokio::time::sleep(self.config.start_grace).await;

        if self.process.is_alive(pid) {
            self.store.record_started(pid, mode)?;
            info!(pid, mode = %mode, "node confirmed running");
            return Ok(StartOutcome::Started {
                pid,
                mode,
                switched_from_archive,
            });
        }

        // The process died inside the grace window: make sure no partial
        // record survives before reporting the failure.
        self.store.clear_pid()?;
        if switched_from_archive {
            Err(SupervisorError::StartFailedAfterModeSwitch)
        } else {
            Err(SupervisorError::StartFailed)
        }
    }

    /// Stop the tracked node.
    ///
    /// Sends SIGTERM, polls for exit up to the configured timeout and only
    /// then escalates to SIGKILL.  Ends with no PID record either way; a
    /// missing or stale record is a successful no-op.
    pub async fn stop(&mut self) -> Result<StopOutcome, SupervisorError> {
        let state = self.store.load()?;

        let Some(pid) = state.pid else {
            info!("no node is tracked; nothing to stop");
            return Ok(StopOutcome::NotRunning);
        };

        if !self.process.is_alive(pid) {
            warn!(pid, "stale pid record removed");
            self.store.clear_pid()?;
            return Ok(StopOutcome::NotRunning);
        }

        info!(pid, "asking node to shut down");
        self.process.terminate(pid)?;

        let exited = self
            .process
            .wait_for_exit(
                pid,
                self.config.stop_poll_attempts,
                self.config.stop_poll_interval,
            )
            .await;

        let forced = !exited;
        if forced {
            warn!(pid, "node outlived the shutdown timeout; killing");
            self.process.force_kill(pid)?;
        }

        self.store.clear_pid()?;
        info!(pid, forced, "node stopped");
        Ok(StopOutcome::Stopped { forced })
    }

    /// Report whether the node is running, its last recorded mode and the
    /// tail of its log.  Heals a stale PID record as a side effect.
    pub fn status(&mut self) -> Result<NodeStatus, SupervisorError> {
        let state = self.store.load()?;

        if let Some(pid) = state.pid {
            if self.process.is_alive(pid) {
                let log_tail =
                    match logs::tail(&self.config.log_file, self.config.status_tail_lines) {
                        Ok(lines) => lines,
                        Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
                        Err(err) => return Err(err.into()),
                    };
                return Ok(NodeStatus::Running {
                    pid,
                    mode: state.mode,
                    log_tail,
                });
            }
            warn!(pid, "stale pid record removed");
            self.store.clear_pid()?;
        }

        Ok(NodeStatus::NotRunning { mode: state.mode })
    }

    /// [`Supervisor::stop`] followed by [`Supervisor::start`], strictly
    /// sequential: the start only begins once the stop has released the PID
    /// record.
    pub async fn restart(&mut self) -> Result<(StopOutcome, StartOutcome), SupervisorError> {
        let stopped = self.stop().await?;
        let started = self.start().await?;
        Ok((stopped, started))
    }

    /// Delete the node database and reset the recorded mode to unknown.
    ///
    /// Refuses while any PID record exists, live or stale: a record means
    /// the node has not been stopped through the supervisor, and the
    /// database must never be deleted under a possibly-running process.
    pub fn purge(&mut self) -> Result<PurgeOutcome, SupervisorError> {
        let state = self.store.load()?;
        if let Some(pid) = state.pid {
            return Err(SupervisorError::PurgeWhileTracked(pid));
        }

        let confirmed = prompt::ask_confirm(
            &mut self.prompt,
            "Delete the node database and reset the recorded mode?",
        )?;
        if !confirmed {
            info!("purge cancelled");
            return Ok(PurgeOutcome::Cancelled);
        }

        match fs::remove_dir_all(&self.config.db_dir) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        self.store.clear_mode()?;
        info!(db_dir = %self.config.db_dir.display(), "database purged, mode reset");
        Ok(PurgeOutcome::Purged)
    }

    /// Return the last lines of the node log, asking the operator how many.
    pub fn view_logs(&mut self) -> Result<Vec<String>, SupervisorError> {
        if !self.config.log_file.is_file() {
            return Err(SupervisorError::MissingLogFile(self.config.log_file.clone()));
        }
        let count = prompt::ask_line_count(&mut self.prompt, self.config.default_log_lines)?;
        Ok(logs::tail(&self.config.log_file, count)?)
    }

    /// Truncate the node log to empty after confirmation.
    pub fn purge_logs(&mut self) -> Result<LogPurgeOutcome, SupervisorError> {
        if !self.config.log_file.is_file() {
            return Err(SupervisorError::MissingLogFile(self.config.log_file.clone()));
        }

        let confirmed = prompt::ask_confirm(&mut self.prompt, "Truncate the node log file?")?;
        if !confirmed {
            info!("log purge cancelled");
            return Ok(LogPurgeOutcome::Cancelled);
        }

        logs::truncate(&self.config.log_file)?;
        info!(log_file = %self.config.log_file.display(), "log file truncated");
        Ok(LogPurgeOutcome::Truncated)
    }
}
