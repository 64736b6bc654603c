use std::path::PathBuf;
use std::time::Duration;

use nw_process::LaunchSpec;

use crate::mode::{Pruning, RunMode};

/// Block-retention window used when the operator does not supply one.
pub const DEFAULT_RETENTION: u32 = 7200;

/// Full configuration for a [`crate::Supervisor`].
///
/// Everything here is a fixed installation constant: paths and timings are
/// decided when the tool is deployed, never re-derived at runtime from any
/// external source.  Tests point the paths into a temp directory and zero
/// the timings.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Directory the node is installed in and launched from.
    pub install_dir: PathBuf,

    /// Path to the node binary.
    pub node_binary: PathBuf,

    /// Chain the node joins (`--chain`).
    pub chain: String,

    /// Database directory, owned by the node process while it runs.
    pub db_dir: PathBuf,

    /// File receiving the node's stdout and stderr.
    pub log_file: PathBuf,

    /// File holding the PID of the supervised process.
    pub pid_file: PathBuf,

    /// File holding the last confirmed run mode token.
    pub mode_file: PathBuf,

    /// Inclusive CPU core range the node is pinned to.
    pub cpu_cores: (usize, usize),

    /// Process name handed to the node (`--name`).
    pub process_name: String,

    /// Block-retention window used when the operator does not supply one.
    pub default_retention: u32,

    /// How long to wait after spawning before trusting the process is up.
    pub start_grace: Duration,

    /// Liveness polls performed after SIGTERM before escalating to SIGKILL.
    pub stop_poll_attempts: u32,

    /// Pause between those polls.
    pub stop_poll_interval: Duration,

    /// Log lines included in the status report.
    pub status_tail_lines: usize,

    /// Log lines shown by view_logs when the operator does not choose.
    pub default_log_lines: usize,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        let install_dir = PathBuf::from("/opt/warden-node");
        Self {
            node_binary: install_dir.join("bin/warden-node"),
            chain: "mainnet".to_string(),
            db_dir: install_dir.join("chains"),
            log_file: install_dir.join("node.log"),
            pid_file: install_dir.join("node.pid"),
            mode_file: install_dir.join("node.mode"),
            install_dir,
            cpu_cores: (0, 3),
            process_name: "warden-node".to_string(),
            default_retention: DEFAULT_RETENTION,
            start_grace: Duration::from_secs(3),
            stop_poll_attempts: 10,
            stop_poll_interval: Duration::from_secs(1),
            status_tail_lines: 10,
            default_log_lines: 100,
        }
    }
}

impl SupervisorConfig {
    /// Assemble the full launch description for one start: the base
    /// invocation plus the mode-derived sync and pruning flags and the
    /// process name.
    pub fn launch_spec(&self, mode: RunMode, pruning: Pruning) -> LaunchSpec {
        let args = vec![
            "--chain".to_string(),
            self.chain.clone(),
            "--base-path".to_string(),
            self.db_dir.display().to_string(),
            format!("--sync={}", mode.sync_strategy().flag_value()),
            format!("--pruning={pruning}"),
            format!("--name={}", self.process_name),
        ];
        LaunchSpec {
            program: self.node_binary.clone(),
            args,
            working_dir: self.install_dir.clone(),
            cpu_cores: self.cpu_cores,
            log_path: self.log_file.clone(),
        }
    }
}
