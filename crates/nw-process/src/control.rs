use std::fs::OpenOptions;
use std::io;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use nix::sched::{sched_setaffinity, CpuSet};
use nix::sys::signal::{self, Signal};
use nix::unistd::{setsid, Pid};
use tracing::debug;

use crate::error::ProcessError;
use crate::launch::LaunchSpec;

/// Capability seam for controlling the supervised node process.
///
/// The supervisor only ever talks to the node through this trait, so tests
/// can substitute a scripted fake without launching real binaries.
#[async_trait]
pub trait ProcessControl {
    /// Launch the process described by `spec`, detached from the calling
    /// process, and return its PID.
    async fn spawn(&self, spec: &LaunchSpec) -> Result<u32, ProcessError>;

    /// Whether `pid` refers to a live process.
    fn is_alive(&self, pid: u32) -> bool;

    /// Ask the process to shut down (SIGTERM).
    fn terminate(&self, pid: u32) -> Result<(), ProcessError>;

    /// Forcefully kill the process (SIGKILL).
    fn force_kill(&self, pid: u32) -> Result<(), ProcessError>;

    /// Poll liveness up to `attempts` times, `interval` apart.
    ///
    /// Returns `true` once the process is gone, `false` if it outlived the
    /// whole wait.
    async fn wait_for_exit(&self, pid: u32, attempts: u32, interval: Duration) -> bool;
}

/// [`ProcessControl`] backed by the host operating system.
///
/// The spawned child is placed in a fresh session (`setsid`) so it survives
/// the supervisor invocation, pinned to the configured CPU cores, and has
/// its output appended to the node log file.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostProcessControl;

#[async_trait]
impl ProcessControl for HostProcessControl {
    async fn spawn(&self, spec: &LaunchSpec) -> Result<u32, ProcessError> {
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&spec.log_path)
            .map_err(|source| ProcessError::LogFile {
                path: spec.log_path.clone(),
                source,
            })?;
        let log_err = log.try_clone().map_err(|source| ProcessError::LogFile {
            path: spec.log_path.clone(),
            source,
        })?;

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .current_dir(&spec.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err));

        let (first_core, last_core) = spec.cpu_cores;
        // Detaching and pinning must both happen in the child between fork
        // and exec, hence pre_exec.
        unsafe {
            command.pre_exec(move || {
                setsid().map_err(io::Error::from)?;
                let mut cpus = CpuSet::new();
                for core in first_core..=last_core {
                    cpus.set(core).map_err(io::Error::from)?;
                }
                sched_setaffinity(Pid::from_raw(0), &cpus).map_err(io::Error::from)?;
                Ok(())
            });
        }

        let child = command.spawn().map_err(ProcessError::Spawn)?;
        let pid = child.id();
        debug!(pid, program = %spec.program.display(), "node process spawned");
        Ok(pid)
    }

    fn is_alive(&self, pid: u32) -> bool {
        // Signal 0 checks for existence without delivering anything.
        signal::kill(Pid::from_raw(pid as i32), None).is_ok()
    }

    fn terminate(&self, pid: u32) -> Result<(), ProcessError> {
        debug!(pid, "sending SIGTERM");
        signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM)
            .map_err(|source| ProcessError::Signal { pid, source })
    }

    fn force_kill(&self, pid: u32) -> Result<(), ProcessError> {
        debug!(pid, "sending SIGKILL");
        signal::kill(Pid::from_raw(pid as i32), Signal::SIGKILL)
            .map_err(|source| ProcessError::Signal { pid, source })
    }

    async fn wait_for_exit(&self, pid: u32, attempts: u32, interval: Duration) -> bool {
        for _ in 0..attempts {
            if !self.is_alive(pid) {
                return true;
            }
            tokio::time::sleep(interval).await;
        }
        !self.is_alive(pid)
    }
}
