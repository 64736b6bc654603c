use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("cannot enter install directory {0}")]
    InstallDirUnreachable(PathBuf),

    #[error("node process exited during the startup grace period; check the node log for details")]
    StartFailed,

    #[error(
        "node process exited during the startup grace period; the previous run was archive, \
         so a database purge is likely required before switching modes"
    )]
    StartFailedAfterModeSwitch,

    #[error("a pid file exists (pid {0}); stop the node before purging")]
    PurgeWhileTracked(u32),

    #[error("log file {0} does not exist")]
    MissingLogFile(PathBuf),

    #[error("process control error: {0}")]
    Process(#[from] nw_process::ProcessError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
