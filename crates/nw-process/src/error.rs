use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to spawn node process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to signal pid {pid}: {source}")]
    Signal { pid: u32, source: nix::Error },
}
