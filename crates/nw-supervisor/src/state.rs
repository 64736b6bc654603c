use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::mode::RunMode;

/// Snapshot of the supervisor's persisted bookkeeping, loaded at the start
/// of each action.
///
/// A recorded PID means a launch was confirmed at some point; the process
/// behind it may no longer exist and must be re-validated before being
/// trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeState {
    /// PID recorded by the last confirmed start, if any.
    pub pid: Option<u32>,

    /// Mode recorded by the last confirmed start, if any.
    pub mode: Option<RunMode>,
}

/// Storage seam for the two bookkeeping files.
///
/// Keeping all reads and writes behind this trait keeps the lifecycle state
/// machine auditable and testable without scattering file access through it.
pub trait StateStore {
    /// Load the current snapshot.
    fn load(&self) -> io::Result<NodeState>;

    /// Record a confirmed start: the PID first, then the mode.
    fn record_started(&self, pid: u32, mode: RunMode) -> io::Result<()>;

    /// Drop the PID record (process confirmed gone, or the handle is stale).
    fn clear_pid(&self) -> io::Result<()>;

    /// Drop the mode record (database purged, mode back to unknown).
    fn clear_mode(&self) -> io::Result<()>;
}

/// [`StateStore`] over the real PID and mode files.
#[derive(Debug, Clone)]
pub struct FsStateStore {
    pid_file: PathBuf,
    mode_file: PathBuf,
}

impl FsStateStore {
    pub fn new(pid_file: PathBuf, mode_file: PathBuf) -> Self {
        Self {
            pid_file,
            mode_file,
        }
    }
}

impl StateStore for FsStateStore {
    fn load(&self) -> io::Result<NodeState> {
        let pid = match fs::read_to_string(&self.pid_file) {
            Ok(raw) => match raw.trim().parse::<u32>() {
                Ok(pid) => Some(pid),
                Err(_) => {
                    // A PID file we cannot parse is a stale handle; heal it
                    // here so no later check trusts it.
                    warn!(file = %self.pid_file.display(), "unreadable pid file removed");
                    fs::remove_file(&self.pid_file)?;
                    None
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => return Err(err),
        };

        let mode = match fs::read_to_string(&self.mode_file) {
            Ok(raw) => RunMode::parse(&raw),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => return Err(err),
        };

        Ok(NodeState { pid, mode })
    }

    fn record_started(&self, pid: u32, mode: RunMode) -> io::Result<()> {
        fs::write(&self.pid_file, format!("{pid}\n"))?;
        fs::write(&self.mode_file, format!("{}\n", mode.as_str()))
    }

    fn clear_pid(&self) -> io::Result<()> {
        remove_if_present(&self.pid_file)
    }

    fn clear_mode(&self) -> io::Result<()> {
        remove_if_present(&self.mode_file)
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn store_in(dir: &Path) -> FsStateStore {
        FsStateStore::new(dir.join("node.pid"), dir.join("node.mode"))
    }

    #[test]
    fn empty_directory_loads_as_unknown() {
        let dir = tempdir().unwrap();
        let state = store_in(dir.path()).load().unwrap();
        assert_eq!(state, NodeState::default());
    }

    #[test]
    fn record_started_round_trips() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        store.record_started(4242, RunMode::Full).unwrap();
        let state = store.load().unwrap();

        assert_eq!(state.pid, Some(4242));
        assert_eq!(state.mode, Some(RunMode::Full));
    }

    #[test]
    fn clearing_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        store.record_started(1, RunMode::Lite).unwrap();
        store.clear_pid().unwrap();
        store.clear_pid().unwrap();
        store.clear_mode().unwrap();
        store.clear_mode().unwrap();

        assert_eq!(store.load().unwrap(), NodeState::default());
    }

    #[test]
    fn unparseable_pid_file_is_healed_on_load() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(dir.path().join("node.pid"), "not-a-pid\n").unwrap();

        let state = store.load().unwrap();

        assert_eq!(state.pid, None);
        assert!(!dir.path().join("node.pid").exists());
    }

    #[test]
    fn unknown_mode_token_loads_as_unknown() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(dir.path().join("node.mode"), "turbo\n").unwrap();

        assert_eq!(store.load().unwrap().mode, None);
    }

    #[test]
    fn mode_survives_a_pid_clear() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        store.record_started(7, RunMode::Archive).unwrap();
        store.clear_pid().unwrap();

        let state = store.load().unwrap();
        assert_eq!(state.pid, None);
        assert_eq!(state.mode, Some(RunMode::Archive));
    }
}
