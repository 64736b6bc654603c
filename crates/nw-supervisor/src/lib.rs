pub mod config;
pub mod error;
pub mod logs;
pub mod mode;
pub mod prompt;
pub mod state;
pub mod supervisor;

pub use config::SupervisorConfig;
pub use error::SupervisorError;
pub use mode::{Pruning, RunMode, SyncStrategy};
pub use prompt::{Prompt, StdinPrompt};
pub use state::{FsStateStore, NodeState, StateStore};
pub use supervisor::{
    LogPurgeOutcome, NodeStatus, PurgeOutcome, StartOutcome, StopOutcome, Supervisor,
};
