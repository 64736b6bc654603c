use std::fmt;

/// Operating profile of the supervised node.
///
/// The mode decides how the node synchronises and how much history it keeps,
/// and is persisted as a single lowercase token in the mode file so later
/// invocations know what the node was last started as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Warp-synced node keeping only a recent window of blocks.  The
    /// lightest profile, suitable for RPC frontends and wallet backends.
    Lite,

    /// Fully synced node keeping a recent window of blocks.
    Full,

    /// Fully synced node retaining the entire history.  Requires a fresh
    /// database: an existing pruned database cannot be converted.
    Archive,
}

impl RunMode {
    /// Parse the token stored in the mode file (or typed by the operator).
    pub fn parse(token: &str) -> Option<RunMode> {
        match token.trim().to_ascii_lowercase().as_str() {
            "lite" => Some(RunMode::Lite),
            "full" => Some(RunMode::Full),
            "archive" => Some(RunMode::Archive),
            _ => None,
        }
    }

    /// The sync strategy this mode starts the node with.
    ///
    /// Archive cannot warp-sync: the snapshot it would restore from is
    /// itself pruned.
    pub fn sync_strategy(self) -> SyncStrategy {
        match self {
            RunMode::Lite => SyncStrategy::Warp,
            RunMode::Full | RunMode::Archive => SyncStrategy::Full,
        }
    }

    /// Whether this mode discards old state at all.
    pub fn prunes(self) -> bool {
        !matches!(self, RunMode::Archive)
    }

    /// Token persisted in the mode file.
    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::Lite => "lite",
            RunMode::Full => "full",
            RunMode::Archive => "archive",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Initial synchronisation strategy passed to the node binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Fast snapshot sync that transitions to full state tracking once the
    /// snapshot is restored.
    Warp,

    /// Download and execute every block from genesis.
    Full,
}

impl SyncStrategy {
    /// Value handed to the node's `--sync` flag.
    pub fn flag_value(self) -> &'static str {
        match self {
            SyncStrategy::Warp => "warp",
            SyncStrategy::Full => "full",
        }
    }
}

/// How much historical state the node keeps on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pruning {
    /// Keep the most recent `n` blocks of state.
    Blocks(u32),

    /// Keep everything.
    Archive,
}

impl fmt::Display for Pruning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pruning::Blocks(n) => write!(f, "{n}"),
            Pruning::Archive => f.write_str("archive"),
        }
    }
}
