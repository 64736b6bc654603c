use clap::{Parser, ValueEnum};
use nw_process::HostProcessControl;
use nw_supervisor::{
    FsStateStore, LogPurgeOutcome, NodeStatus, Prompt, PurgeOutcome, StartOutcome, StdinPrompt,
    StopOutcome, Supervisor, SupervisorConfig,
};
use tracing_subscriber::EnvFilter;

/// Warden chain node supervisor.
#[derive(Parser, Debug)]
#[command(
    name = "nw-supervisor",
    version,
    about = "Supervises a single Warden chain node process",
    long_about = "Starts, stops and inspects the managed chain node: tracks its \
                  pid and run mode on disk, redirects its output to the node \
                  log, and cleans up stale bookkeeping after unclean exits."
)]
struct Cli {
    /// Action to perform; prompted for interactively when omitted.
    #[arg(value_enum)]
    action: Option<CliAction>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum CliAction {
    /// Launch the node after choosing a run mode.
    Start,
    /// Gracefully stop the tracked node.
    Stop,
    /// Report whether the node is running, its mode and recent log lines.
    Status,
    /// Stop then start the node.
    Restart,
    /// Delete the node database (the node must be stopped first).
    Purge,
    /// Print the last lines of the node log.
    #[value(name = "view_logs")]
    ViewLogs,
    /// Truncate the node log file.
    #[value(name = "purge_logs")]
    PurgeLogs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("nw_supervisor=info".parse()?)
                .add_directive("nw_process=info".parse()?),
        )
        .init();

    let config = SupervisorConfig::default();
    let store = FsStateStore::new(config.pid_file.clone(), config.mode_file.clone());
    let mut prompt = StdinPrompt;

    let action = match cli.action {
        Some(action) => action,
        None => ask_action(&mut prompt)?,
    };

    let mut supervisor = Supervisor::new(config, store, HostProcessControl, prompt);

    match action {
        CliAction::Start => report_start(supervisor.start().await?),
        CliAction::Stop => report_stop(supervisor.stop().await?),
        CliAction::Status => report_status(supervisor.status()?),
        CliAction::Restart => {
            let (stopped, started) = supervisor.restart().await?;
            report_stop(stopped);
            report_start(started);
        }
        CliAction::Purge => match supervisor.purge()? {
            PurgeOutcome::Purged => println!("Database removed; run mode is now unknown."),
            PurgeOutcome::Cancelled => println!("Purge cancelled."),
        },
        CliAction::ViewLogs => {
            for line in supervisor.view_logs()? {
                println!("{line}");
            }
        }
        CliAction::PurgeLogs => match supervisor.purge_logs()? {
            LogPurgeOutcome::Truncated => println!("Node log truncated."),
            LogPurgeOutcome::Cancelled => println!("Log purge cancelled."),
        },
    }

    Ok(())
}

fn ask_action(prompt: &mut impl Prompt) -> anyhow::Result<CliAction> {
    loop {
        let line =
            prompt.read_line("Action [start/stop/status/restart/purge/view_logs/purge_logs]: ")?;
        match CliAction::from_str(line.trim(), true) {
            Ok(action) => return Ok(action),
            Err(_) => println!("Unknown action."),
        }
    }
}

fn report_start(outcome: StartOutcome) {
    match outcome {
        StartOutcome::Started {
            pid,
            mode,
            switched_from_archive,
        } => {
            if switched_from_archive {
                println!(
                    "Warning: the node previously ran in archive mode; \
                     if it fails to sync, purge the database."
                );
            }
            println!("Node started (pid {pid}, mode {mode}).");
        }
        StartOutcome::AlreadyRunning { pid } => {
            println!("Node is already running (pid {pid}).");
        }
    }
}

fn report_stop(outcome: StopOutcome) {
    match outcome {
        StopOutcome::Stopped { forced: true } => {
            println!("Node killed after the shutdown timeout.");
        }
        StopOutcome::Stopped { forced: false } => println!("Node stopped."),
        StopOutcome::NotRunning => println!("Node is not running."),
    }
}

fn report_status(status: NodeStatus) {
    match status {
        NodeStatus::Running {
            pid,
            mode,
            log_tail,
        } => {
            let mode = mode.map_or("unknown", |m| m.as_str());
            println!("Node is running (pid {pid}, mode {mode}).");
            if !log_tail.is_empty() {
                println!("Recent log lines:");
                for line in log_tail {
                    println!("  {line}");
                }
            }
        }
        NodeStatus::NotRunning { mode } => {
            let mode = mode.map_or("unknown", |m| m.as_str());
            println!("Node is not running (last mode {mode}).");
        }
    }
}
