use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "omni-resume")]
#[command(about = "Session store inspection and conversation resume from trace history.")]
pub(crate) struct Cli {
    /// Override config directory (same semantics as Python `--conf`).
    #[arg(long, global = true)]
    pub(crate) conf: Option<PathBuf>,

    /// Debug-level logs (ignored when RUST_LOG is set).
    #[arg(long, short, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum HistoryMode {
    /// Session traces, then each trace's observations.
    #[default]
    PerTrace,
    /// Paginated session-scoped observations.
    Session,
    /// Message arrays carried by generations.
    Generations,
    /// Top-level trace input/output only.
    Traces,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Rebuild a session from trace history and show the latest exchanges.
    Resume {
        #[arg(long)]
        session_id: String,

        #[arg(long, value_enum, default_value_t = HistoryMode::PerTrace)]
        mode: HistoryMode,

        /// Page budget for `--mode session` (default: settings or 10).
        #[arg(long)]
        max_pages: Option<usize>,

        /// Clear stored items before rebuilding.
        #[arg(long)]
        fresh: bool,
    },
    /// Print the reconstructed conversation without touching the store.
    History {
        #[arg(long)]
        session_id: String,

        #[arg(long, value_enum, default_value_t = HistoryMode::PerTrace)]
        mode: HistoryMode,

        #[arg(long)]
        max_pages: Option<usize>,

        /// Emit JSON instead of a transcript.
        #[arg(long)]
        json: bool,
    },
    /// List sessions seen in the most recent traces.
    Sessions {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show item count and TTL of a stored session.
    Info {
        #[arg(long)]
        session_id: String,
    },
    /// Delete all stored items of a session.
    Clear {
        #[arg(long)]
        session_id: String,
    },
}
