//! omni-resume CLI: rebuild sessions from trace history and inspect the session store.
//!
//! Logging: set `RUST_LOG=omni_resume=debug` (or `warn`, `info`) to see logs on stderr.

mod cli;
mod components;
mod nodes;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use omni_resume::{load_runtime_settings, set_config_home_override};

use crate::cli::{Cli, Command};
use crate::nodes::{
    run_clear_mode, run_history_mode, run_info_mode, run_resume_mode, run_sessions_mode,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(conf_dir) = cli.conf.clone() {
        set_config_home_override(conf_dir);
    }

    // RUST_LOG overrides; --verbose => debug; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "omni_resume=debug"
        } else {
            "omni_resume=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let runtime_settings = load_runtime_settings();

    match cli.command {
        Command::Resume {
            session_id,
            mode,
            max_pages,
            fresh,
        } => run_resume_mode(&session_id, mode, max_pages, fresh, &runtime_settings).await,
        Command::History {
            session_id,
            mode,
            max_pages,
            json,
        } => run_history_mode(&session_id, mode, max_pages, json, &runtime_settings).await,
        Command::Sessions { limit } => run_sessions_mode(limit, &runtime_settings).await,
        Command::Info { session_id } => run_info_mode(&session_id, &runtime_settings).await,
        Command::Clear { session_id } => run_clear_mode(&session_id, &runtime_settings).await,
    }
}
