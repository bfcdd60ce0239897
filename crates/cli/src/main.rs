//! Club portal CLI

mod commands;
mod config;
mod logging;
mod navigator;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, debug, error};

#[derive(Parser)]
#[command(name = "club")]
#[command(about = "Command line client for the club portal")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Configuration file (defaults to <data-dir>/config.toml when present)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the session, configuration and logs
    #[arg(short = 'd', long, global = true, env = "CLUB_STATE_DIR")]
    data_dir: Option<PathBuf>,

    /// Route reported to the client; public routes never trigger a login redirect
    #[arg(long, global = true)]
    route: Option<String>,

    /// Timeout for the whole command in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "30")]
    timeout: u64,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.log_level.into(), cli.data_dir.clone(), cli.no_file_log)?;

    let options = commands::GlobalOptions {
        config: cli.config,
        data_dir: cli.data_dir,
        route: cli.route,
    };

    let outcome = if cli.timeout == 0 {
        cli.command.execute(options).await
    } else {
        let timeout_duration = Duration::from_secs(cli.timeout);
        match tokio::time::timeout(timeout_duration, cli.command.execute(options)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(anyhow::anyhow!(
                "Command timed out after {} seconds",
                cli.timeout
            )),
        }
    };

    match outcome {
        Ok(()) => {
            debug!("Command completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {e:#}");
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
