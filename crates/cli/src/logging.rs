use anyhow::Result;
use club_core::StorageConfig;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE: &str = "cli.log";

/// Initialize logging for the CLI
///
/// Logs go to stderr and, unless disabled, to `cli.log` in the data directory.
/// `RUST_LOG` overrides the level given on the command line.
pub fn init_logging(log_level: Level, data_dir: Option<PathBuf>, no_file_log: bool) -> Result<()> {
    if no_file_log {
        init_stderr_logging(log_level);
        Ok(())
    } else {
        init_file_logging(log_level, data_dir)
    }
}

fn env_filter(level: Level) -> EnvFilter {
    let level_str = level.as_str().to_lowercase();
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "club={level_str},club_core={level_str},club_http={level_str},club_frontend_common={level_str}"
        )
        .into()
    })
}

fn init_file_logging(level: Level, data_dir: Option<PathBuf>) -> Result<()> {
    let log_file_path = get_log_file_path(data_dir);
    if let Some(parent) = log_file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .init();

    Ok(())
}

fn init_stderr_logging(level: Level) {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn get_log_file_path(data_dir: Option<PathBuf>) -> PathBuf {
    data_dir
        .unwrap_or_else(|| StorageConfig::default().data_dir)
        .join(LOG_FILE)
}
