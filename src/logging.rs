use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{fmt::time::ChronoLocal, EnvFilter};

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Installs a subscriber that appends to `log_file`. The terminal is owned by
/// the UI, so without a log file nothing is installed and events are dropped.
pub fn init(log_file: Option<&String>, verbose: bool) -> Result<()> {
    let Some(log_file) = log_file else {
        return Ok(());
    };

    let path = shellexpand::tilde(log_file).to_string();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {path}"))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {e}"))
}
