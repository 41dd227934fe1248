//! File logging. stdout belongs to the TUI, so logs only go to a file and only
//! when `SENTRYTOP_LOG` is set (an EnvFilter directive, e.g. `debug` or `sentrytop=trace`).

use std::{fs, path::PathBuf, sync::Mutex};

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SENTRYTOP_LOG";

pub fn log_path() -> PathBuf {
    let base = std::env::var_os("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(dirs_next::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("sentrytop").join("sentrytop.log")
}

/// Install the global subscriber. Returns the log file path when logging is on.
pub fn init_logging() -> anyhow::Result<Option<PathBuf>> {
    let Some(directive) = std::env::var(LOG_ENV).ok().filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    let path = log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&directive)?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing init failed: {e}"))?;
    Ok(Some(path))
}
