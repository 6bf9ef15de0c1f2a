// animal-talk-core/src/logging.rs

//! Shared `tracing` setup for the binaries.
//!
//! Logs always go to stderr, since the tool server speaks MCP over stdout.
//! An optional plain-text copy is written under the user's cache directory.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io;
use std::path::PathBuf;
use time::macros::format_description;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, time::LocalTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Keeps the file writer flushing; drop it only at exit.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
    pub log_path: Option<PathBuf>,
}

/// Maps a `-v` count onto a default level. `RUST_LOG` takes precedence.
pub fn level_for_verbosity(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

pub fn log_dir() -> Option<PathBuf> {
    dirs::cache_dir()
        .or_else(dirs::runtime_dir)
        .or_else(|| Some(std::env::temp_dir()))
        .map(|d| d.join("animal-talk"))
}

/// Installs the global subscriber. With `log_file_name` set, also logs to
/// `<cache dir>/animal-talk/<log_file_name>`.
pub fn init_logging(verbose: u8, log_file_name: Option<&str>) -> Result<LoggingGuard> {
    let default_level = level_for_verbosity(verbose);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default_level.into()));

    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_timer(timer.clone())
        .with_target(false)
        .with_level(true);

    let (file_layer, file_guard, log_path) = match log_file_name {
        Some(name) => {
            let dir = log_dir().ok_or_else(|| anyhow!("Could not determine a directory for log files"))?;
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(&dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(timer)
                .with_target(true)
                .with_line_number(true);
            (Some(layer), Some(guard), Some(dir.join(name)))
        }
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!(
        "Logging initialized. Level determined by RUST_LOG or -v flags (default: {}).",
        default_level
    );
    Ok(LoggingGuard {
        _file_guard: file_guard,
        log_path,
    })
}
