//! Tracing subscriber setup

use std::path::Path;

use clap::ValueEnum;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::config::data_dir;

/// Environment variable holding a tracing filter directive
pub const LOG_ENV: &str = "CHARTUP_LOG";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Filter from `CHARTUP_LOG`, else `debug` when verbose and `warn` otherwise
fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }))
}

/// Log file writer in `dir`, or stderr when the file cannot be opened
fn writer(dir: &Path) -> (NonBlocking, WorkerGuard) {
    let appender = std::fs::create_dir_all(dir).ok().and_then(|_| {
        RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix("chartup")
            .filename_suffix("log")
            .build(dir)
            .ok()
    });

    match appender {
        Some(appender) => tracing_appender::non_blocking(appender),
        None => tracing_appender::non_blocking(std::io::stderr()),
    }
}

/// Installs the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init(verbose: bool, format: LogFormat) -> WorkerGuard {
    let (writer, guard) = writer(&data_dir());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(writer)
        .with_ansi(false);

    // Another subscriber may already be installed (tests); keep it.
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    guard
}
