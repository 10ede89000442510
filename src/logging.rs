//! Structured logging setup using the `tracing` ecosystem.
//!
//! Configures a `tracing-subscriber` registry with a console layer that
//! is either JSON (for production) or pretty-printed (for TTY / local
//! dev), plus an optional plain-text layer appending to the configured
//! log file. Format is auto-detected from the terminal but can be forced
//! via `--json` or `--pretty`.
//!
//! File output goes through `tracing_appender::non_blocking`, so request
//! handlers never wait on disk writes. The returned [`WorkerGuard`] must
//! stay alive until shutdown or buffered lines are lost.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::LogLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[must_use]
pub fn resolve_format(pretty: bool, json: bool) -> LogFormat {
    if json {
        LogFormat::Json
    } else if pretty || std::io::IsTerminal::is_terminal(&std::io::stdout()) {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

/// An appender for `dir/file` that never rotates. The directory is
/// created if missing.
pub fn file_appender(dir: &Path, file: &str) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file)
        .build(dir)
}

/// Install the global subscriber.
///
/// A log file that cannot be opened is not fatal: the console layer is
/// still installed and a warning names the file and the error.
pub fn init(
    level: &LogLevel,
    format: LogFormat,
    log_file: Option<(&Path, &str)>,
) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::filter::Targets::new().with_default(level.to_tracing_level());

    let (json_layer, pretty_layer) = match format {
        LogFormat::Json => (Some(fmt::layer().json().with_target(false)), None),
        LogFormat::Pretty => (None, Some(fmt::layer().pretty())),
    };

    let mut file_error = None;
    let mut guard = None;
    let file_layer = log_file.and_then(|(dir, file)| match file_appender(dir, file) {
        Ok(appender) => {
            let (writer, worker) = tracing_appender::non_blocking(appender);
            guard = Some(worker);
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(writer),
            )
        }
        Err(e) => {
            file_error = Some((dir.join(file).display().to_string(), e));
            None
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .with(file_layer)
        .init();

    if let Some((path, error)) = file_error {
        tracing::warn!(path = %path, error = %error, "cannot open log file, logging to console only");
    }
    guard
}
