//! Structured logging setup
//!
//! `RUST_LOG` takes precedence over the configured level. The CLI logs to
//! stderr so stdout stays clean for reports; the TUI owns the terminal, so its
//! logs go to a daily rolling file instead.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "vendtrack.log";

/// Where log output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Daily rolling file under the given directory
    File,
}

/// Build the level filter: `RUST_LOG` first, then the configured directive
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber. Keep the returned guard alive for file logging.
pub fn init_logging(
    config: &LoggingConfig,
    target: LogTarget,
    log_dir: Option<&Path>,
) -> Option<WorkerGuard> {
    let filter = build_filter(&config.level);
    let json = config.format == "json";

    match (target, log_dir) {
        (LogTarget::File, Some(dir)) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let registry = tracing_subscriber::registry().with(filter);
            let result = if json {
                registry
                    .with(fmt::layer().json().with_writer(writer).with_current_span(true))
                    .try_init()
            } else {
                registry
                    .with(fmt::layer().with_writer(writer).with_ansi(false))
                    .try_init()
            };
            result.ok().map(|_| guard)
        }
        _ => {
            let registry = tracing_subscriber::registry().with(filter);
            // Ignore a second initialization (e.g. from tests)
            let _ = if json {
                registry
                    .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
                    .try_init()
            } else {
                registry
                    .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                    .try_init()
            };
            None
        }
    }
}
