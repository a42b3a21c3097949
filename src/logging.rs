//! Logging setup.
//!
//! All binaries write timestamped events to one plain-text log file through a
//! non-blocking `tracing-appender` writer. `RUST_LOG` overrides the default
//! `info` filter.

use anyhow::Context;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber writing to `log_file`.
///
/// With `emit_stderr` events are mirrored to stderr as well. The returned
/// guard flushes the file writer on drop and must live until exit.
pub fn init(log_file: &Path, emit_stderr: bool) -> anyhow::Result<WorkerGuard> {
    let dir = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let file_name = log_file
        .file_name()
        .with_context(|| format!("log path has no file name: {}", log_file.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
    let stderr_layer = emit_stderr.then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    Ok(guard)
}
