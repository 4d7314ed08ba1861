//! Tracing subscriber setup shared by the binaries.

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    /// Required when something else owns the terminal.
    File,
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for as long as the program logs.
pub fn init_tracing(config: &LoggingConfig, sink: LogSink) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("Failed to create tracing filter")?;

    let sink = if config.log_to_file { LogSink::File } else { sink };

    match sink {
        LogSink::Stderr => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .with(filter)
                .try_init()
                .context("Failed to initialize tracing")?;
            Ok(None)
        }
        LogSink::File => {
            let path = &config.log_file;
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .context("logging.log_file must name a file")?;

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_line_number(true)
                        .with_writer(writer),
                )
                .with(filter)
                .try_init()
                .context("Failed to initialize tracing")?;
            Ok(Some(guard))
        }
    }
}
