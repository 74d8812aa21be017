//! Tracing subscriber bootstrap.
//!
//! Always logs to stderr in the configured format; when a log directory
//! is configured a daily-rolled JSON file layer is added alongside it.
//! The returned guard must stay alive for the duration of the process or
//! buffered file output is lost.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::domain::models::LoggingConfig;

/// Log file name used inside the configured directory.
const LOG_FILE_PREFIX: &str = "agora.log";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured level when set. Returns the file
/// writer guard when file logging is enabled.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let (file_layer, guard) = match &config.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    if config.format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_guard_without_directory() {
        // Building the layers must not require a directory; init itself is
        // exercised once per process in the binary.
        let config = LoggingConfig::default();
        assert!(config.directory.is_none());
    }

    #[test]
    fn test_env_filter_accepts_configured_levels() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(level.parse::<EnvFilter>().is_ok());
        }
    }
}
