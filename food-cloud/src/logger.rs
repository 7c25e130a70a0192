//! Logging Infrastructure
//!
//! Console output for operators plus an optional daily-rotated JSON log file.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Default filter when neither `RUST_LOG` nor `LOG_LEVEL` is set
pub const DEFAULT_FILTER: &str = "food_cloud=info,tower_http=info";

/// Initialize the global subscriber
///
/// `RUST_LOG` wins over `log_level`. When `log_dir` is given the directory is
/// created and a `food-cloud.log.<date>` file is written next to stdout. The
/// returned guard must outlive the server.
pub fn init_logger(log_level: &str, log_dir: Option<&str>) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stdout_layer = fmt::layer().with_target(true).with_writer(std::io::stdout);

    let (file_layer, guard) = match log_dir.and_then(prepare_log_dir) {
        Some(dir) => {
            let file_appender = rolling::daily(dir, "food-cloud.log");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_current_span(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard
}

fn prepare_log_dir(dir: &str) -> Option<&Path> {
    let path = Path::new(dir);
    match std::fs::create_dir_all(path) {
        Ok(()) => Some(path),
        Err(e) => {
            eprintln!("Log directory {dir} unavailable, logging to stdout only: {e}");
            None
        }
    }
}
