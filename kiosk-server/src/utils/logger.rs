//! Logging setup
//!
//! tracing-subscriber with env-filter; the file variant adds a daily
//! rolling log under `<work_dir>/logs`.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"))
}

/// Console-only logging (tests, dev)
pub fn init_logger() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer())
        .init();
}

/// Console + daily rolling file under `<work_dir>/logs`.
/// The returned guard must be held for the lifetime of the process.
pub fn init_logger_with_file(work_dir: &Path) -> std::io::Result<WorkerGuard> {
    let log_dir = work_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let appender = tracing_appender::rolling::daily(&log_dir, "kiosk-server.log");
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer())
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();

    Ok(guard)
}
