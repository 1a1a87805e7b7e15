use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::workspace_root;

/// Installs a subscriber that writes to `target/test-logs/sqlchat.log` and to stderr.
///
/// Safe to call from every test: the first call wins, later calls only get a guard for
/// their own (unused) writer.
pub fn init_test_tracing(level: Level) -> WorkerGuard {
    let env_filter = format!("{level},hyper_util=error,reqwest=warn,tokio_postgres=warn");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&env_filter));

    let log_dir = workspace_root().join("target/test-logs");
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::hourly(log_dir, "sqlchat.log");
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking_file)
        .with_ansi(false);

    // Also log to stderr so failing tests print captured diagnostics.
    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .without_time()
        .with_line_number(true)
        .with_test_writer();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    file_guard
}
