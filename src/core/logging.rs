use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::core::config::AppPaths;

/// Daily files under `<data dir>/logs/`, e.g. `server.log.2026-10-18`.
pub const LOG_FILE_PREFIX: &str = "server.log";

/// Keeps sqlx statement logging and hyper connection chatter out of the
/// default output; `RUST_LOG` replaces the whole filter.
const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Installs stdout plus rolling-file logging. Only the first call installs a
/// subscriber.
pub fn init(paths: &AppPaths) {
    let file_appender = tracing_appender::rolling::daily(&paths.log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    if LOG_GUARD.set(guard).is_err() {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init();

    if installed.is_ok() {
        tracing::info!(
            "Logging to {} (data dir {})",
            paths.log_dir.join(LOG_FILE_PREFIX).display(),
            paths.user_data_dir.display()
        );
    }
}
