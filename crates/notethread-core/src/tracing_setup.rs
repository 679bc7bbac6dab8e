use std::fs::OpenOptions;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable naming an optional debug log file
pub const LOG_FILE_ENV: &str = "NOTETHREAD_LOG_FILE";

pub fn init_tracing() {
    init_tracing_with_default("warn");
}

/// Install the global subscriber.
///
/// Stderr output honours `RUST_LOG` and falls back to `default_filter`.
/// When `NOTETHREAD_LOG_FILE` is set, everything at DEBUG and above is also
/// appended to that file. Calling this twice is harmless; the second
/// registration is ignored.
pub fn init_tracing_with_default(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter);

    let registry = tracing_subscriber::registry().with(stderr_layer);

    let file = std::env::var(LOG_FILE_ENV).ok().and_then(|log_path| {
        match OpenOptions::new().create(true).append(true).open(&log_path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("Failed to open log file {}: {}", log_path, e);
                None
            }
        }
    });

    if let Some(file) = file {
        let file_layer = fmt::layer()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG);

        let _ = registry.with(file_layer).try_init();
    } else {
        let _ = registry.try_init();
    }
}
