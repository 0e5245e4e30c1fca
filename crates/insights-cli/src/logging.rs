use tracing_subscriber::EnvFilter;

use crate::types::LogLevel;

/// Install the stderr subscriber; `RUST_LOG` wins over `--log-level` when set
pub fn init(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
