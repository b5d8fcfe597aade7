// Logging - tracing subscriber setup for hosts embedding the engine
// The engine itself only emits events; installing a subscriber is the host's call

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::EngineConfig;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Filter for `level`, or `RUST_LOG` when it is set.
pub fn env_filter(level: &str) -> EnvFilter {
    let level = if level.trim().is_empty() {
        DEFAULT_LOG_LEVEL
    } else {
        level
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install a console subscriber filtered at `level`.
///
/// Returns `false` when a global subscriber was already installed, in which
/// case nothing changes.
pub fn init_logging(level: &str) -> bool {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(console_layer)
        .try_init()
        .is_ok()
}

pub fn init_from_config(config: &EngineConfig) -> bool {
    init_logging(&config.log_level)
}
