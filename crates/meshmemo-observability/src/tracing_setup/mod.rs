//! Subscriber installation, span macros, and structured event helpers.

pub mod events;
pub mod spans;

use tracing_subscriber::{fmt, EnvFilter};

/// Install a global `fmt` subscriber filtered by `RUST_LOG`, or by `level`
/// when `RUST_LOG` is unset.
///
/// Returns `false` when a global subscriber was already installed, so calling
/// this from several tests is harmless.
pub fn init(level: &str, json: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if json {
        fmt().with_env_filter(filter).json().try_init()
    } else {
        fmt().with_env_filter(filter).with_target(true).try_init()
    };
    result.is_ok()
}

/// `init` driven by the observability config section.
pub fn init_from_config(config: &meshmemo_core::config::ObservabilityConfig) -> bool {
    init(&config.log_level, config.json_logs)
}
