//! Startup configuration and tracing setup

use tracing_subscriber::{fmt, EnvFilter};
use tw_shared::config::{AppConfig, ConfigError, LogFormat, LoggingConfig};

/// Load `.env` (if present), read the environment and validate the result
pub fn load() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();
    config.validate()?;
    Ok(config)
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level when both are present.
pub fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.clone()));

    let builder = fmt()
        .with_env_filter(filter)
        .with_ansi(logging.colored)
        .with_file(logging.source_location)
        .with_line_number(logging.source_location);

    let result = match logging.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    // A subscriber may already be installed, e.g. by a test harness
    if let Err(e) = result {
        eprintln!("tracing subscriber not installed: {}", e);
    }
}
