use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, LoggingConfig};

/// `RUST_LOG` wins when set; otherwise `logging.level` from the config.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.level.trim())
            .map_err(|e| ConfigError::Invalid(format!("invalid logging.level: {e}")))?,
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}
