use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Device command timeout is not 0
/// - Event heartbeat interval is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.device.command_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "device.command_timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.events.heartbeat_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "events.heartbeat_interval_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
