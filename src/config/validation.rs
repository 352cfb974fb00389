//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Smallest accepted `server.max_line_len`.
const MIN_LINE_LEN: usize = 64;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.welcome must not be empty")]
    EmptyWelcome,
    #[error("server.welcome must be a single line")]
    MultilineWelcome,
    #[error("server.max_line_len must be at least {MIN_LINE_LEN}, got {0}")]
    LineLimitTooSmall(usize),
    #[error("server.send_queue_len must be at least 1")]
    EmptySendQueue,
    #[error(
        "faults.connection_loss_min_secs ({min}) must be below faults.connection_loss_max_secs ({max})"
    )]
    InvalidConnectionLossWindow { min: u64, max: u64 },
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let welcome = &config.server.welcome;
    if welcome.trim().is_empty() {
        errors.push(ValidationError::EmptyWelcome);
    }
    if welcome.contains(['\r', '\n']) {
        errors.push(ValidationError::MultilineWelcome);
    }

    if config.server.max_line_len < MIN_LINE_LEN {
        errors.push(ValidationError::LineLimitTooSmall(config.server.max_line_len));
    }
    if config.server.send_queue_len == 0 {
        errors.push(ValidationError::EmptySendQueue);
    }

    // The window is only consulted when connection loss is simulated, but a
    // broken window is a config mistake either way.
    let faults = &config.faults;
    if faults.connection_loss_min_secs >= faults.connection_loss_max_secs {
        errors.push(ValidationError::InvalidConnectionLossWindow {
            min: faults.connection_loss_min_secs,
            max: faults.connection_loss_max_secs,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_welcome_fails() {
        let toml = r#"
[server]
welcome = "   "
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::EmptyWelcome)));
    }

    #[test]
    fn test_multiline_welcome_fails() {
        let toml = r#"
[server]
welcome = "line one\nline two"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::MultilineWelcome)));
    }

    #[test]
    fn test_inverted_connection_loss_window_fails() {
        let toml = r#"
[faults]
connection_loss = true
connection_loss_min_secs = 20
connection_loss_max_secs = 10
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::InvalidConnectionLossWindow { min: 20, max: 10 }
        )));
    }

    #[test]
    fn test_zero_send_queue_fails() {
        let toml = r#"
[server]
send_queue_len = 0
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(matches!(errors[..], [ValidationError::EmptySendQueue]));
    }

    #[test]
    fn test_all_errors_reported() {
        let toml = r#"
[server]
welcome = ""
max_line_len = 8

[faults]
connection_loss_min_secs = 5
connection_loss_max_secs = 5
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
