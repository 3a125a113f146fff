//! Config validation
//!
//! Rules:
//! - batch_threshold >= 1
//! - topic non-empty
//! - csv sink path non-empty and names a file

use contracts::{ContractError, SinkKind, TelemetryConfig};
use ::validator::{Validate, ValidationErrors};

/// Validate a TelemetryConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &TelemetryConfig) -> Result<(), ContractError> {
    config.validate().map_err(first_field_error)?;
    validate_sink(config)?;
    Ok(())
}

/// Map derive-level errors to the first offending field
fn first_field_error(errors: ValidationErrors) -> ContractError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    match fields.first() {
        Some((field, errs)) => {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "invalid value".to_string());
            ContractError::config_validation(field.to_string(), message)
        }
        None => ContractError::config_validation("config", errors.to_string()),
    }
}

/// Validate sink settings
fn validate_sink(config: &TelemetryConfig) -> Result<(), ContractError> {
    if config.sink.kind != SinkKind::Csv {
        return Ok(());
    }

    let path = &config.sink.path;
    if path.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "sink.path",
            "csv sink path cannot be empty",
        ));
    }
    if path.file_name().is_none() {
        return Err(ContractError::config_validation(
            "sink.path",
            format!("csv sink path '{}' does not name a file", path.display()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_config() {
        assert!(validate(&TelemetryConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_threshold() {
        let config = TelemetryConfig {
            batch_threshold: 0,
            ..Default::default()
        };
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("batch_threshold"), "got: {err}");
    }

    #[test]
    fn test_empty_topic() {
        let config = TelemetryConfig {
            topic: String::new(),
            ..Default::default()
        };
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("topic cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_empty_sink_path() {
        let mut config = TelemetryConfig::default();
        config.sink.path = PathBuf::new();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_directory_sink_path() {
        let mut config = TelemetryConfig::default();
        config.sink.path = PathBuf::from("/");
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("does not name a file"), "got: {err}");
    }

    #[test]
    fn test_log_sink_ignores_path() {
        let mut config = TelemetryConfig::default();
        config.sink.kind = SinkKind::Log;
        config.sink.path = PathBuf::new();
        assert!(validate(&config).is_ok());
    }
}
