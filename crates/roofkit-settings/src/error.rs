//! Errors raised while reading, writing and checking the RoofKit config file.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    /// The config file exists but could not be read.
    #[error("Failed to load settings: {0}")]
    LoadError(String),

    #[error("Failed to save settings: {0}")]
    SaveError(String),

    /// No platform config directory to hold `roofkit/config.toml`.
    #[error("Config directory error: {0}")]
    ConfigDirectory(String),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The file parsed but holds values the capture pipeline cannot use.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// A parsed config that fails validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required key is missing or blank, such as the measurement cache key.
    #[error("Missing configuration key: {0}")]
    MissingKey(String),

    /// Only `.toml` and `.json` files are read and written.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// The imagery request differs from what the pixel scale was calibrated
    /// against, so every measurement would be wrong.
    #[error("'{key}' must be {expected} for the calibrated scale, got {actual}")]
    CalibrationMismatch {
        key: String,
        expected: u32,
        actual: u32,
    },

    /// A timeout, staleness window or price ceiling outside its usable range.
    #[error("Value out of range for '{key}': {value}")]
    ValueOutOfRange { key: String, value: String },
}

pub type SettingsResult<T> = Result<T, SettingsError>;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_error_display() {
        let err = SettingsError::LoadError("config.toml: permission denied".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to load settings: config.toml: permission denied"
        );

        let err = SettingsError::ConfigDirectory("no platform config directory".to_string());
        assert_eq!(
            err.to_string(),
            "Config directory error: no platform config directory"
        );
    }

    #[test]
    fn test_calibration_mismatch_display() {
        let err = ConfigError::CalibrationMismatch {
            key: "services.image_size".to_string(),
            expected: 640,
            actual: 512,
        };
        assert_eq!(
            err.to_string(),
            "'services.image_size' must be 640 for the calibrated scale, got 512"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingKey("storage.cache_key".to_string());
        assert_eq!(
            err.to_string(),
            "Missing configuration key: storage.cache_key"
        );

        let err = ConfigError::UnsupportedFormat("yaml".to_string());
        assert_eq!(err.to_string(), "Unsupported config format: yaml");

        let err = ConfigError::ValueOutOfRange {
            key: "pricing.stale_after_days".to_string(),
            value: "-1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Value out of range for 'pricing.stale_after_days': -1"
        );
    }

    #[test]
    fn test_error_conversion() {
        let config_err = ConfigError::MissingKey("storage.cache_key".to_string());
        let settings_err: SettingsError = config_err.into();
        assert!(matches!(
            settings_err,
            SettingsError::Config(ConfigError::MissingKey(_))
        ));

        let io_err = io::Error::new(io::ErrorKind::NotFound, "config.toml");
        let settings_err: SettingsError = io_err.into();
        assert!(matches!(settings_err, SettingsError::IoError(_)));
    }
}
