//! Configuration and settings management for RoofKit
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - Service settings (imagery calibration, collaborator timeouts)
//! - Storage settings (local snapshot cache location and key)
//! - Pricing settings (product page fetching and staleness)
//! - Display settings (unit system)

pub use roofkit_core::units::MeasurementSystem;
use roofkit_core::constants::{AERIAL_ZOOM, SNAPSHOT_CACHE_KEY, SURFACE_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// External collaborator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Static map zoom level (must match the scale calibration)
    pub zoom: u8,
    /// Static map image edge length in pixels (must match the scale calibration)
    pub image_size: u32,
    /// Geocoder timeout in milliseconds
    pub geocode_timeout_ms: u64,
    /// Aerial imagery timeout in milliseconds
    pub imagery_timeout_ms: u64,
    /// Remote measurement store timeout in milliseconds
    pub store_timeout_ms: u64,
    /// Skip the second snapshot lookup when the formatted address equals the input
    pub skip_duplicate_lookup: bool,
    /// Static map API key
    pub maps_api_key: Option<String>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            zoom: AERIAL_ZOOM,
            image_size: SURFACE_SIZE,
            geocode_timeout_ms: 10_000,
            imagery_timeout_ms: 10_000,
            store_timeout_ms: 10_000,
            skip_duplicate_lookup: true,
            maps_api_key: None,
        }
    }
}

impl ServiceSettings {
    pub fn geocode_timeout(&self) -> Duration {
        Duration::from_millis(self.geocode_timeout_ms)
    }

    pub fn imagery_timeout(&self) -> Duration {
        Duration::from_millis(self.imagery_timeout_ms)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

/// Local snapshot cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding the cache files
    pub cache_dir: PathBuf,
    /// Fixed key of the current snapshot
    pub cache_key: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("roofkit");
        Self {
            cache_dir,
            cache_key: SNAPSHOT_CACHE_KEY.to_string(),
        }
    }
}

/// Product pricing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// Product page fetch timeout in milliseconds
    pub scrape_timeout_ms: u64,
    /// Minimum spacing between requests to one host in milliseconds
    pub min_request_spacing_ms: u64,
    /// Catalog entries older than this are refreshed
    pub stale_after_days: i64,
    /// Prices above this are rejected as extraction mistakes
    pub max_reasonable_price: f64,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            scrape_timeout_ms: 15_000,
            min_request_spacing_ms: 2_000,
            stale_after_days: 7,
            max_reasonable_price: 10_000.0,
        }
    }
}

impl PricingSettings {
    pub fn scrape_timeout(&self) -> Duration {
        Duration::from_millis(self.scrape_timeout_ms)
    }

    pub fn min_request_spacing(&self) -> Duration {
        Duration::from_millis(self.min_request_spacing_ms)
    }
}

/// Display preferences
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Unit system used for printed results
    pub measurement_system: MeasurementSystem,
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// External collaborator settings
    pub services: ServiceSettings,
    /// Local cache settings
    pub storage: StorageSettings,
    /// Pricing settings
    pub pricing: PricingSettings,
    /// Display preferences
    pub display: DisplaySettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location (`<config dir>/roofkit/config.toml`)
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("roofkit").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match extension(path) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            }
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load config from file, or defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| SettingsError::SaveError(e.to_string()))?,
            other => {
                return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            }
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        tracing::info!("Saved configuration to {}", path.display());

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        // The scale constant is calibrated for one zoom and image size only
        if self.services.zoom != AERIAL_ZOOM {
            return Err(ConfigError::CalibrationMismatch {
                key: "services.zoom".to_string(),
                expected: u32::from(AERIAL_ZOOM),
                actual: u32::from(self.services.zoom),
            });
        }

        if self.services.image_size != SURFACE_SIZE {
            return Err(ConfigError::CalibrationMismatch {
                key: "services.image_size".to_string(),
                expected: SURFACE_SIZE,
                actual: self.services.image_size,
            });
        }

        for (key, value) in [
            ("services.geocode_timeout_ms", self.services.geocode_timeout_ms),
            ("services.imagery_timeout_ms", self.services.imagery_timeout_ms),
            ("services.store_timeout_ms", self.services.store_timeout_ms),
            ("pricing.scrape_timeout_ms", self.pricing.scrape_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ValueOutOfRange {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }

        if self.storage.cache_key.trim().is_empty() {
            return Err(ConfigError::MissingKey("storage.cache_key".to_string()));
        }

        if self.pricing.stale_after_days < 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "pricing.stale_after_days".to_string(),
                value: self.pricing.stale_after_days.to_string(),
            });
        }

        if self.pricing.max_reasonable_price <= 0.0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "pricing.max_reasonable_price".to_string(),
                value: self.pricing.max_reasonable_price.to_string(),
            });
        }

        Ok(())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}
