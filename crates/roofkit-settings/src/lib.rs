//! RoofKit Settings Crate
//!
//! Handles application configuration: collaborator timeouts, the local
//! snapshot cache location, pricing behaviour, and display units.

pub mod config;
pub mod error;

pub use config::{
    Config, DisplaySettings, MeasurementSystem, PricingSettings, ServiceSettings, StorageSettings,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
