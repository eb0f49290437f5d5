use roofkit_settings::{Config, ConfigError, MeasurementSystem, SettingsError};
use tempfile::tempdir;

#[test]
fn test_toml_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.services.geocode_timeout_ms = 4_000;
    config.services.skip_duplicate_lookup = false;
    config.display.measurement_system = MeasurementSystem::Metric;
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");

    let mut config = Config::default();
    config.pricing.stale_after_days = 3;
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded.pricing.stale_after_days, 3);
}

#[test]
fn test_unsupported_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    let err = Config::default().save_to_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Config(ConfigError::UnsupportedFormat(ref ext)) if ext == "yaml"
    ));
}

#[test]
fn test_load_or_default_missing_file() {
    let dir = tempdir().unwrap();
    let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[services]\nimage_size = 512\n").unwrap();
    let err = Config::load_from_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Config(ConfigError::CalibrationMismatch {
            expected: 640,
            actual: 512,
            ..
        })
    ));
}
