//! Persistence round-trip and edge case tests.
//!
//! Tests file I/O operations, JSON persistence, and config round-trip.

use std::path::PathBuf;
use tempfile::TempDir;

use crate::config::Config;
use crate::error::StoreError;
use crate::persistence::{load_json, save_json};
use datanozzle_fetch::DEFAULT_BASE_URL;

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[test]
fn test_save_and_load_json_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("test.json");

    let config = Config {
        rows_per_page: Some(25),
        ..Config::default()
    };

    save_json(&file_path, &config).unwrap();
    let loaded: Config = load_json(&file_path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested_path = temp_dir.path().join("deeply").join("nested").join("config.json");

    let data = serde_json::json!({"key": "value"});

    assert!(save_json(&nested_path, &data).is_ok());
    assert!(nested_path.exists());
    assert!(!nested_path.with_extension("json.tmp").exists());
}

#[test]
fn test_load_nonexistent_file() {
    let file_path = PathBuf::from("/nonexistent/path/config.json");

    let result: Result<Config, _> = load_json(&file_path);
    assert!(result.unwrap_err().is_not_found());
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_missing_file_gives_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::load_from(&temp_dir.path().join("absent.json")).unwrap();

    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.timeout_secs, 30);
    assert!(config.rows_per_page.is_none());
}

#[test]
fn test_config_partial_file_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("config.json");
    std::fs::write(&file_path, r#"{"base_url": "https://dg.example.org/"}"#).unwrap();

    let config = Config::load_from(&file_path).unwrap();
    assert_eq!(config.base_url, "https://dg.example.org/");
    assert_eq!(config.timeout_secs, 30);
    assert_eq!(config.log_level, "warn");
}

#[test]
fn test_config_save_to_and_load_from() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("datanozzle").join("config.json");

    let config = Config {
        base_url: "https://dg.example.org/datagrepper/".to_string(),
        allowed_domains: Some(vec!["example.org".to_string()]),
        ..Config::default()
    };
    config.save_to(&file_path).unwrap();

    assert_eq!(Config::load_from(&file_path).unwrap(), config);
}

#[test]
fn test_config_rejects_bad_values() {
    let bad_url = Config {
        base_url: "not a url".to_string(),
        ..Config::default()
    };
    assert!(matches!(bad_url.validate(), Err(StoreError::Config(_))));

    let bad_scheme = Config {
        base_url: "ftp://dg.example.org/".to_string(),
        ..Config::default()
    };
    assert!(bad_scheme.validate().is_err());

    let zero_timeout = Config {
        timeout_secs: 0,
        ..Config::default()
    };
    assert!(zero_timeout.validate().is_err());

    let zero_rows = Config {
        rows_per_page: Some(0),
        ..Config::default()
    };
    assert!(zero_rows.validate().is_err());
}

#[test]
fn test_invalid_config_file_is_rejected_on_load() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("config.json");
    std::fs::write(&file_path, r#"{"timeout_secs": 0}"#).unwrap();

    assert!(matches!(
        Config::load_from(&file_path),
        Err(StoreError::Config(_))
    ));
}

#[test]
fn test_corrupt_config_file_is_an_error_not_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("config.json");
    std::fs::write(&file_path, "{not json").unwrap();

    assert!(matches!(
        Config::load_from(&file_path),
        Err(StoreError::Serialization(_))
    ));
}

#[test]
fn test_transport_errors_keep_their_kind() {
    let err = StoreError::from(datanozzle_fetch::FetchError::DomainNotAllowed(
        "evil.example".to_string(),
    ));

    match err {
        StoreError::Fetch(inner) => assert!(inner.is_transport()),
        other => panic!("expected StoreError::Fetch, got {other:?}"),
    }
}

#[test]
fn test_config_builds_transport() {
    let config = Config {
        allowed_domains: Some(vec!["dg.example.org".to_string()]),
        ..Config::default()
    };
    assert!(config.transport().is_ok());
}

#[test]
fn test_config_query_applies_settings() {
    let config = Config {
        base_url: "https://dg.example.org/datagrepper".to_string(),
        rows_per_page: Some(50),
        ..Config::default()
    };

    let query = config.query().unwrap();
    assert_eq!(query.base_url(), "https://dg.example.org/datagrepper/");
    assert_eq!(
        query.params().get("rows_per_page").and_then(|v| v.as_single()),
        Some("50")
    );
}
