// Config loading and validation tests

use hostmon::config::AppConfig;
use std::time::Duration;

const VALID_CONFIG: &str = r#"
[sampling]
interval_ms = 1000
retry_initial_ms = 100
retry_max_ms = 30000
failure_capacity = 8

[output]
pretty = true
limit = 10
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.sampling.interval_ms, 1000);
    assert_eq!(config.sampling.retry_initial_ms, 100);
    assert_eq!(config.sampling.retry_max_ms, 30000);
    assert_eq!(config.sampling.failure_capacity, 8);
    assert!(config.output.pretty);
    assert_eq!(config.output.limit, Some(10));
}

#[test]
fn test_config_defaults_for_optional_fields() {
    let minimal = r#"
[sampling]
interval_ms = 500
retry_initial_ms = 50
retry_max_ms = 5000
"#;
    let config = AppConfig::load_from_str(minimal).expect("load_from_str");
    assert_eq!(config.sampling.failure_capacity, 16);
    assert!(!config.output.pretty);
    assert_eq!(config.output.limit, None);
}

#[test]
fn test_sampling_config_converts_millis() {
    let config = AppConfig::load_from_str(VALID_CONFIG).unwrap();
    let sampling = config.sampling_config();
    assert_eq!(sampling.interval, Duration::from_secs(1));
    assert_eq!(sampling.retry_initial, Duration::from_millis(100));
    assert_eq!(sampling.retry_max, Duration::from_secs(30));
    assert_eq!(sampling.failure_capacity, 8);
}

#[test]
fn test_config_validation_rejects_interval_zero() {
    let bad = VALID_CONFIG.replace("interval_ms = 1000", "interval_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("sampling.interval_ms"));
}

#[test]
fn test_config_validation_rejects_retry_initial_zero() {
    let bad = VALID_CONFIG.replace("retry_initial_ms = 100", "retry_initial_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("retry_initial_ms"));
}

#[test]
fn test_config_validation_rejects_retry_max_below_initial() {
    let bad = VALID_CONFIG.replace("retry_max_ms = 30000", "retry_max_ms = 50");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("retry_max_ms"));
}

#[test]
fn test_config_validation_rejects_failure_capacity_zero() {
    let bad = VALID_CONFIG.replace("failure_capacity = 8", "failure_capacity = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("failure_capacity"));
}

#[test]
fn test_config_validation_rejects_limit_zero() {
    let bad = VALID_CONFIG.replace("limit = 10", "limit = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("output.limit"));
}

#[test]
fn test_config_rejects_missing_sampling_section() {
    assert!(AppConfig::load_from_str("[output]\npretty = true\n").is_err());
}

#[test]
fn test_config_load_reads_config_file_env() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("hostmon.toml");
    std::fs::write(&path, VALID_CONFIG).unwrap();

    // SAFETY: no other test in this binary reads or writes CONFIG_FILE.
    unsafe { std::env::set_var("CONFIG_FILE", &path) };
    let config = AppConfig::load().expect("load from CONFIG_FILE");
    unsafe { std::env::remove_var("CONFIG_FILE") };

    assert_eq!(config.sampling.interval_ms, 1000);
}
