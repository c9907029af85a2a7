use flint_core::config::*;
use std::fs;
use tempfile::NamedTempFile;

#[test]
fn test_default_config() {
    let config = AppConfig::default();
    assert!(config.validate().is_ok());

    // 验证默认值
    assert_eq!(config.cluster.max_tries, 10);
    assert_eq!(config.coordinator.probe_lifetime_ms, 2000);
    assert_eq!(config.worker.data_freshness_ms, 5000);
    assert!(config.api.enabled);
}

#[test]
fn test_config_from_toml() {
    let toml_content = r#"
[cluster]
app_prefix = "flint-test"
num_workers = 4
max_tries = 3

[coordinator]
probe_lifetime_ms = 200
probe_timeout_ms = 300
probe_interval_ms = 50
request_lifetime_ms = 1000
verify_responses = false

[worker]
manifest_path = "/tmp/manifest.json"
keychain_dir = "/tmp/keys"
data_freshness_ms = 5000
ready_freshness_ms = 1000

[api]
enabled = false
bind_address = "127.0.0.1:9090"
request_timeout_ms = 2000
"#;

    let config = AppConfig::from_toml(toml_content).unwrap();
    assert_eq!(config.cluster.app_prefix, "flint-test");
    assert_eq!(config.cluster.num_workers, 4);
    assert_eq!(config.coordinator.probe_interval().as_millis(), 50);
    assert!(!config.coordinator.verify_responses);
    assert!(!config.api.enabled);
}

#[test]
fn test_config_invalid_section_rejected() {
    let toml_content = r#"
[cluster]
app_prefix = "/"
num_workers = 1
max_tries = 3

[coordinator]
probe_lifetime_ms = 200
probe_timeout_ms = 300
probe_interval_ms = 50
request_lifetime_ms = 1000
verify_responses = true

[worker]
manifest_path = ""
keychain_dir = "/tmp/keys"
data_freshness_ms = 5000
ready_freshness_ms = 1000

[api]
enabled = true
bind_address = "127.0.0.1:9090"
request_timeout_ms = 2000
"#;

    assert!(AppConfig::from_toml(toml_content).is_err());
}

#[test]
fn test_load_from_partial_file_fills_defaults() {
    let file = NamedTempFile::with_suffix(".toml").unwrap();
    fs::write(
        file.path(),
        r#"
[cluster]
app_prefix = "partial"
max_tries = 5
"#,
    )
    .unwrap();

    let config = AppConfig::load(Some(file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.cluster.max_tries, 5);
    assert_eq!(config.coordinator.probe_timeout_ms, 3000);
    assert_eq!(config.worker.ready_freshness_ms, 1000);
}

#[test]
fn test_load_missing_file_fails() {
    assert!(AppConfig::load(Some("/definitely/not/here/flint.toml")).is_err());
}
