#![allow(clippy::unwrap_used)]
// Loading and saving config files on disk.

use std::time::Duration;

use pretty_assertions::assert_eq;

use powerscore_api::Environment;
use powerscore_config::{Config, load_config_from, save_config_to};

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[defaults]
output = "json"
timeout = 10

[endpoint]
environment = "stage"

[polling.templates]
interval_secs = 30
max_wait_secs = 900

[sampling]
target_url_count = 20
seed = 7
"#,
    )
    .unwrap();

    let config = load_config_from(&path).unwrap();
    assert_eq!(config.defaults.output, "json");
    assert_eq!(config.defaults.color, "auto");
    assert_eq!(config.endpoint.environment, Environment::Stage);

    let runtime = config.to_runtime_config().unwrap();
    assert_eq!(runtime.base_url, Environment::Stage.base_url());
    assert_eq!(runtime.timeout, Duration::from_secs(10));
    assert_eq!(runtime.polling.templates.interval, Duration::from_secs(30));
    assert_eq!(runtime.polling.templates.max_wait, Duration::from_secs(900));
    assert_eq!(runtime.polling.sitemap.max_wait, Duration::from_secs(300));
    assert_eq!(runtime.derivation.target_url_count, 20);
    assert_eq!(runtime.derivation.sampling_seed, Some(7));
}

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.defaults.color = "never".into();
    config.endpoint.base_url = Some("http://localhost:9080/api/v1/web/powerscore".into());
    config.polling.psi.max_wait_secs = 240;
    save_config_to(&config, &path).unwrap();

    assert_eq!(load_config_from(&path).unwrap(), config);
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[defaults]\ntimeout = \"soon\"\n").unwrap();

    let err = load_config_from(&path).unwrap_err();
    assert!(err.to_string().starts_with("config loading failed"), "{err}");
}
