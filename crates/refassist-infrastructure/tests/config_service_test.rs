use refassist_core::config::{ENV_ENDPOINT, ENV_POLL_INTERVAL_MS};
use refassist_infrastructure::ConfigService;
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn missing_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

    let config = service.load_with_env(|_| None).await.unwrap();

    assert_eq!(config.remote.endpoint, "http://localhost:3030");
    assert_eq!(config.polling.max_consecutive_errors, 3);
}

#[tokio::test]
async fn file_values_are_overridden_by_environment() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[remote]
endpoint = "https://assess.internal"

[polling]
interval_ms = 1000

[artifacts]
directory = "/tmp/plans"
"#,
    )
    .unwrap();

    let config = ConfigService::with_path(&path)
        .load_with_env(|key| (key == ENV_POLL_INTERVAL_MS).then(|| "250".to_string()))
        .await
        .unwrap();

    assert_eq!(config.remote.endpoint, "https://assess.internal");
    assert_eq!(config.polling.interval_ms, 250);
    assert_eq!(
        config.artifacts.directory.as_deref(),
        Some(std::path::Path::new("/tmp/plans"))
    );

    let config = ConfigService::with_path(&path)
        .load_with_env(|key| (key == ENV_ENDPOINT).then(|| "http://127.0.0.1:9".to_string()))
        .await
        .unwrap();
    assert_eq!(config.remote.endpoint, "http://127.0.0.1:9");
}

#[tokio::test]
async fn invalid_file_is_a_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "[polling]\ninterval_ms = \"soon\"").unwrap();

    let err = ConfigService::with_path(&path)
        .load_with_env(|_| None)
        .await
        .unwrap_err();

    assert!(err.is_config());
}
