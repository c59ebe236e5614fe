//! Daemon configuration specs
//!
//! Verify that environment and config-file choices reach the backend the
//! daemon boots.

use crate::prelude::*;
use std::collections::HashMap;
use tempfile::TempDir;

fn resolve(dir: &TempDir, extra: &[(&str, &str)]) -> Result<Config, kvs_daemon::ConfigError> {
    let mut vars: HashMap<String, String> = extra
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    vars.insert(
        "KVS_STATE_DIR".to_string(),
        dir.path().display().to_string(),
    );
    Config::resolve(|name: &str| vars.get(name).cloned())
}

#[tokio::test]
async fn sqlite_backend_from_env_persists_in_its_table() {
    let dir = TempDir::new().unwrap();
    let config = resolve(&dir, &[("KVS_BACKEND", "sqlite"), ("KVS_SQLITE_TABLE", "events")])
        .unwrap();

    let daemon = lifecycle::startup(&config).await.unwrap();
    daemon.service.put("foo", "bar").await.unwrap();
    daemon.shutdown().await;

    assert!(dir.path().join("transactions.db").exists());
    assert!(!dir.path().join("transactions.log").exists());

    let daemon = lifecycle::startup(&config).await.unwrap();
    assert_eq!(daemon.service.get("foo").unwrap(), "bar");
    daemon.shutdown().await;
}

#[tokio::test]
async fn backends_do_not_share_state() {
    let dir = TempDir::new().unwrap();
    let file = resolve(&dir, &[("KVS_BACKEND", "file")]).unwrap();
    let sqlite = resolve(&dir, &[("KVS_BACKEND", "sqlite")]).unwrap();

    let daemon = lifecycle::startup(&file).await.unwrap();
    daemon.service.put("only-in-file", "1").await.unwrap();
    daemon.shutdown().await;

    let daemon = lifecycle::startup(&sqlite).await.unwrap();
    assert!(daemon.service.store().is_empty());
    daemon.shutdown().await;
}

#[tokio::test]
async fn config_file_selects_backend_location() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("kvs.toml"),
        "[backend]\nkind = \"file\"\npath = \"wal/kv.log\"\n",
    )
    .unwrap();
    let config = resolve(&dir, &[]).unwrap();

    let daemon = lifecycle::startup(&config).await.unwrap();
    daemon.service.put("k", "v").await.unwrap();
    daemon.shutdown().await;

    let content = std::fs::read_to_string(dir.path().join("wal/kv.log")).unwrap();
    assert_eq!(content, "1\t2\tk\tv\n");
}

#[test]
fn unknown_backend_is_a_config_error() {
    let dir = TempDir::new().unwrap();

    let err = resolve(&dir, &[("KVS_BACKEND", "postgres")]).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Unknown backend \"postgres\" (expected \"file\" or \"sqlite\")"
    );
}
