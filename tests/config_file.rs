//! Loading configuration from disk and reloading it on change.

use std::fs;
use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;
use tokio::sync::mpsc;
use tokio::time::timeout;
use toll_proxy::config::{
    load_config, ConfigError, ConfigWatcher, DestinationPolicy, ProxyConfig, ProxySnapshot,
};

mod common;
use common::{allow_list_toml, save_by_rename};

const DEBOUNCE: Duration = Duration::from_millis(50);
const RELOAD_WAIT: Duration = Duration::from_secs(5);

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn loads_full_config() {
    let file = write_config(
        r#"
        [listener]
        bind_address = "127.0.0.1:5000"

        [proxy]
        pass_headers = "Authorization, Accept,,"
        allowed_destination_hosts = "api.example.com , Billing.Example.com"

        [upstream]
        connect_secs = 2

        [observability]
        log_level = "debug"
        "#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.listener.bind_address, "127.0.0.1:5000");
    assert_eq!(config.upstream.connect_secs, 2);
    assert_eq!(config.proxy.destination_policy, DestinationPolicy::AllowList);

    let snapshot = ProxySnapshot::new(config);
    assert_eq!(snapshot.pass_headers.len(), 2);
    assert!(snapshot.allowed_destination_hosts.contains("billing.example.com"));
}

#[test]
fn invalid_values_are_rejected_together() {
    let file = write_config(
        r#"
        [listener]
        bind_address = "everywhere"

        [proxy]
        pass_headers = "Good, Not Good"
        "#,
    );

    match load_config(file.path()) {
        Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn unknown_policy_is_a_parse_error() {
    let file = write_config(
        r#"
        [proxy]
        destination_policy = "sometimes"
        "#,
    );

    assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
}

async fn next_hosts(updates: &mut mpsc::UnboundedReceiver<ProxyConfig>) -> String {
    timeout(RELOAD_WAIT, updates.recv())
        .await
        .expect("no reload within the wait")
        .expect("watcher stopped")
        .proxy
        .allowed_destination_hosts
}

#[tokio::test]
async fn watcher_survives_rename_saves() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("proxy.toml");
    fs::write(&path, allow_list_toml("a.example")).unwrap();

    let (watcher, mut updates) = ConfigWatcher::new(&path);
    let _watcher = watcher.with_debounce(DEBOUNCE).run().unwrap();

    save_by_rename(&path, &allow_list_toml("b.example"));
    assert_eq!(next_hosts(&mut updates).await, "b.example");

    save_by_rename(&path, &allow_list_toml("c.example"));
    assert_eq!(next_hosts(&mut updates).await, "c.example");

    fs::write(&path, allow_list_toml("d.example")).unwrap();
    assert_eq!(next_hosts(&mut updates).await, "d.example");
}

#[tokio::test]
async fn watcher_skips_invalid_and_empty_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("proxy.toml");
    fs::write(&path, allow_list_toml("a.example")).unwrap();

    let (watcher, mut updates) = ConfigWatcher::new(&path);
    let _watcher = watcher.with_debounce(DEBOUNCE).run().unwrap();

    fs::write(&path, "[proxy]\ndestination_policy = \"sometimes\"\n").unwrap();
    assert!(timeout(Duration::from_millis(500), updates.recv()).await.is_err());

    fs::write(&path, "").unwrap();
    assert!(timeout(Duration::from_millis(500), updates.recv()).await.is_err());

    save_by_rename(&path, &allow_list_toml("b.example"));
    assert_eq!(next_hosts(&mut updates).await, "b.example");
}

#[tokio::test]
async fn watcher_ignores_sibling_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("proxy.toml");
    fs::write(&path, allow_list_toml("a.example")).unwrap();

    let (watcher, mut updates) = ConfigWatcher::new(&path);
    let _watcher = watcher.with_debounce(DEBOUNCE).run().unwrap();

    fs::write(dir.path().join("other.toml"), allow_list_toml("x.example")).unwrap();
    assert!(timeout(Duration::from_millis(500), updates.recv()).await.is_err());
}
