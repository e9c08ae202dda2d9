//! Integration tests for the `trident` CLI binary.
//!
//! Argument parsing, config handling, and exit codes run without any
//! backend; the end-to-end cases point a RouterOS backend at wiremock.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const ROUTER_PASSWORD_ENV: &str = "ROUTER_TEST_PASSWORD";

/// Build a [`Command`] for the `trident` binary with env isolation.
///
/// Points the config file at `config` and clears output and log
/// overrides so tests never touch the user's real configuration.
fn trident_cmd(config: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("trident");
    cmd.env("TRIDENT_CONFIG", config)
        .env("HOME", "/tmp/trident-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/trident-cli-test-nonexistent")
        .env_remove("TRIDENT_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

fn router_config(dir: &Path, server: &MockServer) -> std::path::PathBuf {
    let file = dir.join("config.toml");
    let body = format!(
        "failover_order = [\"router-os\"]\n\n\
         [router_os]\n\
         host = \"{}\"\n\
         username = \"api\"\n\
         password_env = \"{ROUTER_PASSWORD_ENV}\"\n",
        server.uri()
    );
    std::fs::write(&file, body).unwrap();
    file
}

async fn mount_router(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/system/resource"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "uptime": "1d" })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/interface"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { ".id": "*1", "name": "ether1", "type": "ether", "running": "true",
              "disabled": "false", "rx-byte": "100", "tx-byte": "40" }
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/ip/address"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { ".id": "*A", "address": "192.168.88.1/24", "interface": "ether1", "disabled": "false" }
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/ip/firewall/connection"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

/// Run a blocking command without stalling the wiremock runtime.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = trident_cmd(&dir.path().join("config.toml"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    trident_cmd(&dir.path().join("config.toml"))
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("devices")
                .and(predicate::str::contains("flows"))
                .and(predicate::str::contains("qos"))
                .and(predicate::str::contains("watch")),
        );
}

#[test]
fn test_completions_zsh() {
    let dir = tempfile::tempdir().unwrap();
    trident_cmd(&dir.path().join("config.toml"))
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honors_override() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("custom.toml");
    trident_cmd(&file)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_init_writes_once() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("nested").join("config.toml");

    trident_cmd(&file)
        .args(["config", "init"])
        .assert()
        .success();
    let written = std::fs::read_to_string(&file).unwrap();
    assert!(written.contains("[router_os]"));
    assert!(written.contains("ROUTEROS_PASSWORD"));

    trident_cmd(&file)
        .args(["config", "init"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));

    trident_cmd(&file)
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_show_masks_plaintext_secrets() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(
        &file,
        "[sdn_controller]\nhost = \"odl\"\nusername = \"admin\"\npassword = \"hunter2\"\n",
    )
    .unwrap();

    trident_cmd(&file)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("****").and(predicate::str::contains("hunter2").not()));
}

#[test]
fn test_config_show_without_file_renders_defaults() {
    let dir = tempfile::tempdir().unwrap();
    trident_cmd(&dir.path().join("missing.toml"))
        .args(["config", "show", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("failover_check_interval_seconds"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_no_backends_exits_with_no_active_code() {
    let dir = tempfile::tempdir().unwrap();
    trident_cmd(&dir.path().join("missing.toml"))
        .arg("devices")
        .assert()
        .code(8)
        .stderr(predicate::str::contains("config init"));
}

#[test]
fn test_unknown_failover_backend_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(&file, "failover_order = [\"cisco\"]\n").unwrap();

    trident_cmd(&file)
        .arg("status")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failover_order"));
}

#[test]
fn test_missing_secret_names_the_field() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(
        &file,
        "[router_os]\nhost = \"10.0.0.1\"\nusername = \"api\"\npassword_env = \"ROUTER_TEST_UNSET_PASSWORD\"\n",
    )
    .unwrap();

    trident_cmd(&file)
        .env_remove("ROUTER_TEST_UNSET_PASSWORD")
        .arg("devices")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("password"));
}

#[test]
fn test_invalid_qos_policy_fails_before_connecting() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    // Unroutable backend: validation must reject the policy first.
    std::fs::write(
        &file,
        format!(
            "[router_os]\nhost = \"http://127.0.0.1:9\"\nusername = \"api\"\npassword_env = \"{ROUTER_PASSWORD_ENV}\"\n"
        ),
    )
    .unwrap();

    trident_cmd(&file)
        .env(ROUTER_PASSWORD_ENV, "pw")
        .args([
            "qos", "apply", "--id", "p1", "--name", "bulk", "--target", "ether1", "--min", "50",
            "--max", "10",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("bandwidth"));
}

#[test]
fn test_invalid_output_format() {
    let dir = tempfile::tempdir().unwrap();
    trident_cmd(&dir.path().join("config.toml"))
        .args(["--output", "xml", "devices"])
        .assert()
        .code(2);
}

// ── End to end through wiremock ─────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_json_from_router() {
    let server = MockServer::start().await;
    mount_router(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let file = router_config(dir.path(), &server);

    let mut cmd = trident_cmd(&file);
    cmd.env(ROUTER_PASSWORD_ENV, "hunter2")
        .args(["devices", "--output", "json"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{output:?}");
    let devices: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(devices[0]["id"], json!("*1"));
    assert_eq!(devices[0]["ipAddress"], json!("192.168.88.1"));
    assert_eq!(devices[0]["status"], json!("online"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_plain_prints_active_backend() {
    let server = MockServer::start().await;
    mount_router(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let file = router_config(dir.path(), &server);

    let mut cmd = trident_cmd(&file);
    cmd.env(ROUTER_PASSWORD_ENV, "hunter2")
        .args(["status", "--output", "plain"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{output:?}");
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "router-os");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_backend_exits_with_connection_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let file = router_config(dir.path(), &server);

    let mut cmd = trident_cmd(&file);
    cmd.env(ROUTER_PASSWORD_ENV, "hunter2").arg("stats");
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(7), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stderr).contains("router-os"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stats_compact_json() {
    let server = MockServer::start().await;
    mount_router(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let file = router_config(dir.path(), &server);

    let mut cmd = trident_cmd(&file);
    cmd.env(ROUTER_PASSWORD_ENV, "hunter2")
        .args(["stats", "-o", "json-compact"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{output:?}");
    let stats: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["bytesIn"], json!(100));
    assert_eq!(stats["bytesOut"], json!(40));
    assert_eq!(stats["activeConnections"], json!(0));
}
