//! Integration tests for the `loomap` CLI binary.
//!
//! Argument parsing, help output and config handling run without a
//! backend; the session and toilet flows run against a wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use assert_cmd::cargo::cargo_bin_cmd;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `loomap` binary with env isolation.
///
/// Clears all `LOOMAP_*` env vars and points config and data directories
/// at `home` so tests never touch the user's real configuration.
fn loomap_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("loomap");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("LOOMAP_PROFILE")
        .env_remove("LOOMAP_API_URL")
        .env_remove("LOOMAP_LOCATION")
        .env_remove("LOOMAP_CREDENTIAL_STORE")
        .env_remove("LOOMAP_OUTPUT")
        .env_remove("LOOMAP_INSECURE")
        .env_remove("LOOMAP_TIMEOUT");
    cmd
}

/// Token file location for the default profile under `home`.
fn token_file(home: &Path) -> PathBuf {
    home.join("data")
        .join("loomap")
        .join("default")
        .join("token")
}

fn credential(user_id: i64, exp_in_secs: i64) -> String {
    let now = i64::try_from(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs(),
    )
    .unwrap();
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload =
        URL_SAFE_NO_PAD.encode(json!({ "user_id": user_id, "exp": now + exp_in_secs }).to_string());
    format!("{header}.{payload}.sig")
}

fn write_token(home: &Path, token: &str) {
    let path = token_file(home);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, token).unwrap();
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = loomap_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    loomap_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("toilets")
                .and(predicate::str::contains("reviews"))
                .and(predicate::str::contains("login"))
                .and(predicate::str::contains("locate")),
        );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    loomap_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("loomap"));
}

#[test]
fn test_completions_zsh() {
    let home = TempDir::new().unwrap();
    loomap_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_toilets_subcommands_exist() {
    let home = TempDir::new().unwrap();
    loomap_cmd(home.path())
        .args(["toilets", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("add"))
                .and(predicate::str::contains("delete")),
        );
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let home = TempDir::new().unwrap();
    let output = loomap_cmd(home.path()).arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_toilets_list_without_backend() {
    let home = TempDir::new().unwrap();
    loomap_cmd(home.path())
        .args(["toilets", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No backend configured"));
}

#[test]
fn test_unknown_profile() {
    let home = TempDir::new().unwrap();
    loomap_cmd(home.path())
        .args(["--profile", "work", "whoami"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile 'work' not found"));
}

#[test]
fn test_whoami_without_session() {
    let home = TempDir::new().unwrap();
    loomap_cmd(home.path())
        .args([
            "--api-url",
            "http://127.0.0.1:9",
            "--credential-store",
            "file",
            "whoami",
        ])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_expired_session_is_cleared() {
    let home = TempDir::new().unwrap();
    write_token(home.path(), &credential(7, -60));

    loomap_cmd(home.path())
        .args([
            "--api-url",
            "http://127.0.0.1:9",
            "--credential-store",
            "file",
            "whoami",
        ])
        .assert()
        .code(3);
    assert!(!token_file(home.path()).exists());
}

#[test]
fn test_invalid_toilet_id_is_usage_error() {
    let home = TempDir::new().unwrap();
    write_token(home.path(), &credential(7, 3600));
    loomap_cmd(home.path())
        .args([
            "--api-url",
            "http://127.0.0.1:9",
            "--credential-store",
            "file",
            "reviews",
            "list",
            "local-abc",
        ])
        .assert()
        .code(2);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    let home = TempDir::new().unwrap();
    loomap_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

#[test]
fn test_config_set_and_show() {
    let home = TempDir::new().unwrap();
    loomap_cmd(home.path())
        .args(["config", "set", "api_url", "http://localhost:8080"])
        .assert()
        .success();
    loomap_cmd(home.path())
        .args(["config", "set", "geocoder_api_key", "super-secret"])
        .assert()
        .success();

    loomap_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("api_url = \"http://localhost:8080\"")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("super-secret").not()),
        );
    loomap_cmd(home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default *"));
}

#[test]
fn test_config_set_rejects_bad_location() {
    let home = TempDir::new().unwrap();
    loomap_cmd(home.path())
        .args(["config", "set", "location", "somewhere"])
        .assert()
        .code(2);
}

#[test]
fn test_config_use_unknown_profile() {
    let home = TempDir::new().unwrap();
    loomap_cmd(home.path())
        .args(["config", "use", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("(none)"));
}

// ── Against a mock backend ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_login_whoami_logout() {
    let server = MockServer::start().await;
    let token = credential(7, 3600);
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({ "username": "ann", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let uri = server.uri();
    let base = ["--api-url", uri.as_str(), "--credential-store", "file"];

    loomap_cmd(home.path())
        .args(base)
        .args(["login", "--username", "ann", "--password-stdin"])
        .write_stdin("hunter2\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Logged in as 'ann'"));
    assert_eq!(std::fs::read_to_string(token_file(home.path())).unwrap(), token);

    loomap_cmd(home.path())
        .args(base)
        .args(["--output", "json", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"user_id\": 7"));

    loomap_cmd(home.path())
        .args(base)
        .arg("logout")
        .assert()
        .success();
    assert!(!token_file(home.path()).exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_login_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(500).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    loomap_cmd(home.path())
        .args(["--api-url", server.uri().as_str(), "--credential-store", "file"])
        .args(["login", "--username", "ann", "--password-stdin"])
        .write_stdin("wrong\n")
        .assert()
        .code(3);
    assert!(!token_file(home.path()).exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_toilets_list_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/toilets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "founder_id": 7, "name": "Central", "point": "55.75,37.61",
              "gender": "male", "type": "free" },
            { "id": 2, "name": "Broken", "point": "nowhere" }
        ])))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    write_token(home.path(), &credential(7, 3600));
    let uri = server.uri();
    let base = ["--api-url", uri.as_str(), "--credential-store", "file"];

    loomap_cmd(home.path())
        .args(base)
        .args(["--output", "plain", "toilets", "list"])
        .assert()
        .success()
        .stdout("1\n2\n");

    loomap_cmd(home.path())
        .args(base)
        .args(["--output", "plain", "toilets", "list", "--mappable"])
        .assert()
        .success()
        .stdout("1\n");

    loomap_cmd(home.path())
        .args(base)
        .args(["toilets", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Central").and(predicate::str::contains("you")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_toilets_add_sends_bearer() {
    let server = MockServer::start().await;
    let token = credential(7, 3600);
    Mock::given(method("GET"))
        .and(path("/toilets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/toilet/add"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .and(body_json(json!({
            "name": "Park",
            "point": "10,20",
            "gender": "female",
            "type": "paid",
            "address": "1 Main St"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 42 })))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    write_token(home.path(), &token);

    loomap_cmd(home.path())
        .args(["--api-url", server.uri().as_str(), "--credential-store", "file"])
        .args([
            "--output", "plain", "toilets", "add", "--at", "10,20", "--name", "Park", "--gender",
            "female", "--access", "paid", "--address", "1 Main St",
        ])
        .assert()
        .success()
        .stdout("42\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_delete_requires_yes_when_not_interactive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/toilets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "founder_id": 7, "name": "Central", "point": "55.75,37.61" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/toilet/1/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/toilet/delete"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    write_token(home.path(), &credential(7, 3600));
    let uri = server.uri();
    let base = ["--api-url", uri.as_str(), "--credential-store", "file"];

    loomap_cmd(home.path())
        .args(base)
        .args(["toilets", "delete", "1"])
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));

    loomap_cmd(home.path())
        .args(base)
        .args(["--yes", "toilets", "delete", "1"])
        .assert()
        .success();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_review_with_bad_score_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/toilets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Central", "point": "55.75,37.61" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/toilet/1/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/review/add"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    write_token(home.path(), &credential(7, 3600));

    loomap_cmd(home.path())
        .args(["--api-url", server.uri().as_str(), "--credential-store", "file"])
        .args([
            "reviews", "add", "1", "--title", "Nice", "--body", "Clean", "--score", "9",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("score"));
}
