use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn nfapi() -> Command {
    let mut cmd = Command::cargo_bin("nfapi").unwrap();
    cmd.env_remove("NFAPI_CONFIG").env_remove("NFAPI_PASSWORD");
    cmd
}

#[test]
fn help_lists_commands() {
    nfapi()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("driver"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn generate_then_validate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nfapi.toml");

    nfapi()
        .args(["--no-banner", "config", "generate", "--output"])
        .arg(&path)
        .assert()
        .success();
    assert!(fs::read_to_string(&path).unwrap().contains("chrome.exe"));

    nfapi()
        .args(["--no-banner", "config", "validate"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("2 handled, 1 bypassed"));
}

#[test]
fn validate_rejects_half_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nfapi.toml");
    fs::write(&path, "[target]\nhost = \"127.0.0.1\"\nport = 1080\nusername = \"bob\"\n").unwrap();

    nfapi()
        .args(["--no-banner", "config", "validate"])
        .arg(&path)
        .assert()
        .failure();
}

#[test]
fn show_redacts_password() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nfapi.toml");
    fs::write(
        &path,
        "[target]\nhost = \"127.0.0.1\"\nport = 1080\nusername = \"bob\"\npassword = \"hunter2\"\n",
    )
    .unwrap();

    nfapi()
        .args(["--no-banner", "--config"])
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bob"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn completions_for_bash() {
    nfapi()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nfapi"));
}

#[test]
fn start_requires_password_with_username() {
    nfapi()
        .args(["--no-banner", "start", "--username", "bob"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--password"));
}
