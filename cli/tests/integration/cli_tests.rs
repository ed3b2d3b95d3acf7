//! Integration tests for the ec2-runner binary surface
//!
//! These verify argument parsing and configuration errors; every case fails
//! before any provider or coordinator call is made.

use assert_cmd::Command;
use predicates::prelude::*;

/// The binary with a clean environment so ambient CI variables cannot leak in.
fn ec2_runner() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ec2-runner"));
    cmd.env_clear();
    cmd.env("NO_COLOR", "1");
    cmd
}

fn launch() -> Command {
    let mut cmd = ec2_runner();
    cmd.args([
        "launch",
        "--github-token",
        "t0ken",
        "--repository",
        "acme/widgets",
        "--instance-type",
        "t3.micro",
    ]);
    cmd
}

fn terminate() -> Command {
    let mut cmd = ec2_runner();
    cmd.args([
        "terminate",
        "--github-token",
        "t0ken",
        "--repository",
        "acme/widgets",
    ]);
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help() {
    // clap with arg_required_else_help shows help on stderr and exits 2
    ec2_runner()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("self-hosted GitHub Actions runners"));
}

#[test]
fn test_cli_help_lists_commands() {
    ec2_runner()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("launch"))
        .stdout(predicate::str::contains("terminate"));
}

#[test]
fn test_version_command_shows_version() {
    ec2_runner()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!(
            "ec2-runner ",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = ec2_runner()
        .args(["version", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(v["version"], env!("CARGO_PKG_VERSION"));
}

// --- Configuration errors ---

#[test]
fn test_launch_requires_token() {
    ec2_runner()
        .args(["launch", "--repository", "acme/widgets"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--github-token"));
}

#[test]
fn test_launch_without_image_criteria_fails() {
    launch()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no image selection criteria"));
}

#[test]
fn test_launch_reads_settings_from_env() {
    ec2_runner()
        .arg("launch")
        .env("GITHUB_TOKEN", "t0ken")
        .env("GITHUB_REPOSITORY", "acme/widgets")
        .env("EC2_IMAGE_NAME", "runner-*")
        .env("RUNNER_BATCH", "a,a")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("duplicate unit identity 'a'"));
}

#[test]
fn test_launch_rejects_bad_unit_identity() {
    launch()
        .args(["--image-owners", "self", "--batch", "ok,not/ok"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid unit identity 'not/ok'"));
}

#[test]
fn test_launch_rejects_malformed_descriptor() {
    launch()
        .args(["--image-owners", "self", "--batch", "{\"a\": {\"colour\": \"red\"}}"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("launch descriptor"));
}

#[test]
fn test_launch_rejects_bad_repository() {
    ec2_runner()
        .args([
            "launch",
            "--github-token",
            "t0ken",
            "--repository",
            "widgets",
            "--image-owners",
            "self",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("expected owner/repo"));
}

#[test]
fn test_config_error_as_json() {
    let output = launch().arg("--json").output().expect("run");
    assert_eq!(output.status.code(), Some(1));
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(v["error"], true);
    assert_eq!(v["code"], "config");
}

#[test]
fn test_terminate_requires_instance_and_label() {
    terminate()
        .args(["--label", "abc"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("instance-id"));
}

#[test]
fn test_terminate_rejects_identifier_list() {
    terminate()
        .args(["--batch", "a,b"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("terminate batches need descriptors"));
}
