//! Integration tests for the pkgfront CLI

use serde_json::Value;
use std::io::Write;
use std::process::{Command, Output};
use tempfile::{NamedTempFile, TempDir};

fn pkgfront(home: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_pkgfront"));
    command
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("PKGFRONT_COLOR")
        .env_remove("PKGFRONT_RUNNER")
        .env_remove("PKGFRONT_AUTO_DISMISS")
        .env_remove("PKGFRONT_DEPS")
        .env_remove("RUST_LOG");
    command
}

fn script(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file
}

fn replay(script: &NamedTempFile, args: &[&str]) -> Output {
    let home = TempDir::new().unwrap();
    pkgfront(&home)
        .args(["--json", "--yes", "--replay"])
        .arg(script.path())
        .args(args)
        .output()
        .expect("Failed to execute pkgfront")
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn debug_messages(lines: &[Value]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| line["event"]["event"]["type"] == "DebugLog")
        .filter_map(|line| line["event"]["event"]["message"].as_str().map(str::to_string))
        .collect()
}

fn json_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line is not JSON"))
        .collect()
}

fn run_event_types(lines: &[Value]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| line["event"]["domain"] == "run")
        .filter_map(|line| line["event"]["event"]["type"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn test_cli_version() {
    let home = TempDir::new().unwrap();
    let output = pkgfront(&home)
        .arg("--version")
        .output()
        .expect("Failed to execute pkgfront");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pkgfront"));
}

#[test]
fn test_cli_help() {
    let home = TempDir::new().unwrap();
    let output = pkgfront(&home)
        .arg("--help")
        .output()
        .expect("Failed to execute pkgfront");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Progress and log front-end"));
    assert!(stdout.contains("install"));
    assert!(stdout.contains("uninstall"));
    assert!(stdout.contains("channel"));
    assert!(stdout.contains("--replay"));
}

#[test]
fn test_cli_invalid_command() {
    let home = TempDir::new().unwrap();
    let output = pkgfront(&home)
        .arg("invalid-command")
        .output()
        .expect("Failed to execute pkgfront");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized subcommand"));
}

#[test]
fn test_install_no_package() {
    let home = TempDir::new().unwrap();
    let output = pkgfront(&home)
        .arg("install")
        .output()
        .expect("Failed to execute pkgfront");

    assert!(!output.status.success());
}

#[test]
fn test_uninstall_rejects_bare_name() {
    let home = TempDir::new().unwrap();
    let output = pkgfront(&home)
        .args(["--yes", "uninstall", "foo"])
        .output()
        .expect("Failed to execute pkgfront");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"));
}

#[test]
fn test_replayed_install_reports_success() {
    let script = script(&[
        r#"{"type":"log","message":"downloading","append_newline":false}"#,
        r#"{"type":"log","message":".","append_newline":false}"#,
        r#"{"type":"log","message":".","append_newline":false}"#,
        r#"{"type":"output","command":"install","payload":{"data":"Install complete"}}"#,
    ]);
    let output = replay(&script, &["install", "pear.php.net/Foo-1.0"]);

    assert!(output.status.success());
    let lines = json_lines(&output);
    let types = run_event_types(&lines);
    assert_eq!(types.first().map(String::as_str), Some("Started"));
    assert!(types.iter().any(|t| t == "Finished"));
    assert_eq!(types.last().map(String::as_str), Some("Dismissed"));

    let outcome = lines.last().unwrap();
    assert_eq!(outcome["has_error"], false);
    assert_eq!(outcome["kind"], "install");
}

#[test]
fn test_replayed_failure_exits_with_error() {
    let script = script(&[
        r#"{"type":"log","message":"contacting channel"}"#,
        r#"{"type":"fail","message":"Channel not found"}"#,
    ]);
    let output = replay(&script, &["channel", "delete", "bogus.example.com"]);

    assert!(!output.status.success());
    let lines = json_lines(&output);
    assert!(lines
        .iter()
        .any(|line| line["event"]["event"]["type"] == "LogExpanded"));

    let outcome = lines.last().unwrap();
    assert_eq!(outcome["has_error"], true);
    let log = outcome["log"].as_array().unwrap();
    assert!(log
        .iter()
        .any(|line| line.as_str().unwrap_or_default().contains("Channel not found")));
}

#[test]
fn test_replay_with_missing_script_fails() {
    let home = TempDir::new().unwrap();
    let output = pkgfront(&home)
        .args(["--yes", "--replay", "/nonexistent/script.jsonl"])
        .args(["channel", "update", "pear.php.net"])
        .output()
        .expect("Failed to execute pkgfront");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"));
}

#[test]
fn test_declined_channel_removal_does_not_run() {
    let home = TempDir::new().unwrap();
    let config = config_file("[ui]\nconfirm_default = false\n");
    let script = script(&[r#"{"type":"output","command":"channel-delete","payload":{"data":"Channel removed"}}"#]);
    let output = pkgfront(&home)
        .arg("--config")
        .arg(config.path())
        .arg("--replay")
        .arg(script.path())
        .args(["channel", "delete", "pear.example.com"])
        .output()
        .expect("Failed to execute pkgfront");

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Channel pear.example.com was not removed"));
}

#[test]
fn test_yes_skips_channel_removal_question() {
    let home = TempDir::new().unwrap();
    let config = config_file("[ui]\nconfirm_default = false\n");
    let script = script(&[r#"{"type":"output","command":"channel-delete","payload":{"data":"Channel removed"}}"#]);
    let output = pkgfront(&home)
        .arg("--config")
        .arg(config.path())
        .args(["--json", "--yes", "--replay"])
        .arg(script.path())
        .args(["channel", "delete", "pear.example.com"])
        .output()
        .expect("Failed to execute pkgfront");

    assert!(output.status.success());
    let lines = json_lines(&output);
    assert_eq!(run_event_types(&lines).first().map(String::as_str), Some("Started"));
    assert_eq!(lines.last().unwrap()["kind"], "channel-delete");
}

#[test]
fn test_configured_dependency_mode_applies_without_flag() {
    let home = TempDir::new().unwrap();
    let config = config_file("[install]\ndependencies = \"alldeps\"\n");
    let script = script(&[r#"{"type":"output","command":"install","payload":{"data":"Install complete"}}"#]);

    let configured = pkgfront(&home)
        .arg("--config")
        .arg(config.path())
        .args(["--json", "--yes", "--replay"])
        .arg(script.path())
        .args(["install", "pear.php.net/Foo-1.0"])
        .output()
        .expect("Failed to execute pkgfront");
    assert!(configured.status.success());
    let messages = debug_messages(&json_lines(&configured));
    assert!(messages.iter().any(|m| m.contains("--alldeps")));

    let overridden = pkgfront(&home)
        .arg("--config")
        .arg(config.path())
        .args(["--json", "--yes", "--replay"])
        .arg(script.path())
        .args(["install", "--deps", "nodeps", "pear.php.net/Foo-1.0"])
        .output()
        .expect("Failed to execute pkgfront");
    assert!(overridden.status.success());
    let messages = debug_messages(&json_lines(&overridden));
    assert!(messages.iter().any(|m| m.contains("--nodeps")));
    assert!(!messages.iter().any(|m| m.contains("--alldeps")));
}
