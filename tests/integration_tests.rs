use std::process::{Command, Output};
use tempfile::tempdir;

fn posterm_binary() -> String {
    env!("CARGO_BIN_EXE_posterm").to_string()
}

/// Runs the binary with output captured, so stdout is never a terminal.
fn posterm(args: &[&str], home: &std::path::Path) -> Output {
    Command::new(posterm_binary())
        .args(args)
        .env("HOME", home)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute posterm")
}

#[test]
fn test_help_command() {
    let home = tempdir().expect("Failed to create temp dir");
    let output = posterm(&["--help"], home.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("An interactive terminal workspace for composing and sending HTTP requests"));
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("--page-shift"));
}

#[test]
fn test_version_command() {
    let home = tempdir().expect("Failed to create temp dir");
    let output = posterm(&["--version"], home.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("posterm"));
}

#[test]
fn test_invalid_arguments() {
    let home = tempdir().expect("Failed to create temp dir");
    let output = posterm(&["--no-such-flag"], home.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"));
}

#[test]
fn test_invalid_header_argument() {
    let home = tempdir().expect("Failed to create temp dir");
    let output = posterm(&["-H", "missing-colon"], home.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid header format"));
}

#[test]
fn test_refuses_non_terminal_stdout() {
    let home = tempdir().expect("Failed to create temp dir");
    let output = posterm(&["example.com"], home.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("stdout is not a terminal"));
}

#[test]
fn test_malformed_profile_aborts_startup() {
    let home = tempdir().expect("Failed to create temp dir");
    std::fs::write(
        home.path().join(".posterm"),
        "[default]\n\
         host = localhost:3000\n\
         page_shift = many\n",
    )
    .expect("Failed to write config file");

    let output = posterm(&[], home.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("page_shift"));
    assert!(!stderr.contains("stdout is not a terminal"));
}

#[test]
fn test_log_file_receives_startup_line() {
    let home = tempdir().expect("Failed to create temp dir");
    let log_path = home.path().join("posterm.log");
    std::fs::write(
        home.path().join(".posterm"),
        format!(
            "[staging]\n\
             host = api.example.com\n\
             log_file = {}\n",
            log_path.display()
        ),
    )
    .expect("Failed to write config file");

    let output = posterm(&["-p", "staging", "-v"], home.path());
    assert!(!output.status.success());

    let log = std::fs::read_to_string(&log_path).expect("log file was not written");
    assert!(log.contains("starting posterm"));
    assert!(log.contains("staging"));
}
