use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_reelname_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("reelname")
}

#[test]
fn test_driver_command_help() {
    let mut cmd = Command::new(get_reelname_bin());
    cmd.arg("driver").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("chromedriver"))
        .stdout(predicate::str::contains("--install-root"))
        .stdout(predicate::str::contains("--manifest-url"))
        .stdout(predicate::str::contains("REELNAME_INSTALL_ROOT"));
}

#[test]
fn test_driver_fails_without_chrome() {
    let temp_dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(get_reelname_bin());
    cmd.arg("driver")
        .arg("--install-root")
        .arg(temp_dir.path())
        .arg("--chrome-path")
        .arg(temp_dir.path().join("no-such-chrome"))
        .arg("--manifest-url")
        .arg("http://127.0.0.1:9/manifest.json");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Chrome"));
}

#[test]
fn test_platform_command_reports_driver_path() {
    let temp_dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(get_reelname_bin());
    cmd.arg("platform")
        .arg("--install-root")
        .arg(temp_dir.path())
        .arg("--chrome-path")
        .arg(temp_dir.path().join("no-such-chrome"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("chromedriver-"))
        .stdout(predicate::str::contains("not found"));
}

#[test]
fn test_main_help_lists_commands() {
    let mut cmd = Command::new(get_reelname_bin());
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("driver"))
        .stdout(predicate::str::contains("describe"))
        .stdout(predicate::str::contains("platform"))
        .stdout(predicate::str::contains("completion"));
}
