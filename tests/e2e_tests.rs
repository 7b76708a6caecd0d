//! Tests against the real GitHub API and Docker download mirrors.
//! Run with `--features e2e`.
#![cfg(feature = "e2e")]

mod common;

use common::{CommandOutput, TestContext};

#[test]
fn test_list_remote_lists_release_versions() {
    let ctx = TestContext::new();

    let output: CommandOutput = ctx
        .cmd()
        .args(["ls-remote"])
        .output()
        .expect("Failed to run dvm")
        .into();
    output.assert_success();

    // Only the first page of tags is queried, so just check the shape
    let versions: Vec<&str> = output.stdout.lines().collect();
    assert!(!versions.is_empty());
    for version in versions {
        assert_eq!(version.split('.').count(), 3, "not a release: {}", version);
        assert!(!version.starts_with('v'));
    }
}

#[test]
fn test_install_unknown_version_is_invalid_operation() {
    let ctx = TestContext::new();

    let output: CommandOutput = ctx
        .cmd()
        .args(["install", "0.0.1"])
        .output()
        .expect("Failed to run dvm")
        .into();
    output
        .assert_code(3)
        .assert_stderr_contains("Version 0.0.1 not found");
    assert!(!ctx.version_dir("0.0.1").exists());
}

#[test]
fn test_upgrade_check() {
    let ctx = TestContext::new();

    let output: CommandOutput = ctx
        .cmd()
        .args(["upgrade", "--check"])
        .output()
        .expect("Failed to run dvm")
        .into();
    output.assert_success();
}

#[test]
fn test_list_remote_invalid_pattern_is_invalid_operation() {
    let ctx = TestContext::new();

    let output: CommandOutput = ctx
        .cmd()
        .args(["ls-remote", "("])
        .output()
        .expect("Failed to run dvm")
        .into();
    output
        .assert_code(3)
        .assert_stderr_contains("Invalid pattern");
}
