//! E2E error paths: every failure exits non-zero and carries a stable
//! `E####` code on stderr in both text and JSON modes.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn adeps_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("adeps"));
    cmd.current_dir(dir);
    cmd.env("ADEPS_LOG", "off");
    cmd.env("XDG_CONFIG_HOME", dir.join(".config"));
    cmd.env_remove("FORMAT");
    cmd
}

fn write(dir: &Path, rel: &str, content: impl AsRef<[u8]>) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, content).expect("write");
}

fn error_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("adeps should not crash");
    assert!(!output.status.success(), "command unexpectedly succeeded");
    let json: Value = serde_json::from_slice(&output.stderr).expect("stderr is JSON");
    json["error"].clone()
}

#[test]
fn query_before_build_reports_cache_missing() {
    let dir = TempDir::new().expect("tempdir");
    for sub in [&["stats"][..], &["unused"], &["verify"], &["show", "Assets/A.mat"]] {
        adeps_cmd(dir.path())
            .args(sub)
            .assert()
            .failure()
            .stderr(predicate::str::contains("error[E3001]"))
            .stderr(predicate::str::contains("adeps build"));
    }
}

#[test]
fn cache_missing_as_json() {
    let dir = TempDir::new().expect("tempdir");
    let error = error_json(adeps_cmd(dir.path()).args(["stats", "--json"]));
    assert_eq!(error["error_code"], "E3001");
    assert!(error["message"].as_str().expect("message").contains("dep.dat"));
    assert!(error["suggestion"].is_string());
}

#[test]
fn build_without_manifest_reports_source_unavailable() {
    let dir = TempDir::new().expect("tempdir");
    let error = error_json(adeps_cmd(dir.path()).args(["build", "--json"]));
    assert_eq!(error["error_code"], "E2001");
    assert!(!dir.path().join(".assetdeps/cache/dep.dat").exists());
}

#[test]
fn build_with_malformed_manifest_reports_manifest_invalid() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), ".assetdeps/manifest.json", "{ \"assets\": [");
    let error = error_json(adeps_cmd(dir.path()).args(["build", "--json"]));
    assert_eq!(error["error_code"], "E1002");
}

#[test]
fn malformed_project_config_reports_parse_error() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), ".assetdeps/config.toml", "[build\n");
    adeps_cmd(dir.path())
        .args(["stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1001]"));
}

#[test]
fn corrupt_cache_reports_cache_corrupt() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), ".assetdeps/cache/dep.dat", b"not a dependency cache");
    let error = error_json(adeps_cmd(dir.path()).args(["verify", "--json"]));
    assert_eq!(error["error_code"], "E3002");
}

#[test]
fn truncated_cache_reports_cache_corrupt() {
    let dir = TempDir::new().expect("tempdir");
    write(
        dir.path(),
        ".assetdeps/manifest.json",
        r#"{ "assets": { "Assets/A.mat": ["Assets/B.png"], "Assets/B.png": [] } }"#,
    );
    adeps_cmd(dir.path()).args(["build"]).assert().success();

    let cache = dir.path().join(".assetdeps/cache/dep.dat");
    let bytes = fs::read(&cache).expect("read cache");
    fs::write(&cache, &bytes[..bytes.len() - 3]).expect("truncate");

    let error = error_json(adeps_cmd(dir.path()).args(["stats", "--json"]));
    assert_eq!(error["error_code"], "E3002");

    adeps_cmd(dir.path()).args(["build"]).assert().success();
    adeps_cmd(dir.path()).args(["verify"]).assert().success();
}

#[test]
fn unknown_asset_reports_not_found() {
    let dir = TempDir::new().expect("tempdir");
    write(
        dir.path(),
        ".assetdeps/manifest.json",
        r#"{ "assets": { "Assets/A.mat": [] } }"#,
    );
    adeps_cmd(dir.path()).args(["build"]).assert().success();

    let error = error_json(adeps_cmd(dir.path()).args(["show", "Assets/Nope.mat", "--json"]));
    assert_eq!(error["error_code"], "E4002");
    assert!(error["message"].as_str().expect("message").contains("Assets/Nope.mat"));
}

#[test]
fn unknown_subcommand_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    adeps_cmd(dir.path()).args(["frobnicate"]).assert().failure();
}
