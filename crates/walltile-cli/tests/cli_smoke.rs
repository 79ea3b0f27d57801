use assert_cmd::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join("cluster").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn walltile() -> Command {
    let exe = assert_cmd::cargo_bin!("walltile");
    let mut cmd = Command::new(exe);
    cmd.env_remove("RANK")
        .env_remove("DISPLAY")
        .env("WALLTILE_HOSTNAME_TIMEOUT_MS", "2000")
        .env("RUST_LOG", "off");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let out = cmd.output().expect("run walltile");
    assert!(
        out.status.success(),
        "walltile failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("stdout is JSON")
}

#[test]
fn cli_resolves_follower_by_rank_flag() {
    let json = stdout_json(walltile().args([
        "resolve",
        "--rank",
        "3",
        fixture("wall_2x2.xml").to_string_lossy().as_ref(),
    ]));
    assert_eq!(json["is_leader"], false);
    assert_eq!(json["rank"], 3);
    assert_eq!(json["local_width"], 3850);
    assert_eq!(json["local_height"], 1080);
    assert_eq!(json["offset_x"], 0);
    assert_eq!(json["offset_y"], 1100);
    assert_eq!(json["num_followers"], 3);
}

#[test]
fn cli_reads_rank_from_the_environment() {
    let json = stdout_json(
        walltile()
            .env("RANK", "0")
            .arg(fixture("wall_2x2.xml").to_string_lossy().as_ref()),
    );
    assert_eq!(json["is_leader"], true);
    assert_eq!(json["leader_port"], 9002);
}

#[test]
fn cli_rank_flag_overrides_an_invalid_environment_rank() {
    let json = stdout_json(walltile().env("RANK", "garbage").args([
        "--rank",
        "2",
        fixture("wall_2x2.xml").to_string_lossy().as_ref(),
    ]));
    assert_eq!(json["rank"], 2);
    assert_eq!(json["offset_x"], 1930);
}

#[test]
fn cli_rejects_an_invalid_environment_rank() {
    walltile()
        .env("RANK", "-5")
        .arg(fixture("wall_2x2.xml").to_string_lossy().as_ref())
        .assert()
        .code(1);
}

#[test]
fn cli_resolves_by_hostname_and_display() {
    let json = stdout_json(walltile().args([
        "--hostname",
        "render-a",
        "--display",
        ":0.1",
        fixture("wall_2x2.xml").to_string_lossy().as_ref(),
    ]));
    assert_eq!(json["path"], "hostname");
    assert_eq!(json["rank"], 2);
    assert_eq!(json["offset_x"], 1930);
}

#[test]
fn cli_legacy_flag_reproduces_old_offsets() {
    let json = stdout_json(walltile().args([
        "--legacy",
        "--rank",
        "2",
        fixture("wall_2x2.xml").to_string_lossy().as_ref(),
    ]));
    assert_eq!(json["offset_y"], 20);
}

#[test]
fn cli_exits_3_when_no_entry_matches() {
    walltile()
        .args([
            "--rank",
            "9",
            fixture("wall_2x2.xml").to_string_lossy().as_ref(),
        ])
        .assert()
        .code(3);
}

#[test]
fn cli_exits_1_on_malformed_configuration() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("configuration.xml");
    fs::write(
        &path,
        r#"<configuration><dimensions screenWidth="wide"/></configuration>"#,
    )
    .expect("write config");

    walltile()
        .args(["--rank", "1", path.to_string_lossy().as_ref()])
        .assert()
        .code(1);
}

#[test]
fn cli_defaults_to_configuration_xml_in_the_working_directory() {
    let tmp = tempfile::tempdir().expect("tempdir");
    fs::copy(
        fixture("wall_headless.xml"),
        tmp.path().join("configuration.xml"),
    )
    .expect("copy fixture");

    let json = stdout_json(walltile().current_dir(tmp.path()).args(["--rank", "3"]));
    assert_eq!(json["leader_host"], "localhost");
    assert_eq!(json["leader_port"], Value::Null);
    assert_eq!(json["offset_x"], 2048);
}

#[test]
fn cli_validate_summarizes_the_document() {
    let json = stdout_json(walltile().args([
        "validate",
        "--pretty",
        fixture("wall_scaled_leader.xml").to_string_lossy().as_ref(),
    ]));
    assert_eq!(json["grid"]["master_width"], 3850);
    assert_eq!(json["grid"]["master_height"], 2180);
    assert_eq!(json["debug_enabled"], true);
    assert_eq!(json["leader"]["surface"]["width"], 1280);
    assert_eq!(json["hosts"], 2);
    assert_eq!(json["num_followers"], 2);
}

#[test]
fn cli_rejects_unknown_flags_with_usage() {
    walltile().arg("--bogus").assert().code(2);
    walltile().args(["--rank"]).assert().code(2);
}
