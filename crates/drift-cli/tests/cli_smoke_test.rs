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
    let path = repo_root().join("fixtures").join("graphs").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn run_json(args: &[&str]) -> Value {
    let exe = assert_cmd::cargo_bin!("drift-cli");
    let output = Command::new(exe).args(args).output().expect("run drift-cli");
    assert!(
        output.status.success(),
        "drift-cli failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn force_layout_writes_finite_positions_for_every_node() {
    let tree = fixture("tree.json");
    let out = run_json(&[
        "force",
        "--options",
        r#"{"maxIterations":50}"#,
        tree.to_string_lossy().as_ref(),
    ]);

    let positions = out["positions"].as_object().expect("positions object");
    assert_eq!(positions.len(), 10);
    for (id, p) in positions {
        let x = p["x"].as_f64().expect("x");
        let y = p["y"].as_f64().expect("y");
        assert!(x.is_finite() && y.is_finite(), "{id}: {p}");
    }
    assert_eq!(
        out["events"],
        serde_json::json!(["layoutstart", "layoutready", "layoutstop"])
    );
}

#[test]
fn layered_layout_writes_to_out_file() {
    let grouped = fixture("grouped.json");
    let tmp = tempfile::tempdir().expect("tempdir");
    let out_path = tmp.path().join("layout.json");

    let exe = assert_cmd::cargo_bin!("drift-cli");
    Command::new(exe)
        .args([
            "layered",
            "--pretty",
            "--out",
            out_path.to_string_lossy().as_ref(),
            grouped.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let out: Value = serde_json::from_str(&fs::read_to_string(&out_path).expect("read output"))
        .expect("output is JSON");
    let positions = &out["positions"];
    assert!(positions["a"]["y"].as_f64() < positions["b"]["y"].as_f64());
    // Locked nodes keep their input position.
    assert_eq!(positions["c"], serde_json::json!({ "x": 5.0, "y": 5.0 }));
}

#[test]
fn layered_layout_reads_stdin() {
    let exe = assert_cmd::cargo_bin!("drift-cli");
    let output = assert_cmd::Command::new(exe)
        .arg("layered")
        .write_stdin(r#"{"nodes":[{"id":"a"},{"id":"b"}],"edges":[{"source":"a","target":"b"}]}"#)
        .output()
        .expect("run drift-cli");
    assert!(output.status.success());
    let out: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(out["positions"]["a"]["x"], out["positions"]["b"]["x"]);
}

#[test]
fn remote_without_url_fails_with_config_error() {
    let exe = assert_cmd::cargo_bin!("drift-cli");
    let output = Command::new(exe)
        .args(["remote", fixture("tree.json").to_string_lossy().as_ref()])
        .output()
        .expect("run drift-cli");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("url"), "{stderr}");
}

#[test]
fn infinite_force_layout_is_refused() {
    let exe = assert_cmd::cargo_bin!("drift-cli");
    let output = Command::new(exe)
        .args([
            "force",
            "--options",
            r#"{"infinite":true}"#,
            fixture("tree.json").to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run drift-cli");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn unknown_flag_prints_usage() {
    let exe = assert_cmd::cargo_bin!("drift-cli");
    let output = Command::new(exe).arg("--nope").output().expect("run drift-cli");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("USAGE"));
}
