use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture_path(slot: u8) -> PathBuf {
    workspace_root().join(format!("tests/fixtures/slot_{slot}.sav"))
}

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_lana-se"))
        .args(args)
        .env_remove("LANA_SAVE_DIR")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run lana-se CLI")
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[test]
fn cli_prints_single_field() {
    let output = run_cli(&["--chapter", &path_arg(&fixture_path(0))]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "chapter=5");
}

#[test]
fn cli_prints_multiple_requested_fields_in_fixed_order() {
    let path = path_arg(&fixture_path(0));
    let output = run_cli(&["--position", "--slot", "--game-version", "--elapsed", &path]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "version=1.0.7.0",
            "elapsed=3h 25m 45s",
            "slot=1",
            "position=12,13,14",
        ]
    );
}

#[test]
fn cli_without_field_flags_prints_record_sheet() {
    let output = run_cli(&[&path_arg(&fixture_path(0))]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Timestamp: 2023/09/24 - 03:33:20"));
    assert!(stdout.contains("Chapter:   5 (The Cave)"));
    assert!(stdout.contains("Position:  12, 13, 14"));
}

#[test]
fn cli_json_output_is_valid() {
    let output = run_cli(&["--json", &path_arg(&fixture_path(1))]);
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["deathcounter"], 4);
    assert_eq!(value["chapterName"], "The Highlands");
    assert_eq!(value["version"], "1.0.7.0");
}

#[test]
fn cli_json_with_fields_only_has_selected_keys() {
    let output = run_cli(&["--json", "--deaths", "--scene", &path_arg(&fixture_path(1))]);
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let keys: Vec<&str> = value
        .as_object()
        .expect("json should be an object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["deaths", "scene"]);
}

#[test]
fn cli_resolves_save_slot_through_save_dir() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::copy(fixture_path(1), dir.path().join("slot_1.sav")).expect("copy fixture");

    let save_dir = path_arg(dir.path());
    let output = run_cli(&["--save-dir", &save_dir, "--save-slot", "2", "--deaths"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "deaths=4");
}

#[test]
fn cli_rejects_out_of_range_save_slot() {
    let output = run_cli(&["--save-dir", ".", "--save-slot", "4"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn cli_set_flags_require_output() {
    let output = run_cli(&["--set-chapter", "6", &path_arg(&fixture_path(0))]);
    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--set-* flags require --output"));
}

#[test]
fn cli_output_requires_set_flag() {
    let dir = tempfile::tempdir().expect("temp dir");
    let out = path_arg(&dir.path().join("out.sav"));
    let output = run_cli(&["--output", &out, &path_arg(&fixture_path(0))]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn cli_rejects_malformed_position() {
    let dir = tempfile::tempdir().expect("temp dir");
    let out = path_arg(&dir.path().join("out.sav"));
    let output = run_cli(&[
        "--set-position",
        "1,2",
        "--output",
        &out,
        &path_arg(&fixture_path(0)),
    ]);
    assert!(!output.status.success());
    assert!(!dir.path().join("out.sav").exists());
}

#[test]
fn cli_protected_edit_writes_placeholders() {
    let dir = tempfile::tempdir().expect("temp dir");
    let out_path = dir.path().join("out.sav");
    let out = path_arg(&out_path);
    let source = fixture_path(0);
    let source_bytes = fs::read(&source).expect("read source");

    let output = run_cli(&[
        "--set-chapter",
        "14",
        "--output",
        &out,
        &path_arg(&source),
    ]);
    assert!(output.status.success());
    assert!(
        String::from_utf8_lossy(&output.stdout).contains("Wrote edited save to"),
        "stdout: {}",
        String::from_utf8_lossy(&output.stdout)
    );

    let reread = run_cli(&[
        "--timestamp",
        "--game-version",
        "--elapsed",
        "--deaths",
        "--chapter",
        &out,
    ]);
    assert!(reread.status.success());
    let stdout = String::from_utf8_lossy(&reread.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "timestamp=1601/01/01 - 00:00:00");
    assert_eq!(lines[1], "version=6.9.6.9");
    assert_eq!(lines[2], "elapsed=15000h 00m 00s");
    let deaths: u64 = lines[3]
        .strip_prefix("deaths=")
        .expect("deaths line")
        .parse()
        .expect("deaths should be a number");
    assert!((1..=200).contains(&deaths));
    assert_ne!(deaths, 1);
    assert_eq!(lines[4], "chapter=14");

    assert_eq!(fs::read(&source).expect("read source"), source_bytes);
}

#[test]
fn cli_unprotected_edit_changes_only_edited_bytes() {
    let dir = tempfile::tempdir().expect("temp dir");
    let out_path = dir.path().join("out.sav");
    let output = run_cli(&[
        "--unprotected",
        "--set-scene",
        "9",
        "--set-slot",
        "3",
        "--output",
        &path_arg(&out_path),
        &path_arg(&fixture_path(0)),
    ]);
    assert!(output.status.success());

    let before = fs::read(fixture_path(0)).expect("read fixture");
    let after = fs::read(&out_path).expect("read output");
    assert_eq!(before.len(), after.len());
    let changed: Vec<usize> = before
        .iter()
        .zip(&after)
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(index, _)| index)
        .collect();
    assert_eq!(changed, vec![60, 76]);
    assert_eq!(after[60], 2);
    assert_eq!(after[76], 9);
}

#[test]
fn cli_edits_in_place_when_output_is_source() {
    let dir = tempfile::tempdir().expect("temp dir");
    let save = dir.path().join("slot_0.sav");
    fs::copy(fixture_path(0), &save).expect("copy fixture");
    let save = path_arg(&save);

    let output = run_cli(&[
        "--unprotected",
        "--set-position",
        "1,2,3",
        "--output",
        &save,
        "--position",
        &save,
    ]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "position=1,2,3");

    let reread = run_cli(&["--position", "--deaths", &save]);
    let stdout = String::from_utf8_lossy(&reread.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["deaths=1", "position=1,2,3"]);
}

#[test]
fn cli_only_limits_write_to_one_field() {
    let dir = tempfile::tempdir().expect("temp dir");
    let out_path = dir.path().join("out.sav");
    let output = run_cli(&[
        "--only",
        "chapterId",
        "--set-chapter",
        "7",
        "--set-scene",
        "8",
        "--output",
        &path_arg(&out_path),
        &path_arg(&fixture_path(0)),
    ]);
    assert!(output.status.success());

    let reread = run_cli(&["--game-version", "--chapter", "--scene", &path_arg(&out_path)]);
    let stdout = String::from_utf8_lossy(&reread.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["version=1.0.7.0", "chapter=7", "scene=2"]);
}

#[test]
fn cli_only_rejects_unknown_field() {
    let dir = tempfile::tempdir().expect("temp dir");
    let out_path = dir.path().join("out.sav");
    let output = run_cli(&[
        "--only",
        "health",
        "--set-chapter",
        "7",
        "--output",
        &path_arg(&out_path),
        &path_arg(&fixture_path(0)),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("health"));
    assert!(!out_path.exists());
}

#[test]
fn cli_rejects_oversized_value_before_creating_output() {
    let dir = tempfile::tempdir().expect("temp dir");
    let out_path = dir.path().join("out.sav");
    let output = run_cli(&[
        "--unprotected",
        "--set-version",
        "1.2.3.4.5",
        "--output",
        &path_arg(&out_path),
        &path_arg(&fixture_path(0)),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("version"));
    assert!(!out_path.exists());
}

#[test]
fn cli_set_version_requires_unprotected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let out_path = dir.path().join("out.sav");
    let output = run_cli(&[
        "--set-version",
        "1.2.3.4",
        "--output",
        &path_arg(&out_path),
        &path_arg(&fixture_path(0)),
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--unprotected"));
    assert!(!out_path.exists());
}

#[test]
fn cli_unprotected_set_version_is_written() {
    let dir = tempfile::tempdir().expect("temp dir");
    let out_path = dir.path().join("out.sav");
    let output = run_cli(&[
        "--unprotected",
        "--set-version",
        "1.2.3.4",
        "--output",
        &path_arg(&out_path),
        &path_arg(&fixture_path(0)),
    ]);
    assert!(output.status.success());

    let reread = run_cli(&["--game-version", &path_arg(&out_path)]);
    assert_eq!(String::from_utf8_lossy(&reread.stdout).trim(), "version=1.2.3.4");
}

#[test]
fn cli_compare_prints_changed_fields() {
    let output = run_cli(&[
        "--compare",
        &path_arg(&fixture_path(1)),
        &path_arg(&fixture_path(0)),
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Deathcounter: 1 -> 4",
            "ChapterId: 5 -> 6",
            "SceneId: 2 -> 3",
        ]
    );
}

#[test]
fn cli_compare_json() {
    let output = run_cli(&[
        "--json",
        "--compare",
        &path_arg(&fixture_path(1)),
        &path_arg(&fixture_path(0)),
    ]);
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["chapterId"]["old"], 5);
    assert_eq!(value["chapterId"]["new"], 6);
}

#[test]
fn cli_watch_reports_no_changes_for_idle_save() {
    let output = run_cli(&[
        "--watch",
        "--interval",
        "0",
        "--polls",
        "2",
        &path_arg(&fixture_path(0)),
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["No changes", "No changes"]);
}

#[test]
fn cli_watch_warns_on_slot_mismatch() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::copy(fixture_path(0), dir.path().join("slot_2.sav")).expect("copy fixture");

    let save_dir = path_arg(dir.path());
    let output = run_cli(&[
        "--save-dir",
        &save_dir,
        "--save-slot",
        "3",
        "--watch",
        "--interval",
        "0",
        "--polls",
        "0",
    ]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("stores slot 1"));
}

#[test]
fn cli_reports_missing_save() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = path_arg(&dir.path().join("nope.sav"));
    let output = run_cli(&[&missing]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error reading"));
}
