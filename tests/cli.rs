use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_points(contents: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp point file");
    tmp.write_all(contents.as_bytes()).expect("write point file");
    tmp
}

#[test]
fn summary_reports_points_and_skipped_lines() {
    let file = write_points(
        "header\n\
         X: 1.0, Y: 2.0, Z: 3.0, r: 0.1, g: 0.2, b: 0.3\n\
         garbage line\n\
         X: -1.0, Y: 0.0, Z: 0.0, r: 1.0, g: 0.0, b: 0.0\n",
    );
    let mut cmd = Command::cargo_bin("point-strip").expect("binary exists");
    cmd.arg(file.path())
        .arg("--scale")
        .arg("0.5")
        .arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("Loaded 2 point(s)"))
        .stdout(contains("(1 line(s) skipped)"))
        .stdout(contains(
            "Bounds: min=(-1.00, 0.00, 0.00) max=(1.00, 2.00, 3.00)",
        ))
        .stdout(contains("Vertex buffer: 12 floats"));
}

#[test]
fn missing_point_file_is_not_fatal() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut cmd = Command::cargo_bin("point-strip").expect("binary exists");
    cmd.arg(dir.path().join("nope.txt")).arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("Loaded 0 point(s)"))
        .stdout(contains("Vertex buffer: 0 floats"))
        .stdout(contains("Bounds").not());
}

#[test]
fn unknown_flag_fails_with_usage() {
    let mut cmd = Command::cargo_bin("point-strip").expect("binary exists");
    cmd.arg("--wireframe");
    cmd.assert()
        .failure()
        .stderr(contains("Usage: point-strip"));
}

#[test]
fn malformed_lines_are_reported_without_rust_log() {
    let file = write_points(
        "header\n\
         X: 1.0, Y: 2.0, Z: 3.0, r: 0.1, g: 0.2\n\
         X: 4.0, Y: 5.0, Z: 6.0, r: 0.4, g: 0.5, b: 0.6\n",
    );
    let mut cmd = Command::cargo_bin("point-strip").expect("binary exists");
    cmd.env_remove("RUST_LOG")
        .arg(file.path())
        .arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("Loaded 1 point(s)"))
        .stderr(contains("Failed to read line 2"));
}

#[cfg(target_os = "linux")]
#[test]
fn window_init_failure_is_fatal() {
    let file = write_points("header\nX: 1, Y: 2, Z: 3, r: 1, g: 1, b: 1\n");
    let mut cmd = Command::cargo_bin("point-strip").expect("binary exists");
    cmd.env_remove("DISPLAY")
        .env_remove("WAYLAND_DISPLAY")
        .env_remove("WAYLAND_SOCKET")
        .arg(file.path());
    cmd.assert()
        .failure()
        .code(1)
        .stderr(contains("failed to initialize"))
        .stdout(contains("Loaded").not());
}
