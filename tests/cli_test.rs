mod common;

use std::path::Path;
use std::process::{Command, Output};

use common::{seconds_to_samples, speech_like, write_wav};
use serde_json::Value;
use tempfile::TempDir;

fn cli() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_audio_offset_finder"));
    command.args(["--decoder", "wav", "--correlation-frames", "200", "--seed", "1"]);
    command
}

fn arg(path: &Path) -> &str {
    path.to_str().expect("UTF-8 temp path")
}

/// Reference of 12 s and 5 s clips cut at 2 s and 6 s
fn recordings(dir: &Path) -> (std::path::PathBuf, Vec<std::path::PathBuf>) {
    let reference = speech_like(30, 12.0);
    let clips = [2.0, 6.0]
        .iter()
        .enumerate()
        .map(|(i, &seconds)| {
            let start = seconds_to_samples(seconds);
            let clip = &reference[start..start + seconds_to_samples(5.0)];
            write_wav(dir, &format!("clip_{i}.wav"), clip)
        })
        .collect();
    (write_wav(dir, "reference.wav", &reference), clips)
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "CLI exited with {:?}: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).expect("stdout UTF-8")
}

#[test]
fn find_prints_offset_and_score() {
    let dir = TempDir::new().unwrap();
    let (reference, clips) = recordings(dir.path());

    let output = cli()
        .args(["find", "--within", arg(&reference), "--find-offset-of", arg(&clips[0])])
        .output()
        .expect("failed to run audio_offset_finder find");
    let stdout = stdout_of(&output);

    assert!(
        stdout.contains("Offset: 2.000 (seconds)"),
        "unexpected output: {stdout}"
    );
    assert!(stdout.contains("Standard score: "), "unexpected output: {stdout}");
}

#[test]
fn find_emits_json() {
    let dir = TempDir::new().unwrap();
    let (reference, clips) = recordings(dir.path());

    let output = cli()
        .args([
            "--json",
            "find",
            "--within",
            arg(&reference),
            "--find-offset-of",
            arg(&clips[1]),
        ])
        .output()
        .expect("failed to run audio_offset_finder find --json");
    let stdout = stdout_of(&output);

    let json: Value = serde_json::from_str(stdout.trim()).expect("result JSON payload");
    assert_eq!(json["frame_index"], 300);
    let offset = json["offset_seconds"].as_f64().expect("offset number");
    assert!((offset - 6.0).abs() < 1e-9, "offset {offset}");
    assert!(json["score"].as_f64().expect("score number") > 0.0);
}

#[test]
fn scan_reports_every_query() {
    let dir = TempDir::new().unwrap();
    let (reference, clips) = recordings(dir.path());

    let output = cli()
        .args(["--json", "scan", "--within", arg(&reference), arg(&clips[0]), arg(&clips[1])])
        .output()
        .expect("failed to run audio_offset_finder scan");
    let stdout = stdout_of(&output);

    let reports: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("scan JSON line"))
        .collect();
    assert_eq!(reports.len(), 2);
    for (report, (clip, expected)) in reports.iter().zip(clips.iter().zip([2.0, 6.0])) {
        assert_eq!(report["query"], arg(clip));
        let offset = report["offset_seconds"].as_f64().expect("offset number");
        assert!((offset - expected).abs() < 1e-9, "offset {offset}");
    }
}

#[test]
fn missing_input_exits_with_error() {
    let dir = TempDir::new().unwrap();
    let (reference, _) = recordings(dir.path());
    let missing = dir.path().join("missing.wav");

    let output = cli()
        .args(["find", "--within", arg(&reference), "--find-offset-of", arg(&missing)])
        .output()
        .expect("failed to run audio_offset_finder find");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(stderr.contains("Error:"), "expected error on stderr, got {stderr}");
    assert!(stderr.contains("code 1001"), "expected decode error code, got {stderr}");
}

#[test]
fn scan_continues_past_bad_query() {
    let dir = TempDir::new().unwrap();
    let (reference, clips) = recordings(dir.path());
    let missing = dir.path().join("missing.wav");

    let output = cli()
        .args(["--json", "scan", "--within", arg(&reference), arg(&missing), arg(&clips[0])])
        .output()
        .expect("failed to run audio_offset_finder scan");
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    assert_eq!(stdout.lines().count(), 1, "one successful report expected");
}

#[test]
fn rate_mismatch_is_reported() {
    let dir = TempDir::new().unwrap();
    let (reference, clips) = recordings(dir.path());

    let output = cli()
        .args([
            "--sr",
            "16000",
            "find",
            "--within",
            arg(&reference),
            "--find-offset-of",
            arg(&clips[0]),
        ])
        .output()
        .expect("failed to run audio_offset_finder find");
    assert_eq!(output.status.code(), Some(1));
}
