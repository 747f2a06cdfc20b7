//! End-to-end CLI tests for tgexport.
//!
//! These tests run the actual binary against an archive fixture and check
//! its output and the files it writes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test cli_e2e
//! ```

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Creates an archive with five messages (id 3 missing) and one media blob.
fn setup_fixtures() -> TempDir {
    let dir = tempdir().expect("Failed to create temp dir");

    let archive = r#"{
  "chats": [
    {
      "id": -1001234567890,
      "username": "testchan",
      "title": "Test Channel",
      "messages": [
        {"id": 1, "date": 1705314600, "from_user": {"id": 1, "first_name": "Alice"}, "text": "Hello!"},
        {"id": 2, "date": 1705314660, "from_user": {"id": 2, "first_name": "Bob"}, "text": "Hi Alice!", "reply_to_message_id": 1},
        {"id": 4, "date": 1705314780, "from_user": {"id": 1, "first_name": "Alice"}, "caption": "Look", "photo": [{"file_id": "p4", "file_size": 4}]},
        {"id": 5, "date": 1705314840, "new_chat_title": "Renamed Channel"}
      ]
    }
  ]
}"#;
    fs::write(dir.path().join("archive.json"), archive).unwrap();

    fs::create_dir_all(dir.path().join("media")).unwrap();
    fs::write(dir.path().join("media").join("p4"), b"jpeg").unwrap();

    dir
}

fn tgexport() -> Command {
    Command::cargo_bin("tgexport").expect("binary builds")
}

fn files_with_suffix(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.to_string_lossy().ends_with(suffix))
        .collect()
}

// ============================================================================
// Basic functionality
// ============================================================================

#[test]
fn test_full_export() {
    let dir = setup_fixtures();
    let out = dir.path().join("out");

    tgexport()
        .arg("https://t.me/testchan/1")
        .arg("https://t.me/testchan/5")
        .arg("--archive")
        .arg(dir.path().join("archive.json"))
        .arg("-o")
        .arg(&out)
        .arg("-q")
        .assert()
        .success()
        .stdout(predicate::str::contains("Export complete"))
        .stdout(predicate::str::contains("Successful:  4"))
        .stdout(predicate::str::contains("Service:     1"))
        .stdout(predicate::str::contains("Failed:      1"));

    assert_eq!(files_with_suffix(&out, ".html").len(), 1);
    assert_eq!(files_with_suffix(&out, ".json").len(), 1);
    assert!(out.join("style.css").exists());
    assert!(out.join("script.js").exists());
    assert_eq!(fs::read(out.join("media").join("photo_4.jpg")).unwrap(), b"jpeg");

    let html = fs::read_to_string(&files_with_suffix(&out, ".html")[0]).unwrap();
    assert!(html.contains("<h1>Test Channel</h1>"));
    assert!(html.contains(r#"onclick="scrollToMessage(1)""#));
    assert!(html.contains(r#"class="message failed" id="message-3""#));
    assert!(html.contains(r#"<img src="media/photo_4.jpg""#));
}

#[test]
fn test_jsonl_format() {
    let dir = setup_fixtures();
    let out = dir.path().join("out");

    tgexport()
        .args(["https://t.me/testchan/1", "https://t.me/testchan/2", "-f", "jsonl", "-q"])
        .arg("--archive")
        .arg(dir.path().join("archive.json"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let dumps = files_with_suffix(&out, ".jsonl");
    assert_eq!(dumps.len(), 1);
    let content = fs::read_to_string(&dumps[0]).unwrap();
    assert_eq!(content.lines().count(), 3);
}

#[test]
fn test_csv_format() {
    let dir = setup_fixtures();
    let out = dir.path().join("out");

    tgexport()
        .args(["https://t.me/testchan/1", "https://t.me/testchan/2", "-f", "csv", "-q"])
        .arg("--archive")
        .arg(dir.path().join("archive.json"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let dumps = files_with_suffix(&out, ".csv");
    assert_eq!(dumps.len(), 1);
    let content = fs::read_to_string(&dumps[0]).unwrap();
    assert!(content.starts_with("id;date;"));
}

#[test]
fn test_dump_only() {
    let dir = setup_fixtures();
    let out = dir.path().join("out");

    tgexport()
        .args(["https://t.me/testchan/1", "https://t.me/testchan/5", "--dump-only", "-q"])
        .arg("--archive")
        .arg(dir.path().join("archive.json"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Dump:"));

    assert!(files_with_suffix(&out, ".html").is_empty());
    assert!(!out.join("media").exists());
}

#[test]
fn test_no_media() {
    let dir = setup_fixtures();
    let out = dir.path().join("out");

    tgexport()
        .args(["https://t.me/testchan/4", "https://t.me/testchan/4", "--no-media", "-q"])
        .arg("--archive")
        .arg(dir.path().join("archive.json"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    assert!(!out.join("media").exists());
    let html = fs::read_to_string(&files_with_suffix(&out, ".html")[0]).unwrap();
    assert!(html.contains("📷 Photo (4.0 B)"));
}

#[test]
fn test_internal_links() {
    let dir = setup_fixtures();
    let out = dir.path().join("out");

    tgexport()
        .args(["https://t.me/c/1234567890/2", "https://t.me/c/1234567890/1", "-q"])
        .arg("--archive")
        .arg(dir.path().join("archive.json"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total:       2"));
}

#[test]
fn test_progress_on_stderr() {
    let dir = setup_fixtures();
    let out = dir.path().join("out");

    tgexport()
        .args(["https://t.me/testchan/1", "https://t.me/testchan/2"])
        .arg("--archive")
        .arg(dir.path().join("archive.json"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Fetching messages"));
}

// ============================================================================
// Error handling
// ============================================================================

#[test]
fn test_invalid_link() {
    let dir = setup_fixtures();

    tgexport()
        .args(["https://example.com/testchan/1", "https://t.me/testchan/2"])
        .arg("--archive")
        .arg(dir.path().join("archive.json"))
        .arg("-o")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("❌ Error"))
        .stderr(predicate::str::contains("Invalid message link"));
}

#[test]
fn test_chat_mismatch() {
    let dir = setup_fixtures();
    let out = dir.path().join("out");

    tgexport()
        .args(["https://t.me/testchan/1", "https://t.me/otherchan/2"])
        .arg("--archive")
        .arg(dir.path().join("archive.json"))
        .arg("-o")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("different chats"));

    assert!(!out.exists());
}

#[test]
fn test_missing_archive() {
    let dir = tempdir().unwrap();

    tgexport()
        .args(["https://t.me/testchan/1", "https://t.me/testchan/2"])
        .arg("--archive")
        .arg(dir.path().join("nope.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("IO error"));
}

#[test]
fn test_malformed_archive() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, "{ not json").unwrap();

    tgexport()
        .args(["https://t.me/testchan/1", "https://t.me/testchan/2"])
        .arg("--archive")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid archive"));
}

#[test]
fn test_zero_batch_size() {
    let dir = setup_fixtures();

    tgexport()
        .args(["https://t.me/testchan/1", "https://t.me/testchan/2", "--batch-size", "0"])
        .arg("--archive")
        .arg(dir.path().join("archive.json"))
        .arg("-o")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_missing_arguments() {
    tgexport()
        .arg("https://t.me/testchan/1")
        .assert()
        .failure();
}

#[test]
fn test_help() {
    tgexport()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--archive"))
        .stdout(predicate::str::contains("--dump-only"));
}
