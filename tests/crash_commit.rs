//! Crash Commit Tests
//!
//! Runs `loandesk create` in a subprocess with `LOANDESK_CRASH_POINT` set
//! and checks that the data file afterwards holds either the complete old
//! set or the complete new set, and that reopening cleans up. Also checks
//! that a CLI writer waits for the lock held by another store handle.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::Duration;

use loandesk::crash_point::{points, CRASH_POINT_ENV};
use loandesk::store::{DataFile, RecordStore};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Harness
// =============================================================================

struct Workspace {
    _temp_dir: TempDir,
    config: PathBuf,
    data_file: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = temp_dir.path().join("loandesk.json");
        let data_file = temp_dir.path().join("data").join("loanApplication.json");

        let content = json!({
            "data_file": data_file.to_string_lossy(),
            "log_level": "error"
        });
        fs::write(&config, content.to_string()).unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
            data_file,
        }
    }

    fn spawn(&self, args: &[&str], stdin: Option<&str>, crash_point: Option<&str>) -> Child {
        let mut command = Command::new(env!("CARGO_BIN_EXE_loandesk"));
        command
            .args(args)
            .arg("--config")
            .arg(&self.config)
            .env_remove(CRASH_POINT_ENV)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(point) = crash_point {
            command.env(CRASH_POINT_ENV, point);
        }

        let mut child = command.spawn().expect("spawn loandesk");
        {
            let mut pipe = child.stdin.take().unwrap();
            if let Some(input) = stdin {
                pipe.write_all(input.as_bytes()).unwrap();
            }
        }
        child
    }

    fn run(&self, args: &[&str], stdin: Option<&str>, crash_point: Option<&str>) -> Output {
        self.spawn(args, stdin, crash_point)
            .wait_with_output()
            .expect("wait for loandesk")
    }

    fn create(&self, number: &str, crash_point: Option<&str>) -> Output {
        self.run(&["create"], Some(&record_json(number)), crash_point)
    }

    fn keys(&self) -> Vec<String> {
        RecordStore::open(&self.data_file)
            .unwrap()
            .list_all()
            .unwrap()
            .into_iter()
            .map(|r| r.application_number)
            .collect()
    }
}

fn record_json(number: &str) -> String {
    json!({
        "applicationNumber": number,
        "loanTerms": { "amount": 25000.0, "monthlyPayment": 480.5, "terms": 60 },
        "personalInformation": {
            "name": { "first": "Alan", "last": "Turing" },
            "phoneNumber": "555-0142",
            "email": "alan@example.com"
        },
        "status": 0
    })
    .to_string()
}

fn stale_temp_count(data_file: &Path) -> usize {
    DataFile::new(data_file).stale_temp_files().unwrap().len()
}

fn seeded_workspace() -> Workspace {
    let ws = Workspace::new();
    assert!(ws.run(&["init"], None, None).status.success());
    assert!(ws.create("A-1", None).status.success());
    ws
}

// =============================================================================
// Crash points
// =============================================================================

#[test]
fn test_crash_before_rename_points_keep_old_set() {
    for point in [
        points::STORE_BEFORE_TEMP_WRITE,
        points::STORE_AFTER_TEMP_WRITE,
        points::STORE_BEFORE_RENAME,
    ] {
        let ws = seeded_workspace();
        let before = fs::read(&ws.data_file).unwrap();

        let output = ws.create("A-2", Some(point));
        assert!(!output.status.success(), "{} did not abort", point);
        assert!(String::from_utf8_lossy(&output.stderr).contains(point));

        assert_eq!(fs::read(&ws.data_file).unwrap(), before, "{}", point);
        assert_eq!(ws.keys(), vec!["A-1".to_string()], "{}", point);
        assert_eq!(stale_temp_count(&ws.data_file), 0, "{}", point);
    }
}

#[test]
fn test_crash_after_temp_write_leaves_temp_until_reopen() {
    let ws = seeded_workspace();

    let output = ws.create("A-2", Some(points::STORE_AFTER_TEMP_WRITE));
    assert!(!output.status.success());
    assert_eq!(stale_temp_count(&ws.data_file), 1);

    RecordStore::open(&ws.data_file).unwrap();
    assert_eq!(stale_temp_count(&ws.data_file), 0);
}

#[test]
fn test_crash_after_rename_keeps_new_set() {
    let ws = seeded_workspace();

    let output = ws.create("A-2", Some(points::STORE_AFTER_RENAME));
    assert!(!output.status.success());

    assert_eq!(ws.keys(), vec!["A-1".to_string(), "A-2".to_string()]);
    assert_eq!(stale_temp_count(&ws.data_file), 0);
}

#[test]
fn test_store_recovers_after_crash() {
    let ws = seeded_workspace();
    assert!(!ws.create("A-2", Some(points::STORE_BEFORE_RENAME)).status.success());

    let output = ws.create("A-2", None);
    assert!(output.status.success());
    assert_eq!(ws.keys(), vec!["A-1".to_string(), "A-2".to_string()]);
}

// =============================================================================
// CLI error reporting
// =============================================================================

#[test]
fn test_duplicate_create_prints_error_document() {
    let ws = seeded_workspace();

    let output = ws.create("A-1", None);
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let doc: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(doc["status"], "error");
    assert_eq!(doc["code"], "LOAN_DUPLICATE_KEY");
    assert_eq!(doc["message"], "Application number 'A-1' already exists.");
}

#[test]
fn test_list_prints_records() {
    let ws = seeded_workspace();

    let output = ws.run(&["list"], None, None);
    assert!(output.status.success());

    let records: Vec<serde_json::Value> =
        serde_json::from_slice(&output.stdout).expect("list output is a JSON array");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["applicationNumber"], "A-1");
}

// =============================================================================
// Cross-process writer lock
// =============================================================================

#[test]
fn test_cli_create_waits_for_held_writer_lock() {
    let ws = seeded_workspace();
    let held = DataFile::new(&ws.data_file).lock().unwrap();

    let mut child = ws.spawn(&["create"], Some(&record_json("A-2")), None);
    thread::sleep(Duration::from_millis(500));

    assert!(child.try_wait().unwrap().is_none(), "create ran without the lock");
    let stored = DataFile::new(&ws.data_file).load().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].application_number, "A-1");

    drop(held);
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert_eq!(ws.keys(), vec!["A-1".to_string(), "A-2".to_string()]);
}

#[test]
fn test_cli_create_alongside_open_store_keeps_both_writes() {
    let ws = seeded_workspace();
    let store = RecordStore::open(&ws.data_file).unwrap();

    let child = ws.spawn(&["create"], Some(&record_json("CLI-1")), None);

    let mut input: loandesk::application::ApplicationInput =
        serde_json::from_str(&record_json("SRV-1")).unwrap();
    for i in 0..20 {
        input.application_number = format!("SRV-{}", i);
        store.create(input.clone()).unwrap();
    }

    assert!(child.wait_with_output().unwrap().status.success());

    let keys = ws.keys();
    assert_eq!(keys.len(), 22);
    assert!(keys.contains(&"CLI-1".to_string()));
}
