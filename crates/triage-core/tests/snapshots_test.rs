use chrono::{TimeZone, Utc};

use triage_core::snapshots::{Snapshot, SnapshotStore};

fn snapshot(seq: i64) -> Snapshot {
    Snapshot {
        timestamp: Utc.timestamp_opt(1_700_000_000 + seq, 0).unwrap(),
        total_count: seq as usize,
        priority_pane: 0,
        assigned_pane: 0,
        blocked_pane: 0,
        orphaned_pane: 0,
        urgent: 0,
        important: 0,
        quick_win: 0,
        notable: 0,
        fyi: 0,
        pr_count: 0,
        issue_count: 0,
        median_age_hours: 0.0,
        ci_success: 0,
        ci_failure: 0,
        ci_pending: 0,
    }
}

#[test]
fn appends_accumulate_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("snapshots.jsonl"));

    for seq in 0..3 {
        store.append(&snapshot(seq)).expect("append");
    }

    let loaded = store.load_recent(50);
    assert_eq!(loaded.len(), 3);
    let counts: Vec<usize> = loaded.iter().map(|s| s.total_count).collect();
    assert_eq!(counts, vec![0, 1, 2]);
}

#[test]
fn load_recent_keeps_only_the_tail() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("snapshots.jsonl"));

    for seq in 0..60 {
        store.append(&snapshot(seq)).expect("append");
    }

    let loaded = store.load_recent(50);
    assert_eq!(loaded.len(), 50);
    assert_eq!(loaded.first().unwrap().total_count, 10);
    assert_eq!(loaded.last().unwrap().total_count, 59);
}

#[test]
fn corrupt_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshots.jsonl");
    let store = SnapshotStore::new(&path);

    store.append(&snapshot(1)).expect("append");
    {
        use std::io::Write as _;
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{torn write").unwrap();
    }
    store.append(&snapshot(2)).expect("append");

    let loaded = store.load_recent(50);
    let counts: Vec<usize> = loaded.iter().map(|s| s.total_count).collect();
    assert_eq!(counts, vec![1, 2]);
}

#[test]
fn missing_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("absent.jsonl"));
    assert!(store.load_recent(50).is_empty());
}
