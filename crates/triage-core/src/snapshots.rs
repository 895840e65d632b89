use std::io::Write as _;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resolved::StoreError;

/// One row of aggregate counts, captured once per run and appended to
/// `snapshots.jsonl` for the stats pane's sparklines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub total_count: usize,
    pub priority_pane: usize,
    pub assigned_pane: usize,
    pub blocked_pane: usize,
    pub orphaned_pane: usize,
    pub urgent: usize,
    pub important: usize,
    pub quick_win: usize,
    pub notable: usize,
    pub fyi: usize,
    pub pr_count: usize,
    pub issue_count: usize,
    pub median_age_hours: f64,
    pub ci_success: usize,
    pub ci_failure: usize,
    pub ci_pending: usize,
}

/// Append-only newline-delimited snapshot store. Appends are strictly
/// wall-clock ordered because exactly one append happens per run, before the
/// TUI starts.
#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn append(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(snapshot)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    /// Load the most recent `limit` snapshots, oldest first. Corrupt lines
    /// (a torn append) are skipped.
    pub fn load_recent(&self, limit: usize) -> Vec<Snapshot> {
        let Ok(text) = std::fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        let mut snapshots: Vec<Snapshot> = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| match serde_json::from_str(l) {
                Ok(s) => Some(s),
                Err(err) => {
                    tracing::debug!(%err, "skipping corrupt snapshot line");
                    None
                }
            })
            .collect();
        if snapshots.len() > limit {
            snapshots.drain(..snapshots.len() - limit);
        }
        snapshots
    }
}
