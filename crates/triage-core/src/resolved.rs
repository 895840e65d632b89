use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    #[serde(rename = "resolvedAt")]
    pub resolved_at: DateTime<Utc>,
}

/// Persistent set of user-dismissed items, keyed by item id.
///
/// The in-memory map is authoritative for the run; a failed save is reported
/// to the caller but does not roll back state.
#[derive(Debug)]
pub struct ResolvedStore {
    path: PathBuf,
    records: HashMap<String, ResolvedRecord>,
}

impl ResolvedStore {
    /// Load from `resolved.json`, treating a missing or corrupt file as
    /// empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = std::fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default();
        Self { path, records }
    }

    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.records)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Record that the user resolved `id` as of the item's current
    /// `updated_at`. Any newer upstream activity re-surfaces it.
    pub fn resolve(&mut self, id: impl Into<String>, resolved_at: DateTime<Utc>) {
        self.records
            .insert(id.into(), ResolvedRecord { resolved_at });
    }

    /// An item is shown unless a record exists whose `resolved_at` is not
    /// earlier than the item's `updated_at`. Unknown ids are always shown.
    pub fn should_show(&self, id: &str, updated_at: DateTime<Utc>) -> bool {
        match self.records.get(id) {
            Some(record) => updated_at > record.resolved_at,
            None => true,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
