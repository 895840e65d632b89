use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::item::{Details, Item};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Tier TTLs.
const DETAILS_TTL_SECS: i64 = 24 * 3600;
const NOTIFICATIONS_TTL_SECS: i64 = 3600;
const PR_LIST_TTL_SECS: i64 = 5 * 60;

const NOTIFICATIONS_MANIFEST: &str = "notifications.manifest";
const PR_MANIFEST: &str = "prs.manifest";
const DETAILS_DIR: &str = "details";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub fetched_at: DateTime<Utc>,
    pub value: T,
}

impl<T> CacheEntry<T> {
    fn fresh(&self, ttl_secs: i64, now: DateTime<Utc>) -> bool {
        now - self.fetched_at < Duration::seconds(ttl_secs)
    }
}

/// Counts reported by `triage cache stats`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub detail_entries: usize,
    pub notification_lists: usize,
    pub pr_lists: usize,
    pub disk_bytes: u64,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// DetailCache
// ---------------------------------------------------------------------------

/// Three-tier TTL-bounded cache.
///
/// Item details live one JSON file per item under `details/`, so an
/// interrupted write can corrupt at most one entry; a corrupt entry reads as
/// a miss. Notification and PR list results live in memory, mirrored to a
/// single manifest file per tier. Eviction is lazy on read; `clear` empties
/// everything.
pub struct DetailCache {
    dir: PathBuf,
    details: DashMap<String, CacheEntry<Details>>,
    notifications: DashMap<String, CacheEntry<Vec<Item>>>,
    pr_lists: DashMap<String, CacheEntry<Vec<Item>>>,
}

impl DetailCache {
    /// Open the cache rooted at `dir`, loading both list manifests. Missing
    /// or corrupt manifests start that tier empty.
    pub async fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let notifications = read_manifest(&dir.join(NOTIFICATIONS_MANIFEST)).await;
        let pr_lists = read_manifest(&dir.join(PR_MANIFEST)).await;
        Self {
            dir,
            details: DashMap::new(),
            notifications,
            pr_lists,
        }
    }

    /// Canonical key for the item-details tier.
    pub fn details_key(repo_full_name: &str, number: u64) -> String {
        format!("{}#{}", repo_full_name, number)
    }

    fn details_path(&self, repo_full_name: &str, number: u64) -> PathBuf {
        let stem = repo_full_name.replace('/', "_");
        self.dir
            .join(DETAILS_DIR)
            .join(format!("{}_{}.json", stem, number))
    }

    // -----------------------------------------------------------------------
    // Item details tier (24 h, one file per item)
    // -----------------------------------------------------------------------

    pub async fn lookup_details(
        &self,
        repo_full_name: &str,
        number: u64,
        now: DateTime<Utc>,
    ) -> Option<Details> {
        let key = Self::details_key(repo_full_name, number);

        if let Some(entry) = self.details.get(&key) {
            if entry.fresh(DETAILS_TTL_SECS, now) {
                return Some(entry.value.clone());
            }
        }
        // Stale in memory, or not resident: consult disk, then lazily evict.
        self.details.remove(&key);

        let path = self.details_path(repo_full_name, number);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!(%err, ?path, "detail cache read failed");
                }
                return None;
            }
        };
        let entry: CacheEntry<Details> = match serde_json::from_slice(&bytes) {
            Ok(e) => e,
            Err(err) => {
                tracing::debug!(%err, ?path, "corrupt detail cache entry, treating as miss");
                return None;
            }
        };
        if !entry.fresh(DETAILS_TTL_SECS, now) {
            let _ = tokio::fs::remove_file(&path).await;
            return None;
        }
        let value = entry.value.clone();
        self.details.insert(key, entry);
        Some(value)
    }

    /// Concurrent stores for the same key are serialized by the temp-file +
    /// rename; the last writer wins.
    pub async fn store_details(
        &self,
        repo_full_name: &str,
        number: u64,
        details: Details,
        now: DateTime<Utc>,
    ) {
        let key = Self::details_key(repo_full_name, number);
        let entry = CacheEntry {
            fetched_at: now,
            value: details,
        };

        let path = self.details_path(repo_full_name, number);
        if let Err(err) = write_entry(&path, &entry).await {
            tracing::debug!(%err, ?path, "detail cache write failed");
        }
        self.details.insert(key, entry);
    }

    // -----------------------------------------------------------------------
    // Notification list tier (1 h)
    // -----------------------------------------------------------------------

    /// Bucket `since` to the hour so nearby lookback windows share an entry.
    pub fn notifications_key(since: DateTime<Utc>) -> String {
        since.format("%Y-%m-%dT%H").to_string()
    }

    pub fn lookup_notifications(&self, key: &str, now: DateTime<Utc>) -> Option<Vec<Item>> {
        lookup_list(&self.notifications, key, NOTIFICATIONS_TTL_SECS, now)
    }

    pub async fn store_notifications(&self, key: &str, items: Vec<Item>, now: DateTime<Utc>) {
        self.notifications.insert(
            key.to_string(),
            CacheEntry {
                fetched_at: now,
                value: items,
            },
        );
        self.persist_manifest(NOTIFICATIONS_MANIFEST, &self.notifications)
            .await;
    }

    // -----------------------------------------------------------------------
    // PR/issue list tier (5 min)
    // -----------------------------------------------------------------------

    pub fn pr_list_key(user: &str, query_kind: &str) -> String {
        format!("{}:{}", user, query_kind)
    }

    pub fn lookup_pr_list(&self, key: &str, now: DateTime<Utc>) -> Option<Vec<Item>> {
        lookup_list(&self.pr_lists, key, PR_LIST_TTL_SECS, now)
    }

    pub async fn store_pr_list(&self, key: &str, items: Vec<Item>, now: DateTime<Utc>) {
        self.pr_lists.insert(
            key.to_string(),
            CacheEntry {
                fetched_at: now,
                value: items,
            },
        );
        self.persist_manifest(PR_MANIFEST, &self.pr_lists).await;
    }

    // -----------------------------------------------------------------------
    // Maintenance
    // -----------------------------------------------------------------------

    pub async fn stats(&self) -> Result<CacheStats, CacheError> {
        let mut stats = CacheStats {
            notification_lists: self.notifications.len(),
            pr_lists: self.pr_lists.len(),
            ..CacheStats::default()
        };

        let details_dir = self.dir.join(DETAILS_DIR);
        if let Ok(mut entries) = tokio::fs::read_dir(&details_dir).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                let Ok(meta) = entry.metadata().await else {
                    continue;
                };
                if !meta.is_file() {
                    continue;
                }
                stats.detail_entries += 1;
                stats.disk_bytes += meta.len();
                if let Ok(bytes) = tokio::fs::read(entry.path()).await {
                    if let Ok(parsed) = serde_json::from_slice::<CacheEntry<Details>>(&bytes) {
                        let at = parsed.fetched_at;
                        stats.oldest_entry =
                            Some(stats.oldest_entry.map_or(at, |o: DateTime<Utc>| o.min(at)));
                        stats.newest_entry =
                            Some(stats.newest_entry.map_or(at, |n: DateTime<Utc>| n.max(at)));
                    }
                }
            }
        }
        for name in [NOTIFICATIONS_MANIFEST, PR_MANIFEST] {
            if let Ok(meta) = tokio::fs::metadata(self.dir.join(name)).await {
                stats.disk_bytes += meta.len();
            }
        }
        Ok(stats)
    }

    /// Empty all three tiers. Returns the number of entries dropped.
    pub async fn clear(&self) -> Result<usize, CacheError> {
        let mut dropped = self.notifications.len() + self.pr_lists.len();
        self.details.clear();
        self.notifications.clear();
        self.pr_lists.clear();

        let details_dir = self.dir.join(DETAILS_DIR);
        if let Ok(mut entries) = tokio::fs::read_dir(&details_dir).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                if tokio::fs::remove_file(entry.path()).await.is_ok() {
                    dropped += 1;
                }
            }
        }
        for name in [NOTIFICATIONS_MANIFEST, PR_MANIFEST] {
            let _ = tokio::fs::remove_file(self.dir.join(name)).await;
        }
        Ok(dropped)
    }

    async fn persist_manifest(&self, name: &str, tier: &DashMap<String, CacheEntry<Vec<Item>>>) {
        let map: HashMap<String, CacheEntry<Vec<Item>>> = tier
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        let path = self.dir.join(name);
        if let Err(err) = write_entry(&path, &map).await {
            tracing::debug!(%err, ?path, "manifest write failed");
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn lookup_list(
    tier: &DashMap<String, CacheEntry<Vec<Item>>>,
    key: &str,
    ttl_secs: i64,
    now: DateTime<Utc>,
) -> Option<Vec<Item>> {
    if let Some(entry) = tier.get(key) {
        if entry.fresh(ttl_secs, now) {
            return Some(entry.value.clone());
        }
    }
    tier.remove(key);
    None
}

async fn read_manifest(path: &PathBuf) -> DashMap<String, CacheEntry<Vec<Item>>> {
    let map = DashMap::new();
    let Ok(bytes) = tokio::fs::read(path).await else {
        return map;
    };
    match serde_json::from_slice::<HashMap<String, CacheEntry<Vec<Item>>>>(&bytes) {
        Ok(parsed) => {
            for (k, v) in parsed {
                map.insert(k, v);
            }
        }
        Err(err) => {
            tracing::debug!(%err, ?path, "corrupt manifest, starting empty");
        }
    }
    map
}

/// Write via a temp file and rename so a torn write never leaves a partial
/// entry at the final path.
async fn write_entry<T: Serialize>(path: &PathBuf, value: &T) -> Result<(), CacheError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec(value)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
