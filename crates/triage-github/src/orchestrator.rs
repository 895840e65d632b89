use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;

use triage_core::cache::DetailCache;
use triage_core::item::{Item, ItemKey};

use crate::cancel::CancelFlag;
use crate::enrich::{enrich_with_gate, EnrichReport};
use crate::progress::{emit, ProgressEvent, Source};
use crate::provider::{Provider, ProviderError};

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub since: DateTime<Utc>,
    pub orphaned_repos: Vec<String>,
    pub stale_days: u32,
    pub workers: usize,
}

/// The five source slices, each in GitHub's returned order, plus the
/// aggregated enrichment report.
#[derive(Debug, Default)]
pub struct FetchResult {
    pub notifications: Vec<Item>,
    pub review_prs: Vec<Item>,
    pub authored_prs: Vec<Item>,
    pub assigned_issues: Vec<Item>,
    pub orphaned: Vec<Item>,
    pub enrichment: EnrichReport,
}

/// Per-source added counts from the merge, so callers can surface
/// "N PRs awaiting your review".
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeStats {
    pub review_prs_added: usize,
    pub authored_prs_added: usize,
    pub assigned_issues_added: usize,
    pub orphaned_added: usize,
}

impl MergeStats {
    pub fn total_added(&self) -> usize {
        self.review_prs_added
            + self.authored_prs_added
            + self.assigned_issues_added
            + self.orphaned_added
    }
}

/// Run the five source queries concurrently, enriching each slice as soon as
/// its fetch completes (sources share one pool of `workers` permits).
///
/// Only a notifications failure is fatal; every other source degrades to an
/// empty slice with a warning.
pub async fn fetch_all(
    provider: Arc<dyn Provider>,
    cache: Arc<DetailCache>,
    user: &str,
    opts: &FetchOptions,
    progress: &flume::Sender<ProgressEvent>,
    cancel: &CancelFlag,
) -> Result<FetchResult, ProviderError> {
    let gate = Arc::new(Semaphore::new(opts.workers.max(1)));
    let now = Utc::now();

    let notifications = async {
        let key = DetailCache::notifications_key(opts.since);
        let (mut items, from_cache) = match cache.lookup_notifications(&key, now) {
            Some(items) => (items, true),
            None => {
                let items = race_cancel(cancel, provider.notifications(opts.since)).await?;
                cache.store_notifications(&key, items.clone(), now).await;
                (items, false)
            }
        };
        emit(
            progress,
            ProgressEvent::SourceCompleted {
                source: Source::Notifications,
                count: items.len(),
                from_cache,
            },
        );
        let report = enrich_slice(&provider, &cache, &mut items, &gate, progress, cancel).await;
        Ok::<_, ProviderError>((items, report))
    };

    let review_prs = fetch_list_source(
        &provider,
        &cache,
        Source::ReviewPrs,
        DetailCache::pr_list_key(user, "review"),
        provider.review_requested_prs(user),
        &gate,
        progress,
        cancel,
        now,
    );
    let authored_prs = fetch_list_source(
        &provider,
        &cache,
        Source::AuthoredPrs,
        DetailCache::pr_list_key(user, "authored"),
        provider.authored_prs(user),
        &gate,
        progress,
        cancel,
        now,
    );
    let assigned_issues = fetch_list_source(
        &provider,
        &cache,
        Source::AssignedIssues,
        DetailCache::pr_list_key(user, "assigned"),
        provider.assigned_issues(user),
        &gate,
        progress,
        cancel,
        now,
    );
    let orphaned = async {
        match race_cancel(
            cancel,
            provider.orphaned_items(&opts.orphaned_repos, opts.stale_days),
        )
        .await
        {
            Ok(mut items) => {
                emit(
                    progress,
                    ProgressEvent::SourceCompleted {
                        source: Source::Orphaned,
                        count: items.len(),
                        from_cache: false,
                    },
                );
                let report =
                    enrich_slice(&provider, &cache, &mut items, &gate, progress, cancel).await;
                (items, report)
            }
            Err(err) => source_failed(Source::Orphaned, err, progress),
        }
    };

    let (notifications, review_prs, authored_prs, assigned_issues, orphaned) =
        tokio::join!(notifications, review_prs, authored_prs, assigned_issues, orphaned);

    let (notifications, notif_report) = notifications?;

    let mut result = FetchResult {
        notifications,
        ..FetchResult::default()
    };
    result.enrichment = notif_report;
    let (items, report) = review_prs;
    result.review_prs = items;
    result.enrichment.absorb(report);
    let (items, report) = authored_prs;
    result.authored_prs = items;
    result.enrichment.absorb(report);
    let (items, report) = assigned_issues;
    result.assigned_issues = items;
    result.enrichment.absorb(report);
    let (items, report) = orphaned;
    result.orphaned = items;
    result.enrichment.absorb(report);

    if result.enrichment.rate_limited {
        emit(
            progress,
            ProgressEvent::RateLimited {
                reset: result.enrichment.rate_limit_reset,
            },
        );
    }
    if result.enrichment.failures > 0 {
        tracing::warn!(
            failures = result.enrichment.failures,
            sample = result.enrichment.sample_error.as_deref().unwrap_or("-"),
            "some items could not be enriched"
        );
    }

    Ok(result)
}

/// One cached secondary source: list-tier lookup, provider fallback, then
/// slice enrichment. Failures degrade to an empty slice.
#[allow(clippy::too_many_arguments)]
async fn fetch_list_source(
    provider: &Arc<dyn Provider>,
    cache: &Arc<DetailCache>,
    source: Source,
    cache_key: String,
    fetch: impl std::future::Future<Output = Result<Vec<Item>, ProviderError>>,
    gate: &Arc<Semaphore>,
    progress: &flume::Sender<ProgressEvent>,
    cancel: &CancelFlag,
    now: DateTime<Utc>,
) -> (Vec<Item>, EnrichReport) {
    let (mut items, from_cache) = match cache.lookup_pr_list(&cache_key, now) {
        Some(items) => (items, true),
        None => match race_cancel(cancel, fetch).await {
            Ok(items) => {
                cache.store_pr_list(&cache_key, items.clone(), now).await;
                (items, false)
            }
            Err(err) => return source_failed(source, err, progress),
        },
    };
    emit(
        progress,
        ProgressEvent::SourceCompleted {
            source,
            count: items.len(),
            from_cache,
        },
    );
    let report = enrich_slice(provider, cache, &mut items, gate, progress, cancel).await;
    (items, report)
}

/// Race a provider call against the ambient cancellation signal. Checks the
/// flag before issuing the call, then aborts the in-flight future on cancel.
async fn race_cancel<T>(
    cancel: &CancelFlag,
    fetch: impl std::future::Future<Output = Result<T, ProviderError>>,
) -> Result<T, ProviderError> {
    if cancel.is_cancelled() {
        return Err(ProviderError::Cancelled);
    }
    tokio::select! {
        _ = cancel.cancelled() => Err(ProviderError::Cancelled),
        result = fetch => result,
    }
}

fn source_failed(
    source: Source,
    err: ProviderError,
    progress: &flume::Sender<ProgressEvent>,
) -> (Vec<Item>, EnrichReport) {
    tracing::warn!(source = source.label(), %err, "source fetch failed");
    emit(
        progress,
        ProgressEvent::SourceFailed {
            source,
            message: err.to_string(),
        },
    );
    let mut report = EnrichReport::default();
    if let ProviderError::RateLimited { reset } = err {
        report.rate_limited = true;
        report.rate_limit_reset = reset;
    }
    (Vec::new(), report)
}

async fn enrich_slice(
    provider: &Arc<dyn Provider>,
    cache: &Arc<DetailCache>,
    items: &mut [Item],
    gate: &Arc<Semaphore>,
    progress: &flume::Sender<ProgressEvent>,
    cancel: &CancelFlag,
) -> EnrichReport {
    let tx = progress.clone();
    enrich_with_gate(
        Arc::clone(provider),
        Arc::clone(cache),
        items,
        Arc::clone(gate),
        move |completed, total| emit(&tx, ProgressEvent::Enrichment { completed, total }),
        cancel,
    )
    .await
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Deterministic dedup merge. Notifications seed the list; the other sources
/// are walked in a fixed order and an item is appended only when its
/// `(repo, number, subject type)` key is absent. Unenriched PR/issue items
/// from non-notification sources are never merged. Inputs are not mutated.
pub fn merge(result: &FetchResult) -> (Vec<Item>, MergeStats) {
    let mut merged: Vec<Item> = result.notifications.clone();
    let mut seen: HashSet<ItemKey> = merged.iter().map(Item::key).collect();
    let mut stats = MergeStats::default();

    let sources: [(&[Item], &mut usize); 4] = [
        (&result.review_prs, &mut stats.review_prs_added),
        (&result.authored_prs, &mut stats.authored_prs_added),
        (&result.assigned_issues, &mut stats.assigned_issues_added),
        (&result.orphaned, &mut stats.orphaned_added),
    ];

    for (items, added) in sources {
        for item in items {
            if item.is_unenriched() {
                continue;
            }
            if seen.insert(item.key()) {
                merged.push(item.clone());
                *added += 1;
            }
        }
    }

    (merged, stats)
}
