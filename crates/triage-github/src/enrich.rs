use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use triage_core::cache::DetailCache;
use triage_core::item::{Details, Item, SubjectType};

use crate::cancel::CancelFlag;
use crate::provider::{Provider, ProviderError};

/// Outcome of one enrichment batch. Individual item failures never abort the
/// batch; they are aggregated here.
#[derive(Debug, Default, Clone)]
pub struct EnrichReport {
    pub cache_hits: usize,
    pub failures: usize,
    /// First failure message, for the aggregated warning.
    pub sample_error: Option<String>,
    /// Set when any worker hit the API rate limit.
    pub rate_limited: bool,
    pub rate_limit_reset: Option<chrono::DateTime<Utc>>,
}

/// Attach variant payload to every PR/issue item that lacks one, in place.
///
/// `W` workers drain the batch concurrently; each consults the detail cache
/// before calling the provider. Returns the cache-hit count and aggregated
/// failures. No ordering guarantee across items.
pub async fn enrich(
    provider: Arc<dyn Provider>,
    cache: Arc<DetailCache>,
    items: &mut [Item],
    workers: usize,
    progress: impl Fn(usize, usize) + Send + Sync + 'static,
    cancel: &CancelFlag,
) -> EnrichReport {
    let gate = Arc::new(Semaphore::new(workers.max(1)));
    enrich_with_gate(provider, cache, items, gate, progress, cancel).await
}

/// As [`enrich`], but sharing a caller-owned permit gate so several batches
/// (one per source) draw from the same worker pool.
pub async fn enrich_with_gate(
    provider: Arc<dyn Provider>,
    cache: Arc<DetailCache>,
    items: &mut [Item],
    gate: Arc<Semaphore>,
    progress: impl Fn(usize, usize) + Send + Sync + 'static,
    cancel: &CancelFlag,
) -> EnrichReport {
    let targets: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_unenriched())
        .map(|(idx, _)| idx)
        .collect();
    let total = targets.len();
    if total == 0 {
        return EnrichReport::default();
    }

    // Progress callbacks interleave arbitrarily; coalesce to ~5% increments.
    let step = (total / 20).max(1);
    let mut report = EnrichReport::default();
    let mut completed = 0usize;

    let mut join_set: JoinSet<(usize, FetchOutcome)> = JoinSet::new();
    for idx in targets {
        let provider = Arc::clone(&provider);
        let cache = Arc::clone(&cache);
        let gate = Arc::clone(&gate);
        let cancel = cancel.clone();
        let repo = items[idx].repository.clone();
        let number = items[idx].number;
        let kind = items[idx].subject.kind;

        join_set.spawn(async move {
            if cancel.is_cancelled() {
                return (idx, FetchOutcome::Skipped);
            }
            let Ok(_permit) = gate.acquire_owned().await else {
                return (idx, FetchOutcome::Skipped);
            };
            if cancel.is_cancelled() {
                return (idx, FetchOutcome::Skipped);
            }

            if !matches!(
                kind,
                SubjectType::PullRequest | SubjectType::Issue
            ) {
                return (idx, FetchOutcome::Skipped);
            }

            let now = Utc::now();
            let full_name = repo.full_name();
            if let Some(details) = cache.lookup_details(&full_name, number, now).await {
                return (idx, FetchOutcome::CacheHit(details));
            }

            // Cancellation also aborts the in-flight provider call.
            let fetched = tokio::select! {
                _ = cancel.cancelled() => return (idx, FetchOutcome::Skipped),
                fetched = async {
                    match kind {
                        SubjectType::PullRequest => {
                            provider.pr_details(&repo, number).await.map(Details::Pr)
                        }
                        _ => provider
                            .issue_details(&repo, number)
                            .await
                            .map(Details::Issue),
                    }
                } => fetched,
            };

            match fetched {
                Ok(details) => {
                    cache
                        .store_details(&full_name, number, details.clone(), now)
                        .await;
                    (idx, FetchOutcome::Fetched(details))
                }
                Err(err) => (idx, FetchOutcome::Failed(err)),
            }
        });
    }

    while let Some(joined) = join_set.join_next().await {
        let Ok((idx, outcome)) = joined else {
            report.failures += 1;
            completed += 1;
            continue;
        };
        match outcome {
            FetchOutcome::CacheHit(details) => {
                report.cache_hits += 1;
                items[idx].details = Some(details);
            }
            FetchOutcome::Fetched(details) => {
                items[idx].details = Some(details);
            }
            FetchOutcome::Failed(err) => {
                if let ProviderError::RateLimited { reset } = &err {
                    report.rate_limited = true;
                    report.rate_limit_reset = *reset;
                }
                report.failures += 1;
                if report.sample_error.is_none() {
                    report.sample_error = Some(err.to_string());
                }
                tracing::debug!(%err, "enrichment failed for one item");
            }
            FetchOutcome::Skipped => {}
        }
        completed += 1;
        if completed % step == 0 || completed == total {
            progress(completed, total);
        }
    }

    report
}

enum FetchOutcome {
    CacheHit(Details),
    Fetched(Details),
    Failed(ProviderError),
    Skipped,
}

impl EnrichReport {
    pub fn absorb(&mut self, other: EnrichReport) {
        self.cache_hits += other.cache_hits;
        self.failures += other.failures;
        if self.sample_error.is_none() {
            self.sample_error = other.sample_error;
        }
        self.rate_limited |= other.rate_limited;
        if self.rate_limit_reset.is_none() {
            self.rate_limit_reset = other.rate_limit_reset;
        }
    }
}
