use std::io::IsTerminal;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;

use triage_core::cache::DetailCache;
use triage_core::config::{self, Config, UiPreferences};
use triage_core::duration::parse_duration;
use triage_core::filters;
use triage_core::item::{PrioritizedItem, Priority, Reason, SubjectType};
use triage_core::resolved::ResolvedStore;
use triage_core::scoring::ScoringEngine;
use triage_core::snapshots::SnapshotStore;
use triage_core::stats;
use triage_github::{
    fetch_all, merge, progress_channel, CancelFlag, FetchOptions, GitHubProvider, ProgressEvent,
    Provider,
};

use crate::output;
use crate::ListArgs;

/// The whole run pipeline: config, auth, fetch+enrich, score, filter,
/// snapshot, then either the interactive view or a formatted listing.
pub async fn run_list(args: ListArgs) -> Result<()> {
    let config = Config::load().context("loading config.yaml")?;
    let since = parse_duration(&args.since).map_err(|err| anyhow!("--since: {}", err))?;
    let now = Utc::now();

    let call_timeout = std::time::Duration::from_secs(config.call_timeout_secs);
    let provider: Arc<dyn Provider> = Arc::new(
        GitHubProvider::from_env(call_timeout).context("authenticating with GitHub")?,
    );
    let user = provider
        .current_user()
        .await
        .context("authentication failed")?;
    tracing::info!(user = %user, "authenticated");

    let cache = Arc::new(DetailCache::open(config::cache_dir()).await);

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    // Progress consumer: log live, remember any rate-limit banner for the UI.
    let (tx, rx) = progress_channel();
    let banner: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let drain = {
        let banner = Arc::clone(&banner);
        tokio::spawn(async move {
            while let Ok(event) = rx.recv_async().await {
                match event {
                    ProgressEvent::SourceCompleted {
                        source,
                        count,
                        from_cache,
                    } => {
                        tracing::info!(source = source.label(), count, from_cache, "source done");
                    }
                    ProgressEvent::SourceFailed { source, message } => {
                        tracing::warn!(source = source.label(), %message, "source failed");
                    }
                    ProgressEvent::Enrichment { completed, total } => {
                        tracing::debug!(completed, total, "enriching");
                    }
                    ProgressEvent::RateLimited { reset } => {
                        let text = match reset {
                            Some(at) => format!("GitHub rate limit hit — resets {}", at),
                            None => "GitHub rate limit hit — serving cached data".to_string(),
                        };
                        if let Ok(mut slot) = banner.lock() {
                            *slot = Some(text);
                        }
                    }
                }
            }
        })
    };

    let opts = FetchOptions {
        since: now - since,
        orphaned_repos: config.orphaned.repos.clone(),
        stale_days: config.orphaned.stale_days,
        workers: args.workers,
    };
    let fetch_result = fetch_all(
        Arc::clone(&provider),
        Arc::clone(&cache),
        &user,
        &opts,
        &tx,
        &cancel,
    )
    .await
    .context("fetching notifications")?;
    drop(tx);
    let _ = drain.await;

    let (merged, merge_stats) = merge(&fetch_result);
    tracing::info!(
        total = merged.len(),
        review_prs = merge_stats.review_prs_added,
        authored_prs = merge_stats.authored_prs_added,
        assigned_issues = merge_stats.assigned_issues_added,
        orphaned = merge_stats.orphaned_added,
        cache_hits = fetch_result.enrichment.cache_hits,
        "merged sources"
    );

    let items = filters::filter_out_unenriched(merged);
    let engine = ScoringEngine::new(
        config.weights.clone(),
        &config.quick_win_labels,
        &user,
        now,
    );
    let mut prioritized: Vec<PrioritizedItem> =
        items.into_iter().map(|item| engine.prioritize(item)).collect();

    prioritized = filters::exclude_repos(prioritized, &config.exclude_repos);
    prioritized = filters::exclude_authors(prioritized, &config.exclude_authors);

    let resolved = ResolvedStore::load(config::resolved_file());
    prioritized = filters::filter_resolved(prioritized, &resolved);

    // The per-run snapshot covers the set before display-only flags narrow it.
    let snapshot_store = SnapshotStore::new(config::snapshots_file());
    let snapshot = stats::make_snapshot(&prioritized, &user, &config.blocked_labels, now);
    if let Err(err) = snapshot_store.append(&snapshot) {
        tracing::warn!(%err, "could not append snapshot");
    }

    prioritized = apply_display_filters(prioritized, &args)?;

    let use_tui = match args.tui.as_str() {
        "true" => true,
        "false" => false,
        _ => std::io::stdout().is_terminal() && args.format.is_none(),
    };

    if use_tui {
        let stats_report = stats::compute_stats(&prioritized, &config.weights.pr, now);
        let app = triage_tui::App::new(
            prioritized,
            &user,
            &config.blocked_labels,
            resolved,
            stats_report,
            snapshot_store.load_recent(50),
            UiPreferences::load(),
            banner.lock().ok().and_then(|slot| slot.clone()),
        );
        triage_tui::run(app)?;
        return Ok(());
    }

    // Non-interactive: priority order, most urgent first.
    prioritized.sort_by(|a, b| {
        a.priority
            .ordinal()
            .cmp(&b.priority.ordinal())
            .then_with(|| b.score.cmp(&a.score))
    });
    let format = args
        .format
        .unwrap_or_else(|| config.default_format.clone());
    match format.as_str() {
        "json" => output::render_json(&prioritized)?,
        _ => output::render_table(&prioritized),
    }
    Ok(())
}

fn apply_display_filters(
    mut items: Vec<PrioritizedItem>,
    args: &ListArgs,
) -> Result<Vec<PrioritizedItem>> {
    if !args.include_merged {
        items = filters::filter_out_merged(items);
    }
    if !args.include_closed {
        items = filters::filter_out_closed(items);
    }
    if let Some(raw) = &args.priority {
        let priority =
            Priority::parse(raw).ok_or_else(|| anyhow!("invalid --priority {:?}", raw))?;
        items = filters::filter_by_priority(items, priority);
    }
    if let Some(raw) = &args.reason {
        let reason = Reason::parse(raw).ok_or_else(|| anyhow!("invalid --reason {:?}", raw))?;
        items = filters::filter_by_reason(items, reason);
    }
    if let Some(raw) = &args.item_type {
        let kind = match raw.as_str() {
            "pr" => SubjectType::PullRequest,
            _ => SubjectType::Issue,
        };
        items = filters::filter_by_type(items, kind);
    }
    if let Some(repo) = &args.repo {
        items = filters::filter_by_repo(items, repo);
    }
    if let Some(n) = args.limit {
        items = filters::limit(items, n);
    }
    Ok(items)
}

// ---------------------------------------------------------------------------
// cache / config subcommands
// ---------------------------------------------------------------------------

pub async fn cache_stats() -> Result<()> {
    let cache = DetailCache::open(config::cache_dir()).await;
    let stats = cache.stats().await?;
    println!("detail entries:      {}", stats.detail_entries);
    println!("notification lists:  {}", stats.notification_lists);
    println!("pr lists:            {}", stats.pr_lists);
    println!("disk usage:          {} bytes", stats.disk_bytes);
    if let Some(oldest) = stats.oldest_entry {
        println!("oldest entry:        {}", oldest.to_rfc3339());
    }
    if let Some(newest) = stats.newest_entry {
        println!("newest entry:        {}", newest.to_rfc3339());
    }
    Ok(())
}

pub async fn cache_clear() -> Result<()> {
    let cache = DetailCache::open(config::cache_dir()).await;
    let dropped = cache.clear().await?;
    println!("cleared {} cache entries", dropped);
    Ok(())
}

pub fn config_show() -> Result<()> {
    let config = Config::load()?;
    print!("{}", config.to_yaml()?);
    Ok(())
}

pub fn config_set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config
        .set_value(key, value)
        .with_context(|| format!("setting {}", key))?;
    config.save()?;
    println!("{} = {}", key, value);
    Ok(())
}
