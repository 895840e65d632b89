use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::item::{CiStatus, PrioritizedItem, Priority, SubjectType};
use crate::routing::{route, Pane};
use crate::snapshots::Snapshot;
use crate::weights::PrWeights;

/// PR size bucket from configurable thresholds over additions+deletions.
/// At each boundary the lower size wins (`total <= xs_max` is XS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TShirtSize {
    Xs,
    S,
    M,
    L,
    Xl,
}

impl TShirtSize {
    pub fn classify(lines_changed: u64, pr: &PrWeights) -> Self {
        if lines_changed <= pr.size_xs_max {
            TShirtSize::Xs
        } else if lines_changed <= pr.size_s_max {
            TShirtSize::S
        } else if lines_changed <= pr.size_m_max {
            TShirtSize::M
        } else if lines_changed <= pr.size_l_max {
            TShirtSize::L
        } else {
            TShirtSize::Xl
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TShirtSize::Xs => "XS",
            TShirtSize::S => "S",
            TShirtSize::M => "M",
            TShirtSize::L => "L",
            TShirtSize::Xl => "XL",
        }
    }
}

/// Age distribution buckets: <1d, 1-3d, 3-7d, 1-2w, 2-4w, >4w.
pub const AGE_BUCKET_LABELS: [&str; 6] = ["<1d", "1-3d", "3-7d", "1-2w", "2-4w", ">4w"];

fn age_bucket(age: Duration) -> usize {
    let days = age.num_days();
    match days {
        _ if days < 1 => 0,
        _ if days < 3 => 1,
        _ if days < 7 => 2,
        _ if days < 14 => 3,
        _ if days < 28 => 4,
        _ => 5,
    }
}

/// Staleness buckets for the orphaned pane: fresh, aging, stale, abandoned.
pub const STALENESS_BUCKET_LABELS: [&str; 4] = ["<1w", "1-2w", "2-4w", ">4w"];

fn staleness_bucket(age: Duration) -> usize {
    let days = age.num_days();
    match days {
        _ if days < 7 => 0,
        _ if days < 14 => 1,
        _ if days < 28 => 2,
        _ => 3,
    }
}

/// Distributions over the merged item set, rendered by the stats pane.
#[derive(Debug, Clone, Default)]
pub struct StatsReport {
    pub total: usize,
    pub priority_counts: [usize; 5],
    pub age_buckets: [usize; 6],
    pub review_states: HashMap<&'static str, usize>,
    pub ci_statuses: [usize; 4],
    pub sizes: [usize; 5],
    /// Top 5 repos by item count, plus an "others" tally.
    pub top_repos: Vec<(String, usize)>,
    pub other_repos: usize,
    pub orphaned_staleness: [usize; 4],
}

/// Single pass over the merged set.
pub fn compute_stats(
    items: &[PrioritizedItem],
    pr_weights: &PrWeights,
    now: DateTime<Utc>,
) -> StatsReport {
    let mut report = StatsReport {
        total: items.len(),
        ..StatsReport::default()
    };
    let mut repo_counts: HashMap<String, usize> = HashMap::new();

    for p in items {
        report.priority_counts[p.priority.ordinal() as usize] += 1;
        report.age_buckets[age_bucket(now - p.item.updated_at)] += 1;
        *repo_counts
            .entry(p.item.repository.full_name())
            .or_default() += 1;

        if let Some(pr) = p.item.pr_details() {
            let state = match pr.review_state {
                crate::item::ReviewState::Approved => "approved",
                crate::item::ReviewState::ChangesRequested => "changes_requested",
                crate::item::ReviewState::Pending => "pending",
                crate::item::ReviewState::ReviewRequired => "review_required",
                crate::item::ReviewState::Reviewed => "reviewed",
                crate::item::ReviewState::None => "none",
            };
            *report.review_states.entry(state).or_default() += 1;
            report.ci_statuses[pr.ci_status.rank() as usize] += 1;
            report.sizes[size_index(TShirtSize::classify(pr.lines_changed(), pr_weights))] += 1;
        }

        if p.item.reason == crate::item::Reason::Orphaned {
            let last_activity = p.item.last_team_activity_at.unwrap_or(p.item.updated_at);
            report.orphaned_staleness[staleness_bucket(now - last_activity)] += 1;
        }
    }

    let mut repos: Vec<(String, usize)> = repo_counts.into_iter().collect();
    repos.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    if repos.len() > 5 {
        report.other_repos = repos[5..].iter().map(|(_, n)| n).sum();
        repos.truncate(5);
    }
    report.top_repos = repos;

    report
}

fn size_index(size: TShirtSize) -> usize {
    match size {
        TShirtSize::Xs => 0,
        TShirtSize::S => 1,
        TShirtSize::M => 2,
        TShirtSize::L => 3,
        TShirtSize::Xl => 4,
    }
}

/// Build the per-run snapshot row appended to the snapshot store.
pub fn make_snapshot(
    items: &[PrioritizedItem],
    current_user: &str,
    blocked_labels: &[String],
    now: DateTime<Utc>,
) -> Snapshot {
    let mut snapshot = Snapshot {
        timestamp: now,
        total_count: items.len(),
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
    };

    let mut ages: Vec<i64> = Vec::with_capacity(items.len());
    for p in items {
        match route(&p.item, current_user, blocked_labels) {
            Pane::Priority => snapshot.priority_pane += 1,
            Pane::Assigned => snapshot.assigned_pane += 1,
            Pane::Blocked => snapshot.blocked_pane += 1,
            Pane::Orphaned => snapshot.orphaned_pane += 1,
        }
        match p.priority {
            Priority::Urgent => snapshot.urgent += 1,
            Priority::Important => snapshot.important += 1,
            Priority::QuickWin => snapshot.quick_win += 1,
            Priority::Notable => snapshot.notable += 1,
            Priority::Fyi => snapshot.fyi += 1,
        }
        match p.item.subject.kind {
            SubjectType::PullRequest => snapshot.pr_count += 1,
            SubjectType::Issue => snapshot.issue_count += 1,
            _ => {}
        }
        if let Some(pr) = p.item.pr_details() {
            match pr.ci_status {
                CiStatus::Success => snapshot.ci_success += 1,
                CiStatus::Failure => snapshot.ci_failure += 1,
                CiStatus::Pending => snapshot.ci_pending += 1,
                CiStatus::None => {}
            }
        }
        ages.push((now - p.item.updated_at).num_hours());
    }

    snapshot.median_age_hours = median(&mut ages);
    snapshot
}

fn median(values: &mut [i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) as f64 / 2.0
    } else {
        values[mid] as f64
    }
}
