use std::cmp::Ordering;

use triage_core::item::PrioritizedItem;
use triage_core::routing::Pane;

/// Sortable table columns. Availability varies by pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Priority,
    Updated,
    Repo,
    Author,
    Size,
    Ci,
    Stale,
    Comments,
}

impl SortColumn {
    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Priority => "priority",
            SortColumn::Updated => "updated",
            SortColumn::Repo => "repo",
            SortColumn::Author => "author",
            SortColumn::Size => "size",
            SortColumn::Ci => "ci",
            SortColumn::Stale => "stale",
            SortColumn::Comments => "comments",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "priority" => Some(SortColumn::Priority),
            "updated" => Some(SortColumn::Updated),
            "repo" => Some(SortColumn::Repo),
            "author" => Some(SortColumn::Author),
            "size" => Some(SortColumn::Size),
            "ci" => Some(SortColumn::Ci),
            "stale" => Some(SortColumn::Stale),
            "comments" => Some(SortColumn::Comments),
            _ => None,
        }
    }
}

/// Columns offered by each pane, in `s`-cycling order.
pub fn columns_for(pane: Pane) -> &'static [SortColumn] {
    match pane {
        Pane::Priority => &[
            SortColumn::Priority,
            SortColumn::Updated,
            SortColumn::Repo,
            SortColumn::Author,
            SortColumn::Size,
            SortColumn::Ci,
        ],
        Pane::Orphaned => &[
            SortColumn::Updated,
            SortColumn::Stale,
            SortColumn::Comments,
            SortColumn::Repo,
            SortColumn::Author,
            SortColumn::Size,
            SortColumn::Ci,
        ],
        Pane::Assigned | Pane::Blocked => &[
            SortColumn::Updated,
            SortColumn::Repo,
            SortColumn::Author,
            SortColumn::Size,
            SortColumn::Ci,
        ],
    }
}

pub fn default_sort(pane: Pane) -> (SortColumn, bool) {
    match pane {
        Pane::Priority => (SortColumn::Priority, true),
        _ => (SortColumn::Updated, true),
    }
}

/// Sort in place. The comparator below defines the *descending* reading
/// order (▼ is the natural one: most urgent, newest, A→Z); ascending
/// reverses it. The size column keeps its data-group precedence in both
/// directions.
pub fn sort_items(items: &mut [PrioritizedItem], column: SortColumn, descending: bool) {
    items.sort_by(|a, b| match column {
        SortColumn::Size => cmp_size(a, b, descending),
        _ => {
            let ord = cmp_desc(column, a, b);
            if descending {
                ord
            } else {
                ord.reverse()
            }
        }
    });
}

fn cmp_desc(column: SortColumn, a: &PrioritizedItem, b: &PrioritizedItem) -> Ordering {
    match column {
        SortColumn::Priority => a
            .priority
            .ordinal()
            .cmp(&b.priority.ordinal())
            .then_with(|| b.score.cmp(&a.score)),
        SortColumn::Updated => b.item.updated_at.cmp(&a.item.updated_at),
        SortColumn::Repo => lower(&a.item.repository.full_name()).cmp(&lower(&b.item.repository.full_name())),
        SortColumn::Author => lower(&a.item.author).cmp(&lower(&b.item.author)),
        SortColumn::Ci => ci_rank(a).cmp(&ci_rank(b)),
        SortColumn::Stale => stale_key(a).cmp(&stale_key(b)),
        SortColumn::Comments => b.item.comment_count.cmp(&a.item.comment_count),
        SortColumn::Size => unreachable!("size handled by cmp_size"),
    }
}

/// PRs with review data (additions+deletions > 0) always precede items
/// without; within the data group order by lines changed, within the no-data
/// group by comment count.
fn cmp_size(a: &PrioritizedItem, b: &PrioritizedItem, descending: bool) -> Ordering {
    let a_lines = lines_changed(a);
    let b_lines = lines_changed(b);
    match (a_lines, b_lines) {
        (Some(x), Some(y)) => {
            if descending {
                y.cmp(&x)
            } else {
                x.cmp(&y)
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => {
            let (x, y) = (a.item.comment_count, b.item.comment_count);
            if descending {
                y.cmp(&x)
            } else {
                x.cmp(&y)
            }
        }
    }
}

fn lines_changed(p: &PrioritizedItem) -> Option<u64> {
    p.item
        .pr_details()
        .map(|pr| pr.lines_changed())
        .filter(|&lines| lines > 0)
}

fn ci_rank(p: &PrioritizedItem) -> u8 {
    p.item
        .pr_details()
        .map(|pr| pr.ci_status.rank())
        .unwrap_or(triage_core::item::CiStatus::None.rank())
}

/// Oldest team activity first: stalest items lead in descending order.
fn stale_key(p: &PrioritizedItem) -> chrono::DateTime<chrono::Utc> {
    p.item.last_team_activity_at.unwrap_or(p.item.updated_at)
}

fn lower(s: &str) -> String {
    s.to_lowercase()
}
