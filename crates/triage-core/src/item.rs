use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The repository a work item belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub owner: String,
    pub name: String,
    pub url: String,
}

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        let url = format!("https://github.com/{}/{}", owner, name);
        Self { owner, name, url }
    }

    /// `owner/name`, the form used in config files and dedup keys.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// What kind of thing a notification points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    PullRequest,
    Issue,
    Release,
    Discussion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(rename = "type")]
    pub kind: SubjectType,
    pub title: String,
    pub url: String,
}

/// Why this item is in the inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    ReviewRequested,
    Mention,
    TeamMention,
    Author,
    Assign,
    Comment,
    StateChange,
    Subscribed,
    CiActivity,
    Orphaned,
}

impl Reason {
    /// Map a GitHub notification reason string. Unknown reasons degrade to
    /// `Subscribed` so they still score and route.
    pub fn from_api(s: &str) -> Self {
        match s {
            "review_requested" => Reason::ReviewRequested,
            "mention" => Reason::Mention,
            "team_mention" => Reason::TeamMention,
            "author" => Reason::Author,
            "assign" => Reason::Assign,
            "comment" => Reason::Comment,
            "state_change" => Reason::StateChange,
            "subscribed" => Reason::Subscribed,
            "ci_activity" => Reason::CiActivity,
            _ => Reason::Subscribed,
        }
    }

    /// Strict parse for CLI flags; unlike [`Reason::from_api`] there is no
    /// fallback.
    pub fn parse(s: &str) -> Option<Self> {
        [
            Reason::ReviewRequested,
            Reason::Mention,
            Reason::TeamMention,
            Reason::Author,
            Reason::Assign,
            Reason::Comment,
            Reason::StateChange,
            Reason::Subscribed,
            Reason::CiActivity,
            Reason::Orphaned,
        ]
        .into_iter()
        .find(|r| r.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::ReviewRequested => "review_requested",
            Reason::Mention => "mention",
            Reason::TeamMention => "team_mention",
            Reason::Author => "author",
            Reason::Assign => "assign",
            Reason::Comment => "comment",
            Reason::StateChange => "state_change",
            Reason::Subscribed => "subscribed",
            Reason::CiActivity => "ci_activity",
            Reason::Orphaned => "orphaned",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    Open,
    Closed,
    Merged,
}

// ---------------------------------------------------------------------------
// Variant payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Pending,
    ReviewRequired,
    Reviewed,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiStatus {
    Success,
    Failure,
    Pending,
    None,
}

impl CiStatus {
    /// Display/sort rank: success < pending < failure < none.
    pub fn rank(&self) -> u8 {
        match self {
            CiStatus::Success => 0,
            CiStatus::Pending => 1,
            CiStatus::Failure => 2,
            CiStatus::None => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrDetails {
    pub additions: u64,
    pub deletions: u64,
    pub changed_files: u64,
    pub mergeable: bool,
    pub draft: bool,
    pub review_state: ReviewState,
    pub review_comments: u64,
    pub requested_reviewers: Vec<String>,
    pub latest_reviewer: Option<String>,
    pub ci_status: CiStatus,
}

impl PrDetails {
    pub fn lines_changed(&self) -> u64 {
        self.additions + self.deletions
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDetails {
    pub last_commenter: Option<String>,
}

/// An item is exactly one of: unenriched (no `Details`), a PR with details,
/// or an issue with details. Scoring and routing pattern-match on this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Details {
    Pr(PrDetails),
    Issue(IssueDetails),
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// Dedup key for cross-source merging. PR and issue numbering share GitHub's
/// URL space but are semantically distinct, so the subject type is part of
/// the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pub repo: String,
    pub number: u64,
    pub kind: SubjectType,
}

/// The canonical work-item entity. Created by the fetch orchestrator,
/// enriched in place by the worker pool, scored once, then routed to a pane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub repository: Repository,
    pub number: u64,
    pub subject: Subject,
    pub reason: Reason,
    pub state: ItemState,
    pub author: String,
    /// Ordered; the first assignee is authoritative for display.
    pub assignees: Vec<String>,
    pub labels: Vec<String>,
    pub comment_count: u64,
    pub last_commenter: Option<String>,
    /// Run of tail comments by the item's author with no team response.
    pub consecutive_author_comments: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_team_activity_at: Option<DateTime<Utc>>,
    pub details: Option<Details>,
}

impl Item {
    pub fn key(&self) -> ItemKey {
        ItemKey {
            repo: self.repository.full_name(),
            number: self.number,
            kind: self.subject.kind,
        }
    }

    /// A PR or issue with no variant payload: the source could not describe
    /// its status, so the default filter drops it.
    pub fn is_unenriched(&self) -> bool {
        matches!(
            self.subject.kind,
            SubjectType::PullRequest | SubjectType::Issue
        ) && self.details.is_none()
    }

    pub fn pr_details(&self) -> Option<&PrDetails> {
        match &self.details {
            Some(Details::Pr(pr)) => Some(pr),
            _ => None,
        }
    }

    pub fn issue_details(&self) -> Option<&IssueDetails> {
        match &self.details {
            Some(Details::Issue(issue)) => Some(issue),
            _ => None,
        }
    }

    pub fn days_since_update(&self, now: DateTime<Utc>) -> i64 {
        (now - self.updated_at).num_days().max(0)
    }

    /// Case- and separator-insensitive label test. `target` must already be
    /// normalized.
    pub fn has_label(&self, target: &str) -> bool {
        self.labels.iter().any(|l| normalize_label(l) == target)
    }
}

/// Lowercase and map `-` to space, so "good first issue", "good-first-issue",
/// and "Good First Issue" compare equal.
pub fn normalize_label(label: &str) -> String {
    label.to_lowercase().replace('-', " ")
}

// ---------------------------------------------------------------------------
// Prioritized wrapper
// ---------------------------------------------------------------------------

/// Priority buckets, most urgent first. The ordinal drives the priority sort
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Urgent,
    Important,
    QuickWin,
    Notable,
    Fyi,
}

impl Priority {
    pub fn ordinal(&self) -> u8 {
        match self {
            Priority::Urgent => 0,
            Priority::Important => 1,
            Priority::QuickWin => 2,
            Priority::Notable => 3,
            Priority::Fyi => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Urgent => "Urgent",
            Priority::Important => "Important",
            Priority::QuickWin => "Quick Win",
            Priority::Notable => "Notable",
            Priority::Fyi => "FYI",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match normalize_label(s).as_str() {
            "urgent" => Some(Priority::Urgent),
            "important" => Some(Priority::Important),
            "quick win" | "quickwin" => Some(Priority::QuickWin),
            "notable" => Some(Priority::Notable),
            "fyi" => Some(Priority::Fyi),
            _ => None,
        }
    }

    pub const ALL: [Priority; 5] = [
        Priority::Urgent,
        Priority::Important,
        Priority::QuickWin,
        Priority::Notable,
        Priority::Fyi,
    ];
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// An item plus the scoring engine's verdict about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrioritizedItem {
    pub item: Item,
    pub score: i64,
    pub priority: Priority,
    #[serde(rename = "actionNeeded")]
    pub action_needed: String,
}
