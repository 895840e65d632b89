//! Minimal serde mirrors of the REST payloads the adapter consumes, plus
//! conversions into the canonical [`Item`] model. Only the fields triage
//! reads are declared; everything else is ignored on deserialize.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use triage_core::item::{
    Item, ItemState, Reason, Repository, Subject, SubjectType,
};

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct Notification {
    pub id: String,
    pub reason: String,
    pub updated_at: DateTime<Utc>,
    pub subject: NotificationSubject,
    pub repository: NotificationRepo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NotificationSubject {
    pub title: String,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NotificationRepo {
    pub name: String,
    pub owner: Actor,
    pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Actor {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Label {
    pub name: String,
}

impl Notification {
    /// Convert to an Item. Returns `None` for subject types triage does not
    /// triage (commits, check suites, …).
    pub fn into_item(self) -> Option<Item> {
        let kind = match self.subject.kind.as_str() {
            "PullRequest" => SubjectType::PullRequest,
            "Issue" => SubjectType::Issue,
            "Release" => SubjectType::Release,
            "Discussion" => SubjectType::Discussion,
            _ => return None,
        };
        let api_url = self.subject.url.clone().unwrap_or_default();
        let number = trailing_number(&api_url).unwrap_or(0);
        let subject_url = browser_url(&api_url);

        let mut repository = Repository::new(self.repository.owner.login, self.repository.name);
        if let Some(url) = self.repository.html_url {
            repository.url = url;
        }

        Some(Item {
            id: self.id,
            repository,
            number,
            subject: Subject {
                kind,
                title: self.subject.title,
                url: subject_url,
            },
            reason: Reason::from_api(&self.reason),
            state: ItemState::Open,
            author: String::new(),
            assignees: Vec::new(),
            labels: Vec::new(),
            comment_count: 0,
            last_commenter: None,
            consecutive_author_comments: 0,
            // The notifications endpoint only carries updated_at.
            created_at: self.updated_at,
            updated_at: self.updated_at,
            last_team_activity_at: None,
            details: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResults {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchItem {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub html_url: String,
    pub repository_url: String,
    pub user: Option<Actor>,
    #[serde(default)]
    pub assignees: Vec<Actor>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub comments: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Present iff the search hit is a pull request.
    pub pull_request: Option<serde_json::Value>,
}

impl SearchItem {
    pub fn into_item(self, reason: Reason) -> Item {
        let kind = if self.pull_request.is_some() {
            SubjectType::PullRequest
        } else {
            SubjectType::Issue
        };
        let repository = repo_from_api_url(&self.repository_url);
        let state = match self.state.as_str() {
            "closed" => ItemState::Closed,
            _ => ItemState::Open,
        };
        let id = format!("{}#{}", repository.full_name(), self.number);

        Item {
            id,
            repository,
            number: self.number,
            subject: Subject {
                kind,
                title: self.title,
                url: self.html_url,
            },
            reason,
            state,
            author: self.user.map(|u| u.login).unwrap_or_default(),
            assignees: self.assignees.into_iter().map(|a| a.login).collect(),
            labels: self.labels.into_iter().map(|l| l.name).collect(),
            comment_count: self.comments,
            last_commenter: None,
            consecutive_author_comments: 0,
            created_at: self.created_at,
            updated_at: self.updated_at,
            last_team_activity_at: None,
            details: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Pull request / review / status detail payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct PullDetail {
    pub state: String,
    pub merged_at: Option<DateTime<Utc>>,
    pub mergeable: Option<bool>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub changed_files: u64,
    #[serde(default)]
    pub review_comments: u64,
    #[serde(default)]
    pub requested_reviewers: Vec<Actor>,
    pub head: CommitRef,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitRef {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Review {
    pub user: Option<Actor>,
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CombinedStatus {
    pub state: String,
    #[serde(default)]
    pub total_count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueComment {
    pub user: Option<Actor>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// URL helpers
// ---------------------------------------------------------------------------

/// Parse the trailing `/123` segment of a subject or API URL.
pub(crate) fn trailing_number(url: &str) -> Option<u64> {
    url.rsplit('/').next()?.parse().ok()
}

/// Rewrite an API subject URL to its browser form so Enter-to-open lands on
/// the web UI.
pub(crate) fn browser_url(api_url: &str) -> String {
    api_url
        .replace("https://api.github.com/repos/", "https://github.com/")
        .replace("/pulls/", "/pull/")
}

/// `https://api.github.com/repos/{owner}/{name}` → Repository.
pub(crate) fn repo_from_api_url(url: &str) -> Repository {
    let mut segments = url.rsplit('/');
    let name = segments.next().unwrap_or_default();
    let owner = segments.next().unwrap_or_default();
    Repository::new(owner, name)
}
