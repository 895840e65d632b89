use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use triage_core::item::{IssueDetails, Item, PrDetails, Repository};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    #[error("missing GitHub token — set GITHUB_TOKEN with notification and repo scopes")]
    MissingToken,

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("GitHub rate limit exceeded")]
    RateLimited { reset: Option<DateTime<Utc>> },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// The seam between triage and GitHub. The octocrab adapter is the real
/// implementation; [`crate::stub::StubProvider`] drives tests.
///
/// Implementations are expected to honour a per-call timeout internally and
/// to map rate-limit responses to [`ProviderError::RateLimited`].
#[async_trait]
pub trait Provider: Send + Sync {
    /// Login of the authenticated user. Fails fast on bad credentials.
    async fn current_user(&self) -> Result<String>;

    /// Inbox notifications updated since `since`, in GitHub's order.
    async fn notifications(&self, since: DateTime<Utc>) -> Result<Vec<Item>>;

    /// Open PRs where `user`'s review is requested.
    async fn review_requested_prs(&self, user: &str) -> Result<Vec<Item>>;

    /// Open PRs authored by `user`.
    async fn authored_prs(&self, user: &str) -> Result<Vec<Item>>;

    /// Open issues assigned to `user`.
    async fn assigned_issues(&self, user: &str) -> Result<Vec<Item>>;

    /// External contributions with no assignees and no team activity for
    /// `stale_days` in the configured repos.
    async fn orphaned_items(&self, repos: &[String], stale_days: u32) -> Result<Vec<Item>>;

    async fn pr_details(&self, repo: &Repository, number: u64) -> Result<PrDetails>;

    async fn issue_details(&self, repo: &Repository, number: u64) -> Result<IssueDetails>;
}
