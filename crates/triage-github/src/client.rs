use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::de::DeserializeOwned;

use triage_core::item::{
    CiStatus, IssueDetails, Item, PrDetails, Repository, ReviewState,
};

use crate::provider::{Provider, ProviderError, Result};
use crate::wire;

const PER_PAGE: u32 = 100;

/// How many orphaned candidates get the comment-thread inspection per run.
/// Beyond this the search result is truncated to keep the run bounded.
const ORPHANED_INSPECTION_LIMIT: usize = 50;

/// octocrab-backed [`Provider`]. The only module that touches GitHub wire
/// types; everything inward speaks the canonical Item model.
pub struct GitHubProvider {
    octocrab: Octocrab,
    call_timeout: Duration,
}

impl GitHubProvider {
    /// Authenticate with a personal token from `GITHUB_TOKEN`. The per-call
    /// timeout comes from the caller (config `call_timeout_secs`).
    pub fn from_env(call_timeout: Duration) -> Result<Self> {
        let token = std::env::var("GITHUB_TOKEN").map_err(|_| ProviderError::MissingToken)?;
        Self::new(token, call_timeout)
    }

    pub fn new(token: String, call_timeout: Duration) -> Result<Self> {
        let octocrab = Octocrab::builder().personal_token(token).build()?;
        Ok(Self {
            octocrab,
            call_timeout,
        })
    }

    /// GET a REST route with the per-call timeout and error classification
    /// applied.
    async fn get<T: DeserializeOwned>(&self, route: String) -> Result<T> {
        let fut = self.octocrab.get::<T, _, ()>(&route, None);
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(classify(err)),
            Err(_) => Err(ProviderError::Timeout(self.call_timeout)),
        }
    }

    async fn search(&self, query: &str, reason: triage_core::item::Reason) -> Result<Vec<Item>> {
        let route = format!(
            "/search/issues?q={}&per_page={}&sort=updated",
            encode_query(query),
            PER_PAGE
        );
        let results: wire::SearchResults = self.get(route).await?;
        Ok(results
            .items
            .into_iter()
            .map(|i| i.into_item(reason))
            .collect())
    }

    async fn issue_comments(
        &self,
        repo: &Repository,
        number: u64,
    ) -> Result<Vec<wire::IssueComment>> {
        self.get(format!(
            "/repos/{}/issues/{}/comments?per_page={}",
            repo.full_name(),
            number,
            PER_PAGE
        ))
        .await
    }
}

#[async_trait]
impl Provider for GitHubProvider {
    async fn current_user(&self) -> Result<String> {
        let user: wire::Actor = self.get("/user".to_string()).await.map_err(|err| match err {
            ProviderError::Api(api) => ProviderError::Auth(api.to_string()),
            other => other,
        })?;
        Ok(user.login)
    }

    async fn notifications(&self, since: DateTime<Utc>) -> Result<Vec<Item>> {
        let route = format!(
            "/notifications?since={}&per_page={}",
            since.to_rfc3339(),
            PER_PAGE
        );
        let raw: Vec<wire::Notification> = self.get(route).await?;
        Ok(raw.into_iter().filter_map(|n| n.into_item()).collect())
    }

    async fn review_requested_prs(&self, user: &str) -> Result<Vec<Item>> {
        self.search(
            &format!("is:open is:pr review-requested:{} archived:false", user),
            triage_core::item::Reason::ReviewRequested,
        )
        .await
    }

    async fn authored_prs(&self, user: &str) -> Result<Vec<Item>> {
        self.search(
            &format!("is:open is:pr author:{} archived:false", user),
            triage_core::item::Reason::Author,
        )
        .await
    }

    async fn assigned_issues(&self, user: &str) -> Result<Vec<Item>> {
        self.search(
            &format!("is:open is:issue assignee:{} archived:false", user),
            triage_core::item::Reason::Assign,
        )
        .await
    }

    async fn orphaned_items(&self, repos: &[String], stale_days: u32) -> Result<Vec<Item>> {
        if repos.is_empty() {
            return Ok(Vec::new());
        }
        let scope: Vec<String> = repos.iter().map(|r| format!("repo:{}", r)).collect();
        let query = format!("is:open no:assignee {}", scope.join(" "));
        let mut candidates = self
            .search(&query, triage_core::item::Reason::Orphaned)
            .await?;
        if candidates.len() > ORPHANED_INSPECTION_LIMIT {
            tracing::debug!(
                dropped = candidates.len() - ORPHANED_INSPECTION_LIMIT,
                "truncating orphaned candidates"
            );
            candidates.truncate(ORPHANED_INSPECTION_LIMIT);
        }

        let cutoff = Utc::now() - chrono::Duration::days(i64::from(stale_days));
        let mut orphaned = Vec::new();
        for mut item in candidates {
            let comments = match self.issue_comments(&item.repository, item.number).await {
                Ok(c) => c,
                Err(err) => {
                    tracing::debug!(%err, item = %item.id, "comment inspection failed");
                    Vec::new()
                }
            };
            annotate_comment_thread(&mut item, &comments);
            let stale = item.last_team_activity_at.map_or(true, |t| t < cutoff);
            if stale {
                orphaned.push(item);
            }
        }
        Ok(orphaned)
    }

    async fn pr_details(&self, repo: &Repository, number: u64) -> Result<PrDetails> {
        let pull: wire::PullDetail = self
            .get(format!("/repos/{}/pulls/{}", repo.full_name(), number))
            .await?;
        let reviews: Vec<wire::Review> = self
            .get(format!(
                "/repos/{}/pulls/{}/reviews?per_page={}",
                repo.full_name(),
                number,
                PER_PAGE
            ))
            .await?;
        let status: wire::CombinedStatus = self
            .get(format!(
                "/repos/{}/commits/{}/status",
                repo.full_name(),
                pull.head.sha
            ))
            .await?;

        let requested_reviewers: Vec<String> = pull
            .requested_reviewers
            .iter()
            .map(|r| r.login.clone())
            .collect();
        let (review_state, latest_reviewer) =
            derive_review_state(&reviews, requested_reviewers.len());

        Ok(PrDetails {
            additions: pull.additions,
            deletions: pull.deletions,
            changed_files: pull.changed_files,
            mergeable: pull.mergeable.unwrap_or(false),
            draft: pull.draft,
            review_state,
            review_comments: pull.review_comments,
            requested_reviewers,
            latest_reviewer,
            ci_status: derive_ci_status(&status),
        })
    }

    async fn issue_details(&self, repo: &Repository, number: u64) -> Result<IssueDetails> {
        let comments = self.issue_comments(repo, number).await?;
        let last_commenter = comments
            .last()
            .and_then(|c| c.user.as_ref())
            .map(|u| u.login.clone());
        Ok(IssueDetails { last_commenter })
    }
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

fn derive_review_state(
    reviews: &[wire::Review],
    requested_reviewers: usize,
) -> (ReviewState, Option<String>) {
    let latest_reviewer = reviews
        .iter()
        .rev()
        .find_map(|r| r.user.as_ref().map(|u| u.login.clone()));

    let mut approved = false;
    let mut changes_requested = false;
    let mut commented = false;
    let mut pending = false;
    for review in reviews {
        match review.state.as_str() {
            "APPROVED" => approved = true,
            "CHANGES_REQUESTED" => changes_requested = true,
            "COMMENTED" => commented = true,
            "PENDING" => pending = true,
            _ => {}
        }
    }

    let state = if changes_requested {
        ReviewState::ChangesRequested
    } else if approved {
        ReviewState::Approved
    } else if pending {
        ReviewState::Pending
    } else if commented {
        ReviewState::Reviewed
    } else if requested_reviewers > 0 {
        ReviewState::ReviewRequired
    } else {
        ReviewState::None
    };

    (state, latest_reviewer)
}

fn derive_ci_status(status: &wire::CombinedStatus) -> CiStatus {
    if status.total_count == 0 {
        return CiStatus::None;
    }
    match status.state.as_str() {
        "success" => CiStatus::Success,
        "failure" | "error" => CiStatus::Failure,
        _ => CiStatus::Pending,
    }
}

/// Fill `last_commenter`, `consecutive_author_comments`, and
/// `last_team_activity_at` from an issue comment thread.
fn annotate_comment_thread(item: &mut Item, comments: &[wire::IssueComment]) {
    item.comment_count = comments.len() as u64;
    item.last_commenter = comments
        .last()
        .and_then(|c| c.user.as_ref())
        .map(|u| u.login.clone());

    let mut streak: u32 = 0;
    for comment in comments.iter().rev() {
        let by_author = comment
            .user
            .as_ref()
            .is_some_and(|u| u.login == item.author);
        if by_author {
            streak += 1;
        } else {
            break;
        }
    }
    item.consecutive_author_comments = streak;

    item.last_team_activity_at = comments
        .iter()
        .rev()
        .find(|c| c.user.as_ref().is_some_and(|u| u.login != item.author))
        .map(|c| c.created_at);
}

/// Classify an octocrab error into the provider taxonomy.
fn classify(err: octocrab::Error) -> ProviderError {
    if let octocrab::Error::GitHub { ref source, .. } = err {
        let message = source.message.to_lowercase();
        if message.contains("rate limit") {
            return ProviderError::RateLimited { reset: None };
        }
        if message.contains("bad credentials") || message.contains("requires authentication") {
            return ProviderError::Auth(source.message.clone());
        }
        if message.contains("not found") {
            return ProviderError::NotFound(source.message.clone());
        }
    }
    ProviderError::Api(err)
}

/// Space-only percent encoding; search qualifiers are otherwise URL-safe.
fn encode_query(q: &str) -> String {
    q.replace(' ', "+")
}
