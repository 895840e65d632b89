//! An in-memory [`Provider`] for tests and offline development. Slices are
//! returned as configured; detail lookups consult the maps keyed by
//! `owner/repo#number`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use triage_core::item::{IssueDetails, Item, PrDetails, Repository};

use crate::provider::{Provider, ProviderError, Result};

#[derive(Default)]
pub struct StubProvider {
    pub user: String,
    pub notifications: Vec<Item>,
    pub review_prs: Vec<Item>,
    pub authored_prs: Vec<Item>,
    pub assigned_issues: Vec<Item>,
    pub orphaned: Vec<Item>,
    pub pr_details: HashMap<String, PrDetails>,
    pub issue_details: HashMap<String, IssueDetails>,
    pub fail_notifications: bool,
    pub fail_secondary: bool,
    pub detail_calls: AtomicUsize,
}

impl StubProvider {
    pub fn with_user(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Self::default()
        }
    }

    fn key(repo: &Repository, number: u64) -> String {
        format!("{}#{}", repo.full_name(), number)
    }

    pub fn detail_call_count(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for StubProvider {
    async fn current_user(&self) -> Result<String> {
        Ok(self.user.clone())
    }

    async fn notifications(&self, _since: DateTime<Utc>) -> Result<Vec<Item>> {
        if self.fail_notifications {
            return Err(ProviderError::Auth("stub: notifications failed".into()));
        }
        Ok(self.notifications.clone())
    }

    async fn review_requested_prs(&self, _user: &str) -> Result<Vec<Item>> {
        if self.fail_secondary {
            return Err(ProviderError::NotFound("stub: search failed".into()));
        }
        Ok(self.review_prs.clone())
    }

    async fn authored_prs(&self, _user: &str) -> Result<Vec<Item>> {
        if self.fail_secondary {
            return Err(ProviderError::NotFound("stub: search failed".into()));
        }
        Ok(self.authored_prs.clone())
    }

    async fn assigned_issues(&self, _user: &str) -> Result<Vec<Item>> {
        if self.fail_secondary {
            return Err(ProviderError::NotFound("stub: search failed".into()));
        }
        Ok(self.assigned_issues.clone())
    }

    async fn orphaned_items(&self, _repos: &[String], _stale_days: u32) -> Result<Vec<Item>> {
        Ok(self.orphaned.clone())
    }

    async fn pr_details(&self, repo: &Repository, number: u64) -> Result<PrDetails> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.pr_details
            .get(&Self::key(repo, number))
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(Self::key(repo, number)))
    }

    async fn issue_details(&self, repo: &Repository, number: u64) -> Result<IssueDetails> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.issue_details
            .get(&Self::key(repo, number))
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(Self::key(repo, number)))
    }
}
