use std::sync::Arc;

use chrono::{Duration, Utc};

use triage_core::cache::DetailCache;
use triage_core::item::{
    CiStatus, Details, Item, ItemState, PrDetails, Priority, Reason, Repository, ReviewState,
    Subject, SubjectType,
};
use triage_core::scoring::ScoringEngine;
use triage_core::weights::Weights;
use triage_github::stub::StubProvider;
use triage_github::{fetch_all, merge, progress_channel, CancelFlag, FetchOptions, FetchResult};

const USER: &str = "octocat";

fn item(repo: &str, number: u64, kind: SubjectType, reason: Reason) -> Item {
    let (owner, name) = repo.split_once('/').unwrap();
    Item {
        id: format!("{}#{}:{:?}", repo, number, kind),
        repository: Repository::new(owner, name),
        number,
        subject: Subject {
            kind,
            title: format!("item {}", number),
            url: format!("https://github.com/{}/pull/{}", repo, number),
        },
        reason,
        state: ItemState::Open,
        author: "someone".into(),
        assignees: Vec::new(),
        labels: Vec::new(),
        comment_count: 0,
        last_commenter: None,
        consecutive_author_comments: 0,
        created_at: Utc::now() - Duration::days(1),
        updated_at: Utc::now(),
        last_team_activity_at: None,
        details: None,
    }
}

fn enriched(repo: &str, number: u64, kind: SubjectType, reason: Reason) -> Item {
    let mut i = item(repo, number, kind, reason);
    i.details = Some(match kind {
        SubjectType::PullRequest => Details::Pr(pr_details()),
        _ => Details::Issue(triage_core::item::IssueDetails {
            last_commenter: None,
        }),
    });
    i
}

fn pr_details() -> PrDetails {
    PrDetails {
        additions: 100,
        deletions: 10,
        changed_files: 4,
        mergeable: true,
        draft: false,
        review_state: ReviewState::ReviewRequired,
        review_comments: 0,
        requested_reviewers: vec![USER.to_string()],
        latest_reviewer: None,
        ci_status: CiStatus::Pending,
    }
}

fn options() -> FetchOptions {
    FetchOptions {
        since: Utc::now() - Duration::weeks(1),
        orphaned_repos: Vec::new(),
        stale_days: 14,
        workers: 4,
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

#[test]
fn review_request_not_in_notifications_is_appended_and_urgent() {
    let result = FetchResult {
        notifications: vec![enriched("org/repo", 10, SubjectType::Issue, Reason::Subscribed)],
        review_prs: vec![enriched(
            "org/repo",
            11,
            SubjectType::PullRequest,
            Reason::ReviewRequested,
        )],
        ..FetchResult::default()
    };

    let (merged, stats) = merge(&result);
    assert_eq!(merged.len(), 2);
    assert_eq!(stats.review_prs_added, 1);

    let engine = ScoringEngine::new(Weights::default(), &[], USER, Utc::now());
    let review_pr = merged
        .iter()
        .find(|i| i.reason == Reason::ReviewRequested)
        .unwrap();
    let score = engine.score(review_pr);
    assert_eq!(engine.priority(review_pr, score), Priority::Urgent);
}

#[test]
fn orphaned_dedup_respects_the_triple_key() {
    let result = FetchResult {
        notifications: vec![
            enriched("org/repo", 1, SubjectType::PullRequest, Reason::Subscribed),
            enriched("org/repo", 2, SubjectType::Issue, Reason::Subscribed),
        ],
        orphaned: vec![
            enriched("org/repo", 1, SubjectType::PullRequest, Reason::Orphaned),
            enriched("org/repo", 2, SubjectType::Issue, Reason::Orphaned),
            enriched("org/repo", 3, SubjectType::Issue, Reason::Orphaned),
        ],
        ..FetchResult::default()
    };

    let (merged, stats) = merge(&result);
    assert_eq!(merged.len(), 3);
    assert_eq!(stats.orphaned_added, 1);
}

#[test]
fn same_number_different_type_is_not_a_duplicate() {
    let result = FetchResult {
        notifications: vec![enriched("org/repo", 7, SubjectType::PullRequest, Reason::Subscribed)],
        assigned_issues: vec![enriched("org/repo", 7, SubjectType::Issue, Reason::Assign)],
        ..FetchResult::default()
    };

    let (merged, stats) = merge(&result);
    assert_eq!(merged.len(), 2);
    assert_eq!(stats.assigned_issues_added, 1);
}

#[test]
fn merged_keys_are_unique_and_stats_sum() {
    let result = FetchResult {
        notifications: vec![
            enriched("org/a", 1, SubjectType::PullRequest, Reason::Subscribed),
            enriched("org/a", 2, SubjectType::Issue, Reason::Mention),
        ],
        review_prs: vec![
            enriched("org/a", 1, SubjectType::PullRequest, Reason::ReviewRequested),
            enriched("org/b", 1, SubjectType::PullRequest, Reason::ReviewRequested),
        ],
        authored_prs: vec![enriched("org/a", 3, SubjectType::PullRequest, Reason::Author)],
        assigned_issues: vec![enriched("org/a", 2, SubjectType::Issue, Reason::Assign)],
        orphaned: vec![enriched("org/c", 9, SubjectType::Issue, Reason::Orphaned)],
        ..FetchResult::default()
    };

    let (merged, stats) = merge(&result);

    let mut keys: Vec<_> = merged
        .iter()
        .map(|i| (i.repository.full_name(), i.number, i.subject.kind))
        .collect();
    keys.sort();
    let before = keys.len();
    keys.dedup();
    assert_eq!(keys.len(), before);

    assert_eq!(
        stats.total_added(),
        merged.len() - result.notifications.len()
    );
}

#[test]
fn unenriched_secondary_items_are_never_merged() {
    let result = FetchResult {
        notifications: vec![item("org/a", 1, SubjectType::Release, Reason::Subscribed)],
        review_prs: vec![item("org/a", 2, SubjectType::PullRequest, Reason::ReviewRequested)],
        ..FetchResult::default()
    };

    let (merged, stats) = merge(&result);
    // The bare release from notifications stays; the bare PR does not merge.
    assert_eq!(merged.len(), 1);
    assert_eq!(stats.review_prs_added, 0);
}

#[test]
fn merge_does_not_mutate_its_inputs() {
    let result = FetchResult {
        notifications: vec![enriched("org/a", 1, SubjectType::Issue, Reason::Subscribed)],
        review_prs: vec![
            enriched("org/a", 1, SubjectType::Issue, Reason::ReviewRequested),
            enriched("org/a", 5, SubjectType::PullRequest, Reason::ReviewRequested),
        ],
        ..FetchResult::default()
    };

    let notif_ids: Vec<String> = result.notifications.iter().map(|i| i.id.clone()).collect();
    let review_ids: Vec<String> = result.review_prs.iter().map(|i| i.id.clone()).collect();

    let _ = merge(&result);
    let _ = merge(&result);

    assert_eq!(
        notif_ids,
        result
            .notifications
            .iter()
            .map(|i| i.id.clone())
            .collect::<Vec<_>>()
    );
    assert_eq!(
        review_ids,
        result
            .review_prs
            .iter()
            .map(|i| i.id.clone())
            .collect::<Vec<_>>()
    );
}

// ---------------------------------------------------------------------------
// fetch_all
// ---------------------------------------------------------------------------

#[tokio::test]
async fn notifications_failure_is_fatal() {
    let provider = Arc::new(StubProvider {
        user: USER.into(),
        fail_notifications: true,
        ..StubProvider::default()
    });
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(DetailCache::open(dir.path()).await);
    let (tx, _rx) = progress_channel();

    let result = fetch_all(
        provider,
        cache,
        USER,
        &options(),
        &tx,
        &CancelFlag::new(),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn cancellation_aborts_primary_fetches() {
    let provider = Arc::new(StubProvider {
        user: USER.into(),
        notifications: vec![enriched("org/a", 1, SubjectType::Issue, Reason::Mention)],
        ..StubProvider::default()
    });
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(DetailCache::open(dir.path()).await);
    let (tx, _rx) = progress_channel();

    let cancel = CancelFlag::new();
    cancel.cancel();

    // With the signal already tripped, no source query is issued and the
    // fatal notifications path reports the cancellation.
    let result = fetch_all(provider, cache, USER, &options(), &tx, &cancel).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn secondary_failures_leave_empty_slices() {
    let provider = Arc::new(StubProvider {
        user: USER.into(),
        notifications: vec![enriched("org/a", 1, SubjectType::Issue, Reason::Mention)],
        fail_secondary: true,
        ..StubProvider::default()
    });
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(DetailCache::open(dir.path()).await);
    let (tx, _rx) = progress_channel();

    let result = fetch_all(
        provider,
        cache,
        USER,
        &options(),
        &tx,
        &CancelFlag::new(),
    )
    .await
    .expect("notifications succeeded");

    assert_eq!(result.notifications.len(), 1);
    assert!(result.review_prs.is_empty());
    assert!(result.authored_prs.is_empty());
    assert!(result.assigned_issues.is_empty());
}

#[tokio::test]
async fn enrichment_attaches_details_and_reuses_the_cache() {
    let mut provider = StubProvider::with_user(USER);
    provider.notifications = vec![item(
        "org/repo",
        42,
        SubjectType::PullRequest,
        Reason::ReviewRequested,
    )];
    provider
        .pr_details
        .insert("org/repo#42".into(), pr_details());
    let provider = Arc::new(provider);

    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(DetailCache::open(dir.path()).await);
    let (tx, _rx) = progress_channel();
    let cancel = CancelFlag::new();
    let opts = options();

    let first = fetch_all(
        Arc::clone(&provider) as Arc<dyn triage_github::Provider>,
        Arc::clone(&cache),
        USER,
        &opts,
        &tx,
        &cancel,
    )
    .await
    .expect("first run");
    assert!(first.notifications[0].details.is_some());
    assert_eq!(provider.detail_call_count(), 1);
    assert_eq!(first.enrichment.cache_hits, 0);

    // Second run: the notification list and the details both come from cache.
    let second = fetch_all(
        Arc::clone(&provider) as Arc<dyn triage_github::Provider>,
        Arc::clone(&cache),
        USER,
        &opts,
        &tx,
        &cancel,
    )
    .await
    .expect("second run");
    assert!(second.notifications[0].details.is_some());
    assert_eq!(provider.detail_call_count(), 1);
    assert_eq!(second.enrichment.cache_hits, 1);
}
