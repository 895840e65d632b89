use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};

use triage_core::cache::DetailCache;
use triage_core::item::{
    CiStatus, Details, IssueDetails, Item, ItemState, PrDetails, Reason, Repository, ReviewState,
    Subject, SubjectType,
};
use triage_github::enrich::enrich;
use triage_github::stub::StubProvider;
use triage_github::CancelFlag;

const USER: &str = "octocat";

fn item(number: u64, kind: SubjectType) -> Item {
    Item {
        id: format!("org/repo#{}", number),
        repository: Repository::new("org", "repo"),
        number,
        subject: Subject {
            kind,
            title: format!("item {}", number),
            url: String::new(),
        },
        reason: Reason::Subscribed,
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

fn pr_details() -> PrDetails {
    PrDetails {
        additions: 1,
        deletions: 1,
        changed_files: 1,
        mergeable: false,
        draft: false,
        review_state: ReviewState::None,
        review_comments: 0,
        requested_reviewers: Vec::new(),
        latest_reviewer: None,
        ci_status: CiStatus::None,
    }
}

async fn cache() -> (tempfile::TempDir, Arc<DetailCache>) {
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(DetailCache::open(dir.path()).await);
    (dir, cache)
}

#[tokio::test]
async fn attaches_details_in_place() {
    let mut provider = StubProvider::with_user(USER);
    provider.pr_details.insert("org/repo#1".into(), pr_details());
    provider.issue_details.insert(
        "org/repo#2".into(),
        IssueDetails {
            last_commenter: Some("maintainer".into()),
        },
    );
    let provider = Arc::new(provider);
    let (_dir, cache) = cache().await;

    let mut items = vec![
        item(1, SubjectType::PullRequest),
        item(2, SubjectType::Issue),
        item(3, SubjectType::Release),
    ];
    let report = enrich(
        Arc::clone(&provider) as _,
        cache,
        &mut items,
        4,
        |_, _| {},
        &CancelFlag::new(),
    )
    .await;

    assert_eq!(report.failures, 0);
    assert!(matches!(items[0].details, Some(Details::Pr(_))));
    assert!(matches!(items[1].details, Some(Details::Issue(_))));
    // Releases carry no variant payload.
    assert!(items[2].details.is_none());
}

#[tokio::test]
async fn cache_hits_skip_the_provider() {
    let provider = Arc::new(StubProvider::with_user(USER));
    let (_dir, cache) = cache().await;
    cache
        .store_details("org/repo", 1, Details::Pr(pr_details()), Utc::now())
        .await;

    let mut items = vec![item(1, SubjectType::PullRequest)];
    let report = enrich(
        Arc::clone(&provider) as _,
        Arc::clone(&cache),
        &mut items,
        2,
        |_, _| {},
        &CancelFlag::new(),
    )
    .await;

    assert_eq!(report.cache_hits, 1);
    assert_eq!(report.failures, 0);
    assert_eq!(provider.detail_call_count(), 0);
    assert!(items[0].details.is_some());
}

#[tokio::test]
async fn individual_failures_never_abort_the_batch() {
    let mut provider = StubProvider::with_user(USER);
    // Details exist for item 1 only; item 2 will 404.
    provider.pr_details.insert("org/repo#1".into(), pr_details());
    let provider = Arc::new(provider);
    let (_dir, cache) = cache().await;

    let mut items = vec![
        item(1, SubjectType::PullRequest),
        item(2, SubjectType::PullRequest),
    ];
    let report = enrich(
        Arc::clone(&provider) as _,
        cache,
        &mut items,
        2,
        |_, _| {},
        &CancelFlag::new(),
    )
    .await;

    assert_eq!(report.failures, 1);
    assert!(report.sample_error.is_some());
    assert!(items[0].details.is_some());
    assert!(items[1].details.is_none());
}

#[tokio::test]
async fn already_enriched_items_are_left_alone() {
    let provider = Arc::new(StubProvider::with_user(USER));
    let (_dir, cache) = cache().await;

    let mut enriched = item(5, SubjectType::Issue);
    enriched.details = Some(Details::Issue(IssueDetails {
        last_commenter: Some("keep-me".into()),
    }));
    let mut items = vec![enriched];

    let report = enrich(
        Arc::clone(&provider) as _,
        cache,
        &mut items,
        2,
        |_, _| {},
        &CancelFlag::new(),
    )
    .await;

    assert_eq!(report.failures, 0);
    assert_eq!(provider.detail_call_count(), 0);
    match &items[0].details {
        Some(Details::Issue(details)) => {
            assert_eq!(details.last_commenter.as_deref(), Some("keep-me"))
        }
        other => panic!("details were replaced: {:?}", other),
    }
}

#[tokio::test]
async fn cancellation_stops_new_work() {
    let mut provider = StubProvider::with_user(USER);
    provider.pr_details.insert("org/repo#1".into(), pr_details());
    let provider = Arc::new(provider);
    let (_dir, cache) = cache().await;

    let cancel = CancelFlag::new();
    cancel.cancel();

    let mut items = vec![item(1, SubjectType::PullRequest)];
    let report = enrich(
        Arc::clone(&provider) as _,
        cache,
        &mut items,
        2,
        |_, _| {},
        &cancel,
    )
    .await;

    assert_eq!(provider.detail_call_count(), 0);
    assert!(items[0].details.is_none());
    assert_eq!(report.failures, 0);
}

#[tokio::test]
async fn progress_reports_reach_the_total() {
    let mut provider = StubProvider::with_user(USER);
    for n in 1..=10 {
        provider
            .pr_details
            .insert(format!("org/repo#{}", n), pr_details());
    }
    let provider = Arc::new(provider);
    let (_dir, cache) = cache().await;

    let seen: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let mut items: Vec<Item> = (1..=10).map(|n| item(n, SubjectType::PullRequest)).collect();
    enrich(
        Arc::clone(&provider) as _,
        cache,
        &mut items,
        3,
        move |completed, total| sink.lock().unwrap().push((completed, total)),
        &CancelFlag::new(),
    )
    .await;

    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    assert_eq!(seen.last().copied(), Some((10, 10)));
    // Monotone completion counts, arbitrary interleaving aside.
    assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0));
}
