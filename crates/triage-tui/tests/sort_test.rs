use chrono::{Duration, Utc};

use triage_core::item::{
    CiStatus, Details, Item, ItemState, PrDetails, PrioritizedItem, Priority, Reason, Repository,
    ReviewState, Subject, SubjectType,
};
use triage_core::routing::Pane;
use triage_tui::sort::{columns_for, default_sort, sort_items, SortColumn};

fn prioritized(number: u64, priority: Priority, score: i64) -> PrioritizedItem {
    PrioritizedItem {
        item: Item {
            id: format!("org/repo#{}", number),
            repository: Repository::new("org", "repo"),
            number,
            subject: Subject {
                kind: SubjectType::Issue,
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
            updated_at: Utc::now() - Duration::hours(number as i64),
            last_team_activity_at: None,
            details: None,
        },
        score,
        priority,
        action_needed: String::new(),
    }
}

fn with_pr(mut p: PrioritizedItem, additions: u64, deletions: u64, ci: CiStatus) -> PrioritizedItem {
    p.item.subject.kind = SubjectType::PullRequest;
    p.item.details = Some(Details::Pr(PrDetails {
        additions,
        deletions,
        changed_files: 1,
        mergeable: false,
        draft: false,
        review_state: ReviewState::None,
        review_comments: 0,
        requested_reviewers: Vec::new(),
        latest_reviewer: None,
        ci_status: ci,
    }));
    p
}

fn numbers(items: &[PrioritizedItem]) -> Vec<u64> {
    items.iter().map(|p| p.item.number).collect()
}

#[test]
fn priority_sorts_by_bucket_then_score() {
    let mut items = vec![
        prioritized(1, Priority::Fyi, 10),
        prioritized(2, Priority::Urgent, 90),
        prioritized(3, Priority::Urgent, 120),
        prioritized(4, Priority::QuickWin, 70),
    ];
    sort_items(&mut items, SortColumn::Priority, true);
    // Urgent first, higher score breaking the tie.
    assert_eq!(numbers(&items), vec![3, 2, 4, 1]);

    sort_items(&mut items, SortColumn::Priority, false);
    assert_eq!(numbers(&items), vec![1, 4, 2, 3]);
}

#[test]
fn updated_descending_is_newest_first() {
    let mut items = vec![
        prioritized(3, Priority::Fyi, 0),
        prioritized(1, Priority::Fyi, 0),
        prioritized(2, Priority::Fyi, 0),
    ];
    sort_items(&mut items, SortColumn::Updated, true);
    assert_eq!(numbers(&items), vec![1, 2, 3]);
}

#[test]
fn repo_and_author_descending_read_a_to_z() {
    let mut items = vec![
        prioritized(1, Priority::Fyi, 0),
        prioritized(2, Priority::Fyi, 0),
        prioritized(3, Priority::Fyi, 0),
    ];
    items[0].item.author = "zelda".into();
    items[1].item.author = "Alice".into();
    items[2].item.author = "mallory".into();

    sort_items(&mut items, SortColumn::Author, true);
    let authors: Vec<&str> = items.iter().map(|p| p.item.author.as_str()).collect();
    // Case-insensitive A→Z under ▼.
    assert_eq!(authors, vec!["Alice", "mallory", "zelda"]);

    sort_items(&mut items, SortColumn::Author, false);
    let authors: Vec<&str> = items.iter().map(|p| p.item.author.as_str()).collect();
    assert_eq!(authors, vec!["zelda", "mallory", "Alice"]);
}

#[test]
fn size_keeps_pr_data_ahead_of_no_data_in_both_directions() {
    let make = || {
        vec![
            {
                let mut p = prioritized(1, Priority::Fyi, 0);
                p.item.comment_count = 9;
                p
            },
            with_pr(prioritized(2, Priority::Fyi, 0), 500, 100, CiStatus::None),
            with_pr(prioritized(3, Priority::Fyi, 0), 5, 1, CiStatus::None),
            {
                let mut p = prioritized(4, Priority::Fyi, 0);
                p.item.comment_count = 2;
                p
            },
        ]
    };

    let mut items = make();
    sort_items(&mut items, SortColumn::Size, true);
    assert_eq!(numbers(&items), vec![2, 3, 1, 4]);

    let mut items = make();
    sort_items(&mut items, SortColumn::Size, false);
    // Direction flips within the groups, not across them.
    assert_eq!(numbers(&items), vec![3, 2, 4, 1]);
}

#[test]
fn ci_orders_success_before_pending_failure_none() {
    let mut items = vec![
        prioritized(1, Priority::Fyi, 0),
        with_pr(prioritized(2, Priority::Fyi, 0), 1, 1, CiStatus::Failure),
        with_pr(prioritized(3, Priority::Fyi, 0), 1, 1, CiStatus::Success),
        with_pr(prioritized(4, Priority::Fyi, 0), 1, 1, CiStatus::Pending),
    ];
    sort_items(&mut items, SortColumn::Ci, true);
    assert_eq!(numbers(&items), vec![3, 4, 2, 1]);
}

#[test]
fn stale_descending_leads_with_the_quietest_item() {
    let mut items = vec![
        prioritized(1, Priority::Fyi, 0),
        prioritized(2, Priority::Fyi, 0),
    ];
    items[0].item.last_team_activity_at = Some(Utc::now() - Duration::days(30));
    items[1].item.last_team_activity_at = Some(Utc::now() - Duration::days(2));

    sort_items(&mut items, SortColumn::Stale, true);
    assert_eq!(numbers(&items), vec![1, 2]);
}

#[test]
fn pane_defaults_and_column_menus() {
    assert_eq!(default_sort(Pane::Priority), (SortColumn::Priority, true));
    assert_eq!(default_sort(Pane::Orphaned), (SortColumn::Updated, true));
    assert_eq!(default_sort(Pane::Assigned), (SortColumn::Updated, true));
    assert_eq!(default_sort(Pane::Blocked), (SortColumn::Updated, true));

    assert!(columns_for(Pane::Priority).contains(&SortColumn::Priority));
    assert!(!columns_for(Pane::Assigned).contains(&SortColumn::Priority));
    assert!(columns_for(Pane::Orphaned).contains(&SortColumn::Stale));
    assert!(columns_for(Pane::Orphaned).contains(&SortColumn::Comments));
    for pane in Pane::ALL {
        for col in [
            SortColumn::Updated,
            SortColumn::Repo,
            SortColumn::Author,
            SortColumn::Size,
            SortColumn::Ci,
        ] {
            assert!(columns_for(pane).contains(&col));
        }
    }
}
