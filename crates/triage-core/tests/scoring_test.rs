use chrono::{DateTime, Duration, Utc};

use triage_core::item::{
    CiStatus, Details, IssueDetails, Item, ItemState, PrDetails, Priority, Reason, Repository,
    ReviewState, Subject, SubjectType,
};
use triage_core::scoring::ScoringEngine;
use triage_core::weights::Weights;

const USER: &str = "octocat";

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-06-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn engine() -> ScoringEngine {
    ScoringEngine::new(
        Weights::default(),
        &["good first issue".to_string()],
        USER,
        now(),
    )
}

fn item(kind: SubjectType, reason: Reason) -> Item {
    Item {
        id: "org/repo#1".into(),
        repository: Repository::new("org", "repo"),
        number: 1,
        subject: Subject {
            kind,
            title: "a work item".into(),
            url: "https://github.com/org/repo/pull/1".into(),
        },
        reason,
        state: ItemState::Open,
        author: "someone-else".into(),
        assignees: Vec::new(),
        labels: Vec::new(),
        comment_count: 0,
        last_commenter: None,
        consecutive_author_comments: 0,
        created_at: now() - Duration::days(2),
        updated_at: now(),
        last_team_activity_at: None,
        details: None,
    }
}

fn big_pr() -> PrDetails {
    PrDetails {
        additions: 300,
        deletions: 40,
        changed_files: 12,
        mergeable: false,
        draft: false,
        review_state: ReviewState::None,
        review_comments: 0,
        requested_reviewers: Vec::new(),
        latest_reviewer: None,
        ci_status: CiStatus::None,
    }
}

// ---------------------------------------------------------------------------
// Score computation
// ---------------------------------------------------------------------------

#[test]
fn unenriched_items_score_their_base_only() {
    let subscribed = item(SubjectType::PullRequest, Reason::Subscribed);
    assert_eq!(engine().score(&subscribed), 20);

    let review = item(SubjectType::PullRequest, Reason::ReviewRequested);
    assert_eq!(engine().score(&review), 100);
}

#[test]
fn state_modifiers_require_variant_payload() {
    let mut issue = item(SubjectType::Issue, Reason::Subscribed);
    issue.details = Some(Details::Issue(IssueDetails {
        last_commenter: None,
    }));
    assert_eq!(engine().score(&issue), 20 + 15);

    issue.state = ItemState::Closed;
    // 20 - 30 clamps at zero.
    assert_eq!(engine().score(&issue), 0);
}

#[test]
fn hot_topic_bonus_above_threshold() {
    let mut issue = item(SubjectType::Issue, Reason::Subscribed);
    issue.details = Some(Details::Issue(IssueDetails {
        last_commenter: None,
    }));
    issue.comment_count = 10;
    assert_eq!(engine().score(&issue), 35);

    issue.comment_count = 11;
    assert_eq!(engine().score(&issue), 55);
}

#[test]
fn stale_authored_pr_contribution_is_capped() {
    // updated 20 days ago, threshold 7, 2/day, cap 20:
    // min((20-7+1)*2, 20) = 20.
    let mut pr = item(SubjectType::PullRequest, Reason::Author);
    pr.author = USER.into();
    pr.updated_at = now() - Duration::days(20);
    pr.details = Some(Details::Pr(big_pr()));

    // author 80 + open 15 + stale 20 + age cap 20
    assert_eq!(engine().score(&pr), 135);
}

#[test]
fn review_comment_bonus_is_capped() {
    let mut pr = item(SubjectType::PullRequest, Reason::Author);
    pr.author = USER.into();
    pr.details = Some(Details::Pr(PrDetails {
        review_comments: 10,
        ..big_pr()
    }));
    // author 80 + open 15 + min(10*5, 25)
    assert_eq!(engine().score(&pr), 120);
}

#[test]
fn approved_mergeable_and_draft_modifiers() {
    let mut pr = item(SubjectType::PullRequest, Reason::Author);
    pr.author = USER.into();
    pr.details = Some(Details::Pr(PrDetails {
        mergeable: true,
        review_state: ReviewState::Approved,
        ..big_pr()
    }));
    // author 80 + open 15 + approved 50 + mergeable 25
    assert_eq!(engine().score(&pr), 170);

    // Mergeability is ignored off the open state.
    pr.state = ItemState::Merged;
    // author 80 - 30 + approved 50
    assert_eq!(engine().score(&pr), 100);

    pr.state = ItemState::Open;
    pr.details = Some(Details::Pr(PrDetails {
        draft: true,
        ..big_pr()
    }));
    // author 80 + open 15 - 20
    assert_eq!(engine().score(&pr), 75);
}

#[test]
fn authored_modifiers_only_apply_to_the_current_user() {
    let mut pr = item(SubjectType::PullRequest, Reason::Author);
    pr.details = Some(Details::Pr(PrDetails {
        mergeable: true,
        review_state: ReviewState::Approved,
        ..big_pr()
    }));
    // author stays "someone-else": no approved/mergeable bonuses.
    assert_eq!(engine().score(&pr), 95);
}

#[test]
fn age_bonus_is_capped() {
    let mut stale = item(SubjectType::Release, Reason::Subscribed);
    stale.updated_at = now() - Duration::days(30);
    // 20 + min(30*2, 20)
    assert_eq!(engine().score(&stale), 40);
}

#[test]
fn raising_a_positive_weight_never_lowers_a_score() {
    let samples = [
        item(SubjectType::PullRequest, Reason::Mention),
        {
            let mut pr = item(SubjectType::PullRequest, Reason::Author);
            pr.author = USER.into();
            pr.details = Some(Details::Pr(big_pr()));
            pr
        },
        {
            let mut issue = item(SubjectType::Issue, Reason::Comment);
            issue.details = Some(Details::Issue(IssueDetails {
                last_commenter: None,
            }));
            issue.comment_count = 20;
            issue
        },
    ];

    let mut raised = Weights::default();
    raised.base_scores.mention += 40;
    raised.modifiers.hot_topic_bonus += 10;
    raised.pr.stale_pr_bonus_per_day += 3;
    let baseline = engine();
    let raised = ScoringEngine::new(raised, &[], USER, now());

    for sample in &samples {
        assert!(raised.score(sample) >= baseline.score(sample));
    }
}

#[test]
fn deepening_the_closed_penalty_never_raises_a_closed_score() {
    let mut closed = item(SubjectType::Issue, Reason::Comment);
    closed.state = ItemState::Closed;
    closed.details = Some(Details::Issue(IssueDetails {
        last_commenter: None,
    }));

    let mut harsher = Weights::default();
    harsher.modifiers.closed_state_penalty -= 40;
    let harsher = ScoringEngine::new(harsher, &[], USER, now());

    assert!(harsher.score(&closed) <= engine().score(&closed));
}

// ---------------------------------------------------------------------------
// Priority ladder
// ---------------------------------------------------------------------------

#[test]
fn review_requests_and_mentions_are_urgent() {
    let review = item(SubjectType::PullRequest, Reason::ReviewRequested);
    let score = engine().score(&review);
    assert_eq!(engine().priority(&review, score), Priority::Urgent);

    let mention = item(SubjectType::Issue, Reason::Mention);
    let score = engine().score(&mention);
    assert_eq!(engine().priority(&mention, score), Priority::Urgent);
}

#[test]
fn urgency_triggers_are_individually_toggleable() {
    let mut weights = Weights::default();
    weights.modifiers.urgent_on_review_request = false;
    let toggled = ScoringEngine::new(weights, &[], USER, now());

    let mut review = item(SubjectType::PullRequest, Reason::ReviewRequested);
    review.details = Some(Details::Pr(big_pr()));
    let score = toggled.score(&review);
    // 100 + 15 lands above the notable threshold instead.
    assert_eq!(toggled.priority(&review, score), Priority::Important);
}

#[test]
fn approved_mergeable_authored_pr_is_urgent_with_merge_action() {
    let mut pr = item(SubjectType::PullRequest, Reason::Author);
    pr.author = USER.into();
    pr.details = Some(Details::Pr(PrDetails {
        mergeable: true,
        review_state: ReviewState::Approved,
        additions: 500,
        ..big_pr()
    }));

    let engine = engine();
    let score = engine.score(&pr);
    assert_eq!(engine.priority(&pr, score), Priority::Urgent);
    assert_eq!(engine.action(&pr), "Merge PR");
}

#[test]
fn changes_requested_authored_pr_is_urgent() {
    let mut pr = item(SubjectType::PullRequest, Reason::Author);
    pr.author = USER.into();
    pr.details = Some(Details::Pr(PrDetails {
        review_state: ReviewState::ChangesRequested,
        ..big_pr()
    }));
    let engine = engine();
    let score = engine.score(&pr);
    assert_eq!(engine.priority(&pr, score), Priority::Urgent);
    assert_eq!(engine.action(&pr), "Address review feedback");
}

#[test]
fn score_promotion_reaches_urgent_with_triggers_off() {
    let mut weights = Weights::default();
    weights.modifiers.urgent_on_approved_mergeable = false;
    let engine = ScoringEngine::new(weights, &[], USER, now());

    let mut pr = item(SubjectType::PullRequest, Reason::Author);
    pr.author = USER.into();
    pr.details = Some(Details::Pr(PrDetails {
        mergeable: true,
        review_state: ReviewState::Approved,
        ..big_pr()
    }));
    let score = engine.score(&pr);
    assert!(score >= 150);
    assert_eq!(engine.priority(&pr, score), Priority::Urgent);
}

#[test]
fn labeled_good_first_issue_is_a_quick_win() {
    let mut issue = item(SubjectType::Issue, Reason::Subscribed);
    issue.labels = vec!["Good-First-Issue".into()];
    issue.details = Some(Details::Issue(IssueDetails {
        last_commenter: None,
    }));

    let engine = engine();
    let score = engine.score(&issue);
    assert_eq!(engine.priority(&issue, score), Priority::QuickWin);
    assert_eq!(engine.action(&issue), "Review activity (subscribed)");
}

#[test]
fn small_prs_are_quick_wins_without_labels() {
    let mut pr = item(SubjectType::PullRequest, Reason::Subscribed);
    pr.details = Some(Details::Pr(PrDetails {
        additions: 20,
        deletions: 10,
        changed_files: 2,
        ..big_pr()
    }));
    let engine = engine();
    let score = engine.score(&pr);
    assert_eq!(engine.priority(&pr, score), Priority::QuickWin);
}

#[test]
fn reason_classes_fall_to_important_then_thresholds() {
    let engine = engine();

    let assigned = item(SubjectType::Issue, Reason::Assign);
    let score = engine.score(&assigned);
    assert_eq!(engine.priority(&assigned, score), Priority::Important);

    let team = item(SubjectType::Issue, Reason::TeamMention);
    let score = engine.score(&team);
    assert_eq!(engine.priority(&team, score), Priority::Important);

    // comment base 50 sits exactly on the FYI promotion threshold.
    let comment = item(SubjectType::Issue, Reason::Comment);
    let score = engine.score(&comment);
    assert_eq!(engine.priority(&comment, score), Priority::Notable);

    let quiet = item(SubjectType::Release, Reason::Subscribed);
    let score = engine.score(&quiet);
    assert_eq!(engine.priority(&quiet, score), Priority::Fyi);
}

#[test]
fn every_item_gets_exactly_one_priority() {
    let engine = engine();
    for reason in [
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
    ] {
        for kind in [SubjectType::PullRequest, SubjectType::Issue] {
            let mut sample = item(kind, reason);
            sample.details = match kind {
                SubjectType::PullRequest => Some(Details::Pr(big_pr())),
                _ => Some(Details::Issue(IssueDetails {
                    last_commenter: None,
                })),
            };
            let score = engine.score(&sample);
            // priority() is total; the ladder's final arm catches everything.
            let _ = engine.priority(&sample, score);
            assert!(score >= 0);
        }
    }
}

// ---------------------------------------------------------------------------
// Action suggestions
// ---------------------------------------------------------------------------

#[test]
fn action_lookup_by_reason() {
    let engine = engine();
    assert_eq!(
        engine.action(&item(SubjectType::PullRequest, Reason::ReviewRequested)),
        "Review this PR"
    );
    assert_eq!(
        engine.action(&item(SubjectType::Issue, Reason::Mention)),
        "Respond to mention"
    );

    let mut closed = item(SubjectType::Issue, Reason::StateChange);
    closed.state = ItemState::Closed;
    assert_eq!(engine.action(&closed), "Acknowledge closure");
}

#[test]
fn authored_pr_action_sub_switch() {
    let engine = engine();
    let mut pr = item(SubjectType::PullRequest, Reason::Author);
    pr.author = USER.into();

    pr.details = Some(Details::Pr(PrDetails {
        review_state: ReviewState::Approved,
        ..big_pr()
    }));
    assert_eq!(engine.action(&pr), "Resolve conflicts & merge");

    pr.details = Some(Details::Pr(PrDetails {
        review_comments: 3,
        ..big_pr()
    }));
    assert_eq!(engine.action(&pr), "Respond to review comments");

    pr.details = Some(Details::Pr(PrDetails {
        review_state: ReviewState::ReviewRequired,
        ..big_pr()
    }));
    assert_eq!(engine.action(&pr), "Awaiting review");

    pr.details = Some(Details::Pr(PrDetails {
        draft: true,
        ..big_pr()
    }));
    assert_eq!(engine.action(&pr), "Finish draft PR");

    pr.details = Some(Details::Pr(big_pr()));
    assert_eq!(engine.action(&pr), "Follow up on PR");
}
