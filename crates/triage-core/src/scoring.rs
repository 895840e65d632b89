use chrono::{DateTime, Utc};

use crate::item::{
    normalize_label, Details, Item, ItemState, PrioritizedItem, Priority, Reason, ReviewState,
    SubjectType,
};
use crate::weights::Weights;

/// Computes score, priority bucket, and suggested action for items.
/// Deterministic given the weights, the quick-win labels, the current user,
/// and the `now` captured at construction (one engine per run).
pub struct ScoringEngine {
    weights: Weights,
    /// Normalized with [`normalize_label`].
    quick_win_labels: Vec<String>,
    current_user: String,
    now: DateTime<Utc>,
}

impl ScoringEngine {
    pub fn new(
        weights: Weights,
        quick_win_labels: &[String],
        current_user: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            weights,
            quick_win_labels: quick_win_labels.iter().map(|l| normalize_label(l)).collect(),
            current_user: current_user.into(),
            now,
        }
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Score, classify, and suggest an action in one pass.
    pub fn prioritize(&self, item: Item) -> PrioritizedItem {
        let score = self.score(&item);
        let priority = self.priority(&item, score);
        let action_needed = self.action(&item);
        PrioritizedItem {
            item,
            score,
            priority,
            action_needed,
        }
    }

    // -----------------------------------------------------------------------
    // Score
    // -----------------------------------------------------------------------

    pub fn score(&self, item: &Item) -> i64 {
        let w = &self.weights;
        let mut score = w.base_scores.for_reason(item.reason);

        // Modifiers only apply once the item carries variant payload.
        if item.details.is_some() {
            score += match item.state {
                ItemState::Open => w.modifiers.open_state_bonus,
                ItemState::Closed | ItemState::Merged => w.modifiers.closed_state_penalty,
            };

            if item.comment_count > w.modifiers.hot_topic_threshold {
                score += w.modifiers.hot_topic_bonus;
            }

            if self.is_low_hanging_fruit(item) {
                score += w.modifiers.low_hanging_bonus;
            }

            if item.author == self.current_user {
                if let Some(Details::Pr(pr)) = &item.details {
                    match pr.review_state {
                        ReviewState::Approved => {
                            score += w.pr.approved_pr_bonus;
                            // Mergeability is only meaningful on open PRs.
                            if item.state == ItemState::Open && pr.mergeable {
                                score += w.pr.mergeable_pr_bonus;
                            }
                        }
                        ReviewState::ChangesRequested => {
                            score += w.pr.changes_requested_bonus;
                        }
                        _ => {}
                    }

                    if pr.review_comments > 0 {
                        score += (pr.review_comments as i64 * w.pr.review_comment_bonus)
                            .min(w.pr.review_comment_max_bonus);
                    }

                    let days = item.days_since_update(self.now);
                    if days >= w.pr.stale_pr_threshold_days {
                        score += ((days - w.pr.stale_pr_threshold_days + 1)
                            * w.pr.stale_pr_bonus_per_day)
                            .min(w.pr.stale_pr_max_bonus);
                    }

                    if pr.draft {
                        score += w.pr.draft_pr_penalty;
                    }
                }
            }
        }

        score += (item.days_since_update(self.now) * w.modifiers.old_unread_bonus)
            .min(w.modifiers.max_age_bonus);

        score.max(0)
    }

    // -----------------------------------------------------------------------
    // Priority ladder (first match wins)
    // -----------------------------------------------------------------------

    pub fn priority(&self, item: &Item, score: i64) -> Priority {
        let m = &self.weights.modifiers;

        if m.urgent_on_review_request && item.reason == Reason::ReviewRequested {
            return Priority::Urgent;
        }
        if m.urgent_on_mention && item.reason == Reason::Mention {
            return Priority::Urgent;
        }
        if item.reason == Reason::Author && item.author == self.current_user {
            if let Some(pr) = item.pr_details() {
                if m.urgent_on_approved_mergeable
                    && pr.review_state == ReviewState::Approved
                    && item.state == ItemState::Open
                    && pr.mergeable
                {
                    return Priority::Urgent;
                }
                if m.urgent_on_changes_requested
                    && pr.review_state == ReviewState::ChangesRequested
                {
                    return Priority::Urgent;
                }
            }
        }

        if score >= m.important_promotion_threshold {
            return Priority::Urgent;
        }
        if self.is_low_hanging_fruit(item) {
            return Priority::QuickWin;
        }
        if matches!(
            item.reason,
            Reason::Author | Reason::Assign | Reason::TeamMention
        ) {
            return Priority::Important;
        }
        if score >= m.notable_promotion_threshold {
            return Priority::Important;
        }
        if score >= m.fyi_promotion_threshold {
            return Priority::Notable;
        }
        Priority::Fyi
    }

    // -----------------------------------------------------------------------
    // Action suggestion
    // -----------------------------------------------------------------------

    pub fn action(&self, item: &Item) -> String {
        match item.reason {
            Reason::ReviewRequested => "Review this PR".to_string(),
            Reason::Mention => "Respond to mention".to_string(),
            Reason::TeamMention => "Respond to team mention".to_string(),
            Reason::Author => self.authored_action(item),
            Reason::Assign => match item.subject.kind {
                SubjectType::PullRequest => "Work on assigned PR".to_string(),
                _ => "Work on assigned issue".to_string(),
            },
            Reason::Comment => "Review new comments".to_string(),
            Reason::StateChange => {
                if item.state == ItemState::Open {
                    "Review state change".to_string()
                } else {
                    "Acknowledge closure".to_string()
                }
            }
            Reason::Subscribed => "Review activity (subscribed)".to_string(),
            Reason::CiActivity => "Check CI status".to_string(),
            Reason::Orphaned => "Triage orphaned item".to_string(),
        }
    }

    fn authored_action(&self, item: &Item) -> String {
        let Some(pr) = item.pr_details() else {
            return "Follow up on your item".to_string();
        };
        if pr.draft {
            return "Finish draft PR".to_string();
        }
        match pr.review_state {
            ReviewState::Approved if item.state == ItemState::Open && pr.mergeable => {
                "Merge PR".to_string()
            }
            ReviewState::Approved if item.state == ItemState::Open => {
                "Resolve conflicts & merge".to_string()
            }
            ReviewState::ChangesRequested => "Address review feedback".to_string(),
            _ if pr.review_comments > 0 => "Respond to review comments".to_string(),
            ReviewState::Pending | ReviewState::ReviewRequired => "Awaiting review".to_string(),
            _ => "Follow up on PR".to_string(),
        }
    }

    // -----------------------------------------------------------------------
    // Low-hanging fruit
    // -----------------------------------------------------------------------

    /// True when a configured quick-win label matches, or the item is a PR
    /// with a small diff footprint.
    pub fn is_low_hanging_fruit(&self, item: &Item) -> bool {
        if self
            .quick_win_labels
            .iter()
            .any(|label| item.has_label(label))
        {
            return true;
        }
        if let Some(pr) = item.pr_details() {
            return pr.changed_files <= self.weights.pr.small_pr_max_files
                && pr.lines_changed() <= self.weights.pr.small_pr_max_lines;
        }
        false
    }
}
