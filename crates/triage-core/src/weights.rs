use serde::{Deserialize, Serialize};

use crate::item::Reason;

/// Scoring weights. Every field is independently overridable from the
/// `weights:` section of `config.yaml`; unspecified fields fall back to the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Weights {
    #[serde(default)]
    pub base_scores: BaseScores,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub pr: PrWeights,
}

// ---------------------------------------------------------------------------
// Base scores per reason
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseScores {
    #[serde(default = "d_review_requested")]
    pub review_requested: i64,
    #[serde(default = "d_mention")]
    pub mention: i64,
    #[serde(default = "d_team_mention")]
    pub team_mention: i64,
    #[serde(default = "d_author")]
    pub author: i64,
    #[serde(default = "d_assign")]
    pub assign: i64,
    #[serde(default = "d_comment")]
    pub comment: i64,
    #[serde(default = "d_state_change")]
    pub state_change: i64,
    #[serde(default = "d_subscribed")]
    pub subscribed: i64,
    #[serde(default = "d_ci_activity")]
    pub ci_activity: i64,
    #[serde(default = "d_orphaned")]
    pub orphaned: i64,
}

impl Default for BaseScores {
    fn default() -> Self {
        Self {
            review_requested: d_review_requested(),
            mention: d_mention(),
            team_mention: d_team_mention(),
            author: d_author(),
            assign: d_assign(),
            comment: d_comment(),
            state_change: d_state_change(),
            subscribed: d_subscribed(),
            ci_activity: d_ci_activity(),
            orphaned: d_orphaned(),
        }
    }
}

impl BaseScores {
    pub fn for_reason(&self, reason: Reason) -> i64 {
        match reason {
            Reason::ReviewRequested => self.review_requested,
            Reason::Mention => self.mention,
            Reason::TeamMention => self.team_mention,
            Reason::Author => self.author,
            Reason::Assign => self.assign,
            Reason::Comment => self.comment,
            Reason::StateChange => self.state_change,
            Reason::Subscribed => self.subscribed,
            Reason::CiActivity => self.ci_activity,
            Reason::Orphaned => self.orphaned,
        }
    }
}

fn d_review_requested() -> i64 {
    100
}
fn d_mention() -> i64 {
    90
}
fn d_team_mention() -> i64 {
    85
}
fn d_author() -> i64 {
    80
}
fn d_assign() -> i64 {
    75
}
fn d_comment() -> i64 {
    50
}
fn d_state_change() -> i64 {
    40
}
fn d_subscribed() -> i64 {
    20
}
fn d_ci_activity() -> i64 {
    5
}
fn d_orphaned() -> i64 {
    45
}

// ---------------------------------------------------------------------------
// General modifiers and promotion thresholds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default = "d_open_state_bonus")]
    pub open_state_bonus: i64,
    /// Typically negative.
    #[serde(default = "d_closed_state_penalty")]
    pub closed_state_penalty: i64,
    #[serde(default = "d_hot_topic_threshold")]
    pub hot_topic_threshold: u64,
    #[serde(default = "d_hot_topic_bonus")]
    pub hot_topic_bonus: i64,
    #[serde(default = "d_low_hanging_bonus")]
    pub low_hanging_bonus: i64,
    /// Per day since last update.
    #[serde(default = "d_old_unread_bonus")]
    pub old_unread_bonus: i64,
    #[serde(default = "d_max_age_bonus")]
    pub max_age_bonus: i64,
    #[serde(default = "d_important_promotion_threshold")]
    pub important_promotion_threshold: i64,
    #[serde(default = "d_notable_promotion_threshold")]
    pub notable_promotion_threshold: i64,
    #[serde(default = "d_fyi_promotion_threshold")]
    pub fyi_promotion_threshold: i64,
    // Direct-urgency triggers, each individually toggleable.
    #[serde(default = "d_true")]
    pub urgent_on_review_request: bool,
    #[serde(default = "d_true")]
    pub urgent_on_mention: bool,
    #[serde(default = "d_true")]
    pub urgent_on_approved_mergeable: bool,
    #[serde(default = "d_true")]
    pub urgent_on_changes_requested: bool,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            open_state_bonus: d_open_state_bonus(),
            closed_state_penalty: d_closed_state_penalty(),
            hot_topic_threshold: d_hot_topic_threshold(),
            hot_topic_bonus: d_hot_topic_bonus(),
            low_hanging_bonus: d_low_hanging_bonus(),
            old_unread_bonus: d_old_unread_bonus(),
            max_age_bonus: d_max_age_bonus(),
            important_promotion_threshold: d_important_promotion_threshold(),
            notable_promotion_threshold: d_notable_promotion_threshold(),
            fyi_promotion_threshold: d_fyi_promotion_threshold(),
            urgent_on_review_request: true,
            urgent_on_mention: true,
            urgent_on_approved_mergeable: true,
            urgent_on_changes_requested: true,
        }
    }
}

fn d_open_state_bonus() -> i64 {
    15
}
fn d_closed_state_penalty() -> i64 {
    -30
}
fn d_hot_topic_threshold() -> u64 {
    10
}
fn d_hot_topic_bonus() -> i64 {
    20
}
fn d_low_hanging_bonus() -> i64 {
    25
}
fn d_old_unread_bonus() -> i64 {
    2
}
fn d_max_age_bonus() -> i64 {
    20
}
fn d_important_promotion_threshold() -> i64 {
    150
}
fn d_notable_promotion_threshold() -> i64 {
    100
}
fn d_fyi_promotion_threshold() -> i64 {
    50
}
fn d_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// PR-specific weights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrWeights {
    #[serde(default = "d_small_pr_max_files")]
    pub small_pr_max_files: u64,
    #[serde(default = "d_small_pr_max_lines")]
    pub small_pr_max_lines: u64,
    #[serde(default = "d_approved_pr_bonus")]
    pub approved_pr_bonus: i64,
    #[serde(default = "d_mergeable_pr_bonus")]
    pub mergeable_pr_bonus: i64,
    #[serde(default = "d_changes_requested_bonus")]
    pub changes_requested_bonus: i64,
    /// Per review comment, capped by `review_comment_max_bonus`.
    #[serde(default = "d_review_comment_bonus")]
    pub review_comment_bonus: i64,
    #[serde(default = "d_review_comment_max_bonus")]
    pub review_comment_max_bonus: i64,
    #[serde(default = "d_stale_pr_threshold_days")]
    pub stale_pr_threshold_days: i64,
    #[serde(default = "d_stale_pr_bonus_per_day")]
    pub stale_pr_bonus_per_day: i64,
    #[serde(default = "d_stale_pr_max_bonus")]
    pub stale_pr_max_bonus: i64,
    /// Negative.
    #[serde(default = "d_draft_pr_penalty")]
    pub draft_pr_penalty: i64,
    // T-shirt size thresholds over additions+deletions.
    #[serde(default = "d_size_xs_max")]
    pub size_xs_max: u64,
    #[serde(default = "d_size_s_max")]
    pub size_s_max: u64,
    #[serde(default = "d_size_m_max")]
    pub size_m_max: u64,
    #[serde(default = "d_size_l_max")]
    pub size_l_max: u64,
}

impl Default for PrWeights {
    fn default() -> Self {
        Self {
            small_pr_max_files: d_small_pr_max_files(),
            small_pr_max_lines: d_small_pr_max_lines(),
            approved_pr_bonus: d_approved_pr_bonus(),
            mergeable_pr_bonus: d_mergeable_pr_bonus(),
            changes_requested_bonus: d_changes_requested_bonus(),
            review_comment_bonus: d_review_comment_bonus(),
            review_comment_max_bonus: d_review_comment_max_bonus(),
            stale_pr_threshold_days: d_stale_pr_threshold_days(),
            stale_pr_bonus_per_day: d_stale_pr_bonus_per_day(),
            stale_pr_max_bonus: d_stale_pr_max_bonus(),
            draft_pr_penalty: d_draft_pr_penalty(),
            size_xs_max: d_size_xs_max(),
            size_s_max: d_size_s_max(),
            size_m_max: d_size_m_max(),
            size_l_max: d_size_l_max(),
        }
    }
}

fn d_small_pr_max_files() -> u64 {
    3
}
fn d_small_pr_max_lines() -> u64 {
    50
}
fn d_approved_pr_bonus() -> i64 {
    50
}
fn d_mergeable_pr_bonus() -> i64 {
    25
}
fn d_changes_requested_bonus() -> i64 {
    40
}
fn d_review_comment_bonus() -> i64 {
    5
}
fn d_review_comment_max_bonus() -> i64 {
    25
}
fn d_stale_pr_threshold_days() -> i64 {
    7
}
fn d_stale_pr_bonus_per_day() -> i64 {
    2
}
fn d_stale_pr_max_bonus() -> i64 {
    20
}
fn d_draft_pr_penalty() -> i64 {
    -20
}
fn d_size_xs_max() -> u64 {
    10
}
fn d_size_s_max() -> u64 {
    50
}
fn d_size_m_max() -> u64 {
    200
}
fn d_size_l_max() -> u64 {
    600
}
