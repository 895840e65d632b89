use serde::{Deserialize, Serialize};

use crate::item::{normalize_label, Item, Reason};

/// The four list panes. Routing is exclusive; precedence is
/// Blocked > Assigned > Orphaned > Priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pane {
    Priority,
    Assigned,
    Blocked,
    Orphaned,
}

impl Pane {
    pub const ALL: [Pane; 4] = [Pane::Priority, Pane::Assigned, Pane::Blocked, Pane::Orphaned];

    pub fn title(&self) -> &'static str {
        match self {
            Pane::Priority => "Priority",
            Pane::Assigned => "Assigned",
            Pane::Blocked => "Blocked",
            Pane::Orphaned => "Orphaned",
        }
    }
}

/// Decide which pane an item belongs to.
///
/// `blocked_labels` must be the raw configured labels; normalization happens
/// here. Items assigned to someone other than the current user fall through
/// to Priority, not Orphaned.
pub fn route(item: &Item, current_user: &str, blocked_labels: &[String]) -> Pane {
    let assigned_to_me = item.assignees.iter().any(|a| a == current_user);

    if assigned_to_me {
        let blocked = blocked_labels
            .iter()
            .any(|l| item.has_label(&normalize_label(l)));
        if blocked {
            return Pane::Blocked;
        }
        return Pane::Assigned;
    }

    if item.reason == Reason::Orphaned && item.assignees.is_empty() {
        return Pane::Orphaned;
    }

    Pane::Priority
}
