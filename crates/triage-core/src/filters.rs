use crate::item::{Item, ItemState, PrioritizedItem, Priority, Reason, SubjectType};
use crate::resolved::ResolvedStore;

/// Drop PRs and issues whose details could not be attached; other subject
/// types (releases, discussions) never carry details and are kept.
pub fn filter_out_unenriched(items: Vec<Item>) -> Vec<Item> {
    items.into_iter().filter(|i| !i.is_unenriched()).collect()
}

pub fn filter_out_merged(items: Vec<PrioritizedItem>) -> Vec<PrioritizedItem> {
    items
        .into_iter()
        .filter(|p| p.item.state != ItemState::Merged)
        .collect()
}

pub fn filter_out_closed(items: Vec<PrioritizedItem>) -> Vec<PrioritizedItem> {
    items
        .into_iter()
        .filter(|p| p.item.state != ItemState::Closed)
        .collect()
}

pub fn filter_by_priority(
    items: Vec<PrioritizedItem>,
    priority: Priority,
) -> Vec<PrioritizedItem> {
    items.into_iter().filter(|p| p.priority == priority).collect()
}

pub fn filter_by_reason(items: Vec<PrioritizedItem>, reason: Reason) -> Vec<PrioritizedItem> {
    items.into_iter().filter(|p| p.item.reason == reason).collect()
}

pub fn filter_by_type(items: Vec<PrioritizedItem>, kind: SubjectType) -> Vec<PrioritizedItem> {
    items
        .into_iter()
        .filter(|p| p.item.subject.kind == kind)
        .collect()
}

pub fn filter_by_repo(items: Vec<PrioritizedItem>, full_name: &str) -> Vec<PrioritizedItem> {
    items
        .into_iter()
        .filter(|p| p.item.repository.full_name() == full_name)
        .collect()
}

pub fn exclude_repos(items: Vec<PrioritizedItem>, repos: &[String]) -> Vec<PrioritizedItem> {
    items
        .into_iter()
        .filter(|p| !repos.iter().any(|r| *r == p.item.repository.full_name()))
        .collect()
}

pub fn exclude_authors(items: Vec<PrioritizedItem>, authors: &[String]) -> Vec<PrioritizedItem> {
    items
        .into_iter()
        .filter(|p| !authors.iter().any(|a| *a == p.item.author))
        .collect()
}

/// Hide items the user resolved, unless they have newer upstream activity.
pub fn filter_resolved(
    items: Vec<PrioritizedItem>,
    resolved: &ResolvedStore,
) -> Vec<PrioritizedItem> {
    items
        .into_iter()
        .filter(|p| resolved.should_show(&p.item.id, p.item.updated_at))
        .collect()
}

pub fn limit(mut items: Vec<PrioritizedItem>, n: usize) -> Vec<PrioritizedItem> {
    items.truncate(n);
    items
}
