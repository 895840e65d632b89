use anyhow::Result;

use triage_core::item::PrioritizedItem;

/// JSON format: an ordered array of `{item, score, priority, actionNeeded}`
/// objects with RFC3339 timestamps.
pub fn render_json(items: &[PrioritizedItem]) -> Result<()> {
    let json = serde_json::to_string_pretty(items)?;
    println!("{}", json);
    Ok(())
}

/// Plain-text table mirroring the Priority pane's columns.
pub fn render_table(items: &[PrioritizedItem]) {
    if items.is_empty() {
        println!("Nothing needs your attention.");
        return;
    }

    println!(
        "{:<10} {:<9} {:<60} {:<30} {:<16} {}",
        "PRIORITY", "SCORE", "TITLE", "REPOSITORY", "AUTHOR", "ACTION"
    );
    for p in items {
        println!(
            "{:<10} {:<9} {:<60} {:<30} {:<16} {}",
            p.priority.label(),
            p.score,
            truncate(&p.item.subject.title, 58),
            truncate(&p.item.repository.full_name(), 28),
            truncate(&p.item.author, 14),
            p.action_needed,
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
