use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Sparkline};
use ratatui::Frame;

use triage_core::item::Priority;
use triage_core::stats::{AGE_BUCKET_LABELS, STALENESS_BUCKET_LABELS};

use crate::app::App;
use crate::ui::priority_color;

/// Read-only dashboard: distributions over the current run plus sparkline
/// trends from the last 50 snapshots.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(9)])
        .split(area);

    render_distributions(frame, app, chunks[0]);
    render_trends(frame, app, chunks[1]);
}

fn render_distributions(frame: &mut Frame, app: &mut App, area: Rect) {
    let stats = &app.stats;
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(format!("Items this run: {}", stats.total)));
    lines.push(Line::from(""));

    lines.push(Line::from("By priority"));
    for priority in Priority::ALL {
        let count = stats.priority_counts[priority.ordinal() as usize];
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<10}", priority.label()),
                Style::default().fg(priority_color(priority)),
            ),
            Span::raw(bar(count, stats.total)),
            Span::raw(format!(" {}", count)),
        ]));
    }
    lines.push(Line::from(""));

    lines.push(Line::from("By age"));
    for (label, count) in AGE_BUCKET_LABELS.iter().zip(stats.age_buckets) {
        lines.push(Line::from(format!(
            "  {:<6}{} {}",
            label,
            bar(count, stats.total),
            count
        )));
    }
    lines.push(Line::from(""));

    if !stats.review_states.is_empty() {
        lines.push(Line::from("PR review states"));
        let mut states: Vec<_> = stats.review_states.iter().collect();
        states.sort_by_key(|(name, _)| *name);
        for (name, count) in states {
            lines.push(Line::from(format!("  {:<18}{}", name, count)));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(format!(
        "CI: {} passing, {} pending, {} failing, {} without",
        stats.ci_statuses[0], stats.ci_statuses[1], stats.ci_statuses[2], stats.ci_statuses[3]
    )));
    lines.push(Line::from(format!(
        "PR sizes: XS {}  S {}  M {}  L {}  XL {}",
        stats.sizes[0], stats.sizes[1], stats.sizes[2], stats.sizes[3], stats.sizes[4]
    )));
    lines.push(Line::from(""));

    lines.push(Line::from("Busiest repositories"));
    for (repo, count) in &stats.top_repos {
        lines.push(Line::from(format!("  {:<40}{}", repo, count)));
    }
    if stats.other_repos > 0 {
        lines.push(Line::from(format!(
            "  {:<40}{}",
            "(others)", stats.other_repos
        )));
    }
    lines.push(Line::from(""));

    lines.push(Line::from("Orphaned staleness"));
    for (label, count) in STALENESS_BUCKET_LABELS.iter().zip(stats.orphaned_staleness) {
        lines.push(Line::from(format!("  {:<6}{}", label, count)));
    }

    // Clamp G-style jumps to the real content height.
    let max_scroll = (lines.len() as u16).saturating_sub(area.height.saturating_sub(2));
    if app.stats_scroll > max_scroll {
        app.stats_scroll = max_scroll;
    }

    let body = Paragraph::new(lines)
        .scroll((app.stats_scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(" Stats "));
    frame.render_widget(body, area);
}

fn render_trends(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    let total: Vec<u64> = app
        .snapshots
        .iter()
        .map(|s| s.total_count as u64)
        .collect();
    let orphaned: Vec<u64> = app
        .snapshots
        .iter()
        .map(|s| s.orphaned_pane as u64)
        .collect();
    let median_age: Vec<u64> = app
        .snapshots
        .iter()
        .map(|s| s.median_age_hours.max(0.0) as u64)
        .collect();

    sparkline(frame, chunks[0], " Total ", &total, Color::Cyan);
    sparkline(frame, chunks[1], " Orphaned ", &orphaned, Color::Magenta);
    sparkline(frame, chunks[2], " Median age (h) ", &median_age, Color::Yellow);
}

fn sparkline(frame: &mut Frame, area: Rect, title: &str, data: &[u64], color: Color) {
    let widget = Sparkline::default()
        .data(data)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    frame.render_widget(widget, area);
}

fn bar(count: usize, total: usize) -> String {
    if total == 0 {
        return String::new();
    }
    let filled = (count * 20).div_ceil(total.max(1)).min(20);
    "█".repeat(filled)
}
