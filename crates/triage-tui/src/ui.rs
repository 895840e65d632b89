use chrono::Utc;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs};
use ratatui::Frame;

use triage_core::item::{CiStatus, PrioritizedItem, Priority};
use triage_core::routing::Pane;

use crate::app::{App, PaneView, PANE_ORDER, STATS_TAB};
use crate::layout::{self, ColumnLayout};
use crate::stats_view;

pub fn render(frame: &mut Frame, app: &mut App) {
    let banner_height = u16::from(app.banner.is_some());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(banner_height),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0]);
    if let Some(banner) = &app.banner {
        let line = Paragraph::new(Line::from(Span::styled(
            format!(" {} ", banner),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )));
        frame.render_widget(line, chunks[1]);
    }

    if app.active_tab == STATS_TAB {
        stats_view::render(frame, app, chunks[2]);
    } else {
        render_pane(frame, &app.panes[app.active_tab], chunks[2]);
    }

    render_footer(frame, app, chunks[3]);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut titles: Vec<Line> = PANE_ORDER
        .iter()
        .enumerate()
        .map(|(i, pane)| {
            Line::from(format!(
                "{} {} ({})",
                i + 1,
                pane.title(),
                app.panes[i].items.len()
            ))
        })
        .collect();
    titles.push(Line::from("5 Stats"));

    let tabs = Tabs::new(titles)
        .select(app.active_tab)
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title(" triage "));
    frame.render_widget(tabs, area);
}

fn render_pane(frame: &mut Frame, view: &PaneView, area: Rect) {
    if view.items.is_empty() {
        let message = match view.pane {
            Pane::Priority => "Inbox zero -- nothing needs your attention",
            Pane::Assigned => "Nothing is assigned to you",
            Pane::Blocked => "No assigned items carry a blocked label",
            Pane::Orphaned => "No orphaned external contributions",
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(pane_title(view)));
        frame.render_widget(empty, area);
        return;
    }

    let cols = layout::compute(area.width, view.pane);
    let (header, widths) = header_for(view.pane, &cols);

    let rows: Vec<Row> = view
        .items
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let style = if i == view.cursor {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Row::new(cells_for(view.pane, &cols, p)).style(style)
        })
        .collect();

    let table = Table::new(rows, widths)
        .header(Row::new(header).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(Block::default().borders(Borders::ALL).title(pane_title(view)));
    frame.render_widget(table, area);
}

fn pane_title(view: &PaneView) -> String {
    let arrow = if view.descending { "▼" } else { "▲" };
    format!(
        " {} — sort: {} {} ",
        view.pane.title(),
        view.sort.label(),
        arrow
    )
}

fn header_for(pane: Pane, cols: &ColumnLayout) -> (Vec<Cell<'static>>, Vec<Constraint>) {
    let mut header = vec![Cell::from("Updated")];
    let mut widths = vec![Constraint::Length(layout::UPDATED_WIDTH)];

    if pane == Pane::Priority {
        header.push(Cell::from("Priority"));
        widths.push(Constraint::Length(layout::PRIORITY_WIDTH));
    }
    if pane == Pane::Orphaned {
        header.push(Cell::from("Stale"));
        widths.push(Constraint::Length(layout::STALE_WIDTH));
        header.push(Cell::from("Cmnts"));
        widths.push(Constraint::Length(layout::COMMENTS_WIDTH));
    }

    header.push(Cell::from("Title"));
    widths.push(Constraint::Length(cols.title_width));
    header.push(Cell::from("Repository"));
    widths.push(Constraint::Length(cols.repo_width));

    if cols.show_signal && pane == Pane::Orphaned {
        header.push(Cell::from("Signal"));
        widths.push(Constraint::Length(layout::SIGNAL_WIDTH));
    }
    if cols.show_author {
        header.push(Cell::from("Author"));
        widths.push(Constraint::Length(layout::AUTHOR_WIDTH));
    }
    header.push(Cell::from("Size"));
    widths.push(Constraint::Length(layout::SIZE_WIDTH));
    if cols.show_ci {
        header.push(Cell::from("CI"));
        widths.push(Constraint::Length(layout::CI_WIDTH));
    }

    (header, widths)
}

fn cells_for(pane: Pane, cols: &ColumnLayout, p: &PrioritizedItem) -> Vec<Cell<'static>> {
    let now = Utc::now();
    let mut cells = vec![Cell::from(relative_age(p, now))];

    if pane == Pane::Priority {
        cells.push(
            Cell::from(p.priority.label()).style(Style::default().fg(priority_color(p.priority))),
        );
    }
    if pane == Pane::Orphaned {
        let stale_days = p
            .item
            .last_team_activity_at
            .map(|t| (now - t).num_days())
            .unwrap_or_else(|| (now - p.item.created_at).num_days());
        cells.push(Cell::from(format!("{}d", stale_days.max(0))));
        cells.push(Cell::from(p.item.comment_count.to_string()));
    }

    cells.push(Cell::from(p.item.subject.title.clone()));
    cells.push(Cell::from(p.item.repository.full_name()));

    if cols.show_signal && pane == Pane::Orphaned {
        cells.push(Cell::from(signal_text(p)));
    }
    if cols.show_author {
        cells.push(Cell::from(p.item.author.clone()));
    }
    cells.push(Cell::from(size_text(p)));
    if cols.show_ci {
        cells.push(ci_cell(p));
    }
    cells
}

fn relative_age(p: &PrioritizedItem, now: chrono::DateTime<Utc>) -> String {
    let delta = now - p.item.updated_at;
    if delta.num_days() >= 14 {
        format!("{}w", delta.num_weeks())
    } else if delta.num_days() >= 1 {
        format!("{}d", delta.num_days())
    } else if delta.num_hours() >= 1 {
        format!("{}h", delta.num_hours())
    } else {
        format!("{}m", delta.num_minutes().max(0))
    }
}

/// Staleness plus unanswered-streak; the two signals add, never cancel.
fn signal_text(p: &PrioritizedItem) -> String {
    let mut parts = Vec::new();
    if let Some(t) = p.item.last_team_activity_at {
        let days = (Utc::now() - t).num_days();
        if days >= 14 {
            parts.push(format!("{}d quiet", days));
        }
    } else {
        parts.push("no reply".to_string());
    }
    if p.item.consecutive_author_comments >= 2 {
        parts.push(format!("+{}c", p.item.consecutive_author_comments));
    }
    parts.join(" ")
}

fn size_text(p: &PrioritizedItem) -> String {
    match p.item.pr_details() {
        Some(pr) if pr.lines_changed() > 0 => format!("+{}/-{}", pr.additions, pr.deletions),
        _ => format!("{}c", p.item.comment_count),
    }
}

fn ci_cell(p: &PrioritizedItem) -> Cell<'static> {
    let (glyph, color) = match p.item.pr_details().map(|pr| pr.ci_status) {
        Some(CiStatus::Success) => ("✓", Color::Green),
        Some(CiStatus::Failure) => ("✗", Color::Red),
        Some(CiStatus::Pending) => ("●", Color::Yellow),
        Some(CiStatus::None) | None => ("-", Color::DarkGray),
    };
    Cell::from(glyph).style(Style::default().fg(color))
}

pub(crate) fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Urgent => Color::Red,
        Priority::Important => Color::Yellow,
        Priority::QuickWin => Color::Green,
        Priority::Notable => Color::Cyan,
        Priority::Fyi => Color::DarkGray,
    }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let text = if let Some(status) = &app.status {
        status.clone()
    } else if app.active_tab == STATS_TAB {
        "j/k scroll  g/G jump  Tab/1-5 pane  q quit".to_string()
    } else {
        "j/k move  g/G home/end  s sort  S dir  r reset  d resolve  Enter open  q quit".to_string()
    };
    let footer = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, area);
}
