use triage_core::routing::Pane;

pub const UPDATED_WIDTH: u16 = 10;
pub const PRIORITY_WIDTH: u16 = 10;
pub const SIZE_WIDTH: u16 = 7;
pub const CI_WIDTH: u16 = 4;
pub const AUTHOR_WIDTH: u16 = 15;
pub const SIGNAL_WIDTH: u16 = 12;
pub const STALE_WIDTH: u16 = 7;
pub const COMMENTS_WIDTH: u16 = 5;

const TITLE_MIN: u16 = 30;
const TITLE_MAX: u16 = 120;
const REPO_MIN: u16 = 20;
const REPO_MAX: u16 = 50;
/// Per-column spacing the Table widget inserts.
const COLUMN_SPACING: u16 = 1;

/// Which optional columns fit at the current terminal width, and how the
/// flexible Title/Repository columns split the leftover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub show_signal: bool,
    pub show_author: bool,
    pub show_ci: bool,
    pub title_width: u16,
    pub repo_width: u16,
}

/// Decide visibility and flex widths for `pane` at terminal `width`.
///
/// Hide order under pressure: Signal first, then Author, then CI. Title and
/// Repository flex 70/30 over the leftover, bounded by [30,120] and [20,50].
pub fn compute(width: u16, pane: Pane) -> ColumnLayout {
    let signal_available = pane == Pane::Orphaned;
    let mut show_signal = signal_available;
    let mut show_author = true;
    let mut show_ci = true;

    loop {
        let fixed = fixed_width(pane, show_signal, show_author, show_ci);
        if width >= fixed + TITLE_MIN + REPO_MIN {
            break;
        }
        if show_signal {
            show_signal = false;
        } else if show_author {
            show_author = false;
        } else if show_ci {
            show_ci = false;
        } else {
            break;
        }
    }

    let fixed = fixed_width(pane, show_signal, show_author, show_ci);
    let leftover = width.saturating_sub(fixed).max(TITLE_MIN + REPO_MIN);
    let title_width = (leftover * 7 / 10).clamp(TITLE_MIN, TITLE_MAX);
    let repo_width = leftover
        .saturating_sub(title_width)
        .clamp(REPO_MIN, REPO_MAX);

    ColumnLayout {
        show_signal,
        show_author,
        show_ci,
        title_width,
        repo_width,
    }
}

fn fixed_width(pane: Pane, show_signal: bool, show_author: bool, show_ci: bool) -> u16 {
    let mut columns = vec![UPDATED_WIDTH];
    match pane {
        Pane::Priority => columns.push(PRIORITY_WIDTH),
        Pane::Orphaned => {
            columns.push(STALE_WIDTH);
            columns.push(COMMENTS_WIDTH);
        }
        _ => {}
    }
    columns.push(SIZE_WIDTH);
    if show_signal {
        columns.push(SIGNAL_WIDTH);
    }
    if show_author {
        columns.push(AUTHOR_WIDTH);
    }
    if show_ci {
        columns.push(CI_WIDTH);
    }
    // +2 for the flexible columns' own spacing.
    let total: u16 = columns.iter().sum();
    total + (columns.len() as u16 + 2) * COLUMN_SPACING
}
