use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use triage_core::config::{PanePrefs, UiPreferences};
use triage_core::item::PrioritizedItem;
use triage_core::resolved::ResolvedStore;
use triage_core::routing::{route, Pane};
use triage_core::snapshots::Snapshot;
use triage_core::stats::StatsReport;

use crate::sort::{columns_for, default_sort, sort_items, SortColumn};

/// Tab order in the header: the four list panes plus the stats dashboard.
pub const TAB_COUNT: usize = 5;
pub const STATS_TAB: usize = 4;
pub const PANE_ORDER: [Pane; 4] = [Pane::Priority, Pane::Assigned, Pane::Blocked, Pane::Orphaned];

/// Side effects the event loop must perform on behalf of the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    OpenUrl(String),
}

/// Independent cursor, sort column, and direction per list pane.
#[derive(Debug)]
pub struct PaneView {
    pub pane: Pane,
    pub items: Vec<PrioritizedItem>,
    pub cursor: usize,
    pub sort: SortColumn,
    pub descending: bool,
}

impl PaneView {
    fn new(pane: Pane, prefs: &UiPreferences) -> Self {
        let (mut sort, mut descending) = default_sort(pane);
        if let Some(saved) = prefs.panes.get(pane.title()) {
            if let Some(col) = SortColumn::parse(&saved.sort_column) {
                if columns_for(pane).contains(&col) {
                    sort = col;
                    descending = saved.sort_descending;
                }
            }
        }
        Self {
            pane,
            items: Vec::new(),
            cursor: 0,
            sort,
            descending,
        }
    }

    pub fn cursor_item(&self) -> Option<&PrioritizedItem> {
        self.items.get(self.cursor)
    }

    fn clamp_cursor(&mut self) {
        if self.items.is_empty() {
            self.cursor = 0;
        } else if self.cursor >= self.items.len() {
            self.cursor = self.items.len() - 1;
        }
    }

    /// Re-sort, keeping the cursor on the same underlying item when it is
    /// still present.
    fn resort(&mut self) {
        let anchor = self.cursor_item().map(|p| p.item.id.clone());
        sort_items(&mut self.items, self.sort, self.descending);
        if let Some(id) = anchor {
            if let Some(idx) = self.items.iter().position(|p| p.item.id == id) {
                self.cursor = idx;
                return;
            }
        }
        self.clamp_cursor();
    }
}

/// The whole interactive state. Key handling mutates this and optionally
/// returns a side effect for the event loop.
pub struct App {
    pub panes: [PaneView; 4],
    pub active_tab: usize,
    pub stats: StatsReport,
    pub snapshots: Vec<Snapshot>,
    pub stats_scroll: u16,
    pub resolved: ResolvedStore,
    pub prefs: UiPreferences,
    /// Non-fatal rate-limit banner, rendered until dismissed by quit.
    pub banner: Option<String>,
    /// Transient status line (e.g. a failed resolved-store save).
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        items: Vec<PrioritizedItem>,
        current_user: &str,
        blocked_labels: &[String],
        resolved: ResolvedStore,
        stats: StatsReport,
        snapshots: Vec<Snapshot>,
        prefs: UiPreferences,
        banner: Option<String>,
    ) -> Self {
        let mut panes = [
            PaneView::new(Pane::Priority, &prefs),
            PaneView::new(Pane::Assigned, &prefs),
            PaneView::new(Pane::Blocked, &prefs),
            PaneView::new(Pane::Orphaned, &prefs),
        ];
        for prioritized in items {
            let pane = route(&prioritized.item, current_user, blocked_labels);
            let idx = PANE_ORDER.iter().position(|p| *p == pane).unwrap_or(0);
            panes[idx].items.push(prioritized);
        }
        for view in &mut panes {
            sort_items(&mut view.items, view.sort, view.descending);
        }

        Self {
            panes,
            active_tab: 0,
            stats,
            snapshots,
            stats_scroll: 0,
            resolved,
            prefs,
            banner,
            status: None,
            should_quit: false,
        }
    }

    pub fn active_pane(&self) -> Option<&PaneView> {
        self.panes.get(self.active_tab)
    }

    fn active_pane_mut(&mut self) -> Option<&mut PaneView> {
        if self.active_tab == STATS_TAB {
            None
        } else {
            self.panes.get_mut(self.active_tab)
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Option<UiAction> {
        self.status = None;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                return None;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return None;
            }
            KeyCode::Tab => {
                self.active_tab = (self.active_tab + 1) % TAB_COUNT;
                return None;
            }
            KeyCode::Char(c @ '1'..='5') => {
                self.active_tab = (c as usize) - ('1' as usize);
                return None;
            }
            _ => {}
        }

        if self.active_tab == STATS_TAB {
            self.on_stats_key(key);
            return None;
        }
        self.on_list_key(key)
    }

    fn on_stats_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.stats_scroll = self.stats_scroll.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.stats_scroll = self.stats_scroll.saturating_sub(1);
            }
            KeyCode::Char('g') => self.stats_scroll = 0,
            KeyCode::Char('G') => self.stats_scroll = u16::MAX,
            _ => {}
        }
    }

    fn on_list_key(&mut self, key: KeyEvent) -> Option<UiAction> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if let Some(view) = self.active_pane_mut() {
                    if !view.items.is_empty() && view.cursor < view.items.len() - 1 {
                        view.cursor += 1;
                    }
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if let Some(view) = self.active_pane_mut() {
                    view.cursor = view.cursor.saturating_sub(1);
                }
            }
            KeyCode::Char('g') => {
                if let Some(view) = self.active_pane_mut() {
                    view.cursor = 0;
                }
            }
            KeyCode::Char('G') => {
                if let Some(view) = self.active_pane_mut() {
                    view.cursor = view.items.len().saturating_sub(1);
                }
            }
            KeyCode::Char('s') => {
                if let Some(view) = self.active_pane_mut() {
                    let columns = columns_for(view.pane);
                    let at = columns.iter().position(|c| *c == view.sort).unwrap_or(0);
                    view.sort = columns[(at + 1) % columns.len()];
                    view.resort();
                }
                self.save_prefs();
            }
            KeyCode::Char('S') => {
                if let Some(view) = self.active_pane_mut() {
                    view.descending = !view.descending;
                    view.resort();
                }
                self.save_prefs();
            }
            KeyCode::Char('r') => {
                if let Some(view) = self.active_pane_mut() {
                    let (sort, descending) = default_sort(view.pane);
                    view.sort = sort;
                    view.descending = descending;
                    view.resort();
                }
                self.save_prefs();
            }
            KeyCode::Char('d') => self.resolve_current(),
            KeyCode::Enter => {
                return self
                    .active_pane()
                    .and_then(PaneView::cursor_item)
                    .map(|p| UiAction::OpenUrl(p.item.subject.url.clone()));
            }
            _ => {}
        }
        None
    }

    /// Mark the highlighted item resolved: persist `(id, updated_at)` and
    /// drop it from the visible list immediately.
    fn resolve_current(&mut self) {
        let Some(view) = self.active_pane_mut() else {
            return;
        };
        if view.items.is_empty() {
            return;
        }
        let removed = view.items.remove(view.cursor);
        view.clamp_cursor();
        self.resolved
            .resolve(removed.item.id.clone(), removed.item.updated_at);
        if let Err(err) = self.resolved.save() {
            // In-memory state stays authoritative for the run.
            self.status = Some(format!("resolved (save failed: {})", err));
        } else {
            self.status = Some(format!("resolved {}", removed.item.subject.title));
        }
    }

    fn save_prefs(&mut self) {
        for view in &self.panes {
            self.prefs.panes.insert(
                view.pane.title().to_string(),
                PanePrefs {
                    sort_column: view.sort.label().to_string(),
                    sort_descending: view.descending,
                },
            );
        }
        if let Err(err) = self.prefs.save() {
            tracing::debug!(%err, "ui preference save failed");
        }
    }
}
