use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::app::{App, UiAction};
use crate::ui;

/// Run the interactive loop until the user quits. All long operations have
/// already happened; the loop only draws, reads keys, and opens URLs.
pub fn run(mut app: App) -> Result<()> {
    // Restore the terminal even when a draw panics.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app);

    restore_terminal()?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(action) = app.on_key(key) {
                    perform(app, action);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn perform(app: &mut App, action: UiAction) {
    match action {
        UiAction::OpenUrl(url) => {
            if url.is_empty() {
                app.status = Some("item has no URL".to_string());
            } else if let Err(err) = open::that(&url) {
                app.status = Some(format!("could not open browser: {}", err));
            }
        }
    }
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;
    Ok(())
}
