use std::io;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tracing::info;

use scrollstage_core::{AppConfig, Clock};
use scrollstage_tui::{
    app::App,
    event::{AppEvent, EventHandler},
    input::{handle_key_event, Action},
    widgets::{FanMenuWidget, PageWidget, ProgressRailWidget, StatusBarWidget},
};

/// Width of the progress rail column
const RAIL_WIDTH: u16 = 2;

pub async fn run(config: AppConfig) -> Result<()> {
    let tick_rate_ms = config.ui.tick_rate_ms;
    let mut app = App::with_config(config)?;
    let event_handler = EventHandler::new(tick_rate_ms);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetTitle("scrollstage"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("Interactive session started");
    let result = main_loop(&mut terminal, &mut app, &event_handler);

    // Restore terminal even if the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("Interactive session ended");
    result
}

fn main_loop<C: Clock + Clone>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<C>,
    event_handler: &EventHandler,
) -> Result<()> {
    let size = terminal.size()?;
    app.set_viewport(page_height(size.height));

    loop {
        app.frame();

        let view: &App<C> = app;
        terminal.draw(|frame| {
            let size = frame.area();

            // Main layout: content + status bar
            let main_layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(size);

            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(RAIL_WIDTH), Constraint::Min(1)])
                .split(main_layout[0]);

            ProgressRailWidget::render(frame, columns[0], view);
            PageWidget::render(frame, columns[1], view);
            FanMenuWidget::render(frame, columns[1], view);
            StatusBarWidget::render(frame, main_layout[1], view);
        })?;

        if let Some(event) = event_handler.next(app.needs_animation())? {
            match event {
                AppEvent::Key(key) => handle_action(app, handle_key_event(key)),
                AppEvent::Resize(_, h) => app.set_viewport(page_height(h)),
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Rows left for the page once the status bar is taken out
fn page_height(terminal_height: u16) -> u16 {
    terminal_height.saturating_sub(1)
}

fn handle_action<C: Clock + Clone>(app: &mut App<C>, action: Action) {
    let lines = app.config.ui.scroll_lines as i32;
    match action {
        Action::Quit => app.quit(),
        Action::ScrollDown => app.scroll_by(lines),
        Action::ScrollUp => app.scroll_by(-lines),
        Action::PageDown => app.scroll_by(app.page_rows()),
        Action::PageUp => app.scroll_by(-app.page_rows()),
        Action::JumpToTop => app.scroll_to_top(),
        Action::JumpToBottom => app.scroll_to_bottom(),
        Action::ToggleMenu => app.toggle_menu(),
        Action::NextStage => app.select_next_stage(),
        Action::PrevStage => app.select_prev_stage(),
        Action::ActivateStage => app.activate_selected(),
        Action::ToggleTheme => app.toggle_theme(),
        Action::NextSlide => app.next_slide(),
        Action::None => {}
    }
}
