use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use scrollstage_core::progress::ScrollDirection;
use scrollstage_core::sequence::SequencerState;
use scrollstage_core::{Clock, Placement, ThemeMode};

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render<C: Clock + Clone>(frame: &mut Frame, area: Rect, app: &App<C>) {
        let theme = &app.theme;

        let direction = match app.progress.direction() {
            ScrollDirection::Down => "↓",
            ScrollDirection::Up => "↑",
            ScrollDirection::None => "·",
        };
        let menu = match app.menu.state() {
            SequencerState::Running { .. } => "moving",
            SequencerState::Idle if app.menu_expanded => "open",
            SequencerState::Idle => "closed",
        };
        let placement = match app.menu.placement() {
            Placement::Docked => "docked",
            Placement::Floating => "floating",
        };
        let mode = match app.theme_mode {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        };

        let status_text = if let Some(msg) = &app.status_message {
            format!(" {}", msg)
        } else {
            format!(
                " {:>3.0}% {} | Menu: {} ({}) | Theme: {}",
                app.progress.display_progress() * 100.0,
                direction,
                menu,
                placement,
                mode
            )
        };

        let help_hint = " q:quit j/k:scroll space:menu h/l:select enter:open t:theme n:slide ";
        let padding_len = area
            .width
            .saturating_sub(status_text.chars().count() as u16 + help_hint.len() as u16)
            as usize;

        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(theme.fg).bg(theme.status_bg)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.status_bg)),
            Span::styled(help_hint, Style::default().fg(theme.muted).bg(theme.status_bg)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
