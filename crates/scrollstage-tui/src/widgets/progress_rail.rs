use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use scrollstage_core::Clock;

use crate::app::App;

pub struct ProgressRailWidget;

impl ProgressRailWidget {
    /// Vertical rail: a diamond at each end, filled top-down by displayed progress
    pub fn render<C: Clock + Clone>(frame: &mut Frame, area: Rect, app: &App<C>) {
        if area.height < 3 || area.width == 0 {
            return;
        }

        let theme = &app.theme;
        let accent = if app.theme_transitioning() {
            theme.glow
        } else {
            theme.accent
        };

        let diamond = |lit: bool| {
            if lit {
                Span::styled("◆", Style::default().fg(accent).add_modifier(Modifier::BOLD))
            } else {
                Span::styled("◇", Style::default().fg(theme.track))
            }
        };

        let track_rows = area.height.saturating_sub(2) as usize;
        let filled = (app.progress.display_progress() * track_rows as f64).round() as usize;

        let mut lines = Vec::with_capacity(area.height as usize);
        lines.push(Line::from(diamond(app.progress.marker_active("top"))));
        for row in 0..track_rows {
            let span = if row < filled {
                Span::styled("┃", Style::default().fg(accent))
            } else {
                Span::styled("│", Style::default().fg(theme.track))
            };
            lines.push(Line::from(span));
        }
        lines.push(Line::from(diamond(app.progress.marker_active("bottom"))));

        let paragraph = Paragraph::new(lines).style(Style::default().bg(theme.bg));
        frame.render_widget(paragraph, area);
    }
}
