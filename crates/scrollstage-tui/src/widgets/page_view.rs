use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use scrollstage_core::Clock;

use crate::app::App;
use crate::page::{RowKind, SECTIONS};

pub struct PageWidget;

impl PageWidget {
    pub fn render<C: Clock + Clone>(frame: &mut Frame, area: Rect, app: &App<C>) {
        let theme = &app.theme;

        let block = Block::default()
            .borders(Borders::LEFT)
            .border_style(Style::default().fg(theme.border))
            .style(Style::default().bg(theme.bg));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines: Vec<Line> = app
            .page
            .rows()
            .iter()
            .skip(app.scroll as usize)
            .take(inner.height as usize)
            .map(|row| {
                let highlighted = app
                    .sections
                    .get(row.section)
                    .is_some_and(|s| s.is_active());
                match row.kind {
                    RowKind::Title => {
                        let (dot, dot_style) = if highlighted {
                            ("● ", Style::default().fg(theme.accent))
                        } else {
                            ("○ ", Style::default().fg(theme.muted))
                        };
                        Line::from(vec![
                            Span::styled(dot, dot_style),
                            Span::styled(
                                SECTIONS[row.section].title,
                                Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
                            ),
                        ])
                    }
                    RowKind::Body(text) => {
                        let style = if highlighted {
                            Style::default().fg(theme.fg)
                        } else {
                            Style::default().fg(theme.muted)
                        };
                        Line::from(Span::styled(format!("  {}", text), style))
                    }
                    RowKind::Slide => {
                        let caption = app.gallery_caption().unwrap_or_default();
                        let style = if app.gallery.is_transitioning(app.now()) {
                            Style::default().fg(theme.glow).add_modifier(Modifier::ITALIC)
                        } else {
                            Style::default().fg(theme.fg).add_modifier(Modifier::ITALIC)
                        };
                        Line::from(Span::styled(format!("  [ {} ]", caption), style))
                    }
                    RowKind::SlideDots => {
                        let mut spans = vec![Span::raw("  ")];
                        for slide in 0..app.gallery.len() {
                            if slide == app.gallery.current() {
                                spans.push(Span::styled("━━ ", Style::default().fg(theme.accent)));
                            } else {
                                spans.push(Span::styled("• ", Style::default().fg(theme.muted)));
                            }
                        }
                        Line::from(spans)
                    }
                    RowKind::Blank => Line::default(),
                }
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }
}
