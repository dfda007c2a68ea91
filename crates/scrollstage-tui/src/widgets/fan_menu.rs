use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use scrollstage_core::progress::ScrollDirection;
use scrollstage_core::Clock;

use crate::app::App;

/// Width of each stage chip, border included
const CHIP_WIDTH: u16 = 13;
const CHIP_HEIGHT: u16 = 3;
const BUTTON_WIDTH: u16 = 7;

pub struct FanMenuWidget;

impl FanMenuWidget {
    /// Floating control in the top-right corner of `area`; stages fan out to
    /// its left as their flags turn on
    pub fn render<C: Clock + Clone>(frame: &mut Frame, area: Rect, app: &App<C>) {
        if area.width < BUTTON_WIDTH + 2 || area.height < CHIP_HEIGHT + 1 {
            return;
        }
        let theme = &app.theme;

        let drop = app.menu_offset_rows().max(0) as u16;
        let wobble = match app.inertia.wobble() {
            Some(ScrollDirection::Down) => 1,
            _ => 0,
        };
        let y = area.y + (drop + wobble).min(area.height - CHIP_HEIGHT);

        let button = Rect::new(
            area.x + area.width - BUTTON_WIDTH - 1,
            y,
            BUTTON_WIDTH,
            CHIP_HEIGHT,
        );
        let button_style = if app.menu_expanded {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.fg)
        };
        let glyph = if app.menu_expanded { "×" } else { "≡" };
        frame.render_widget(Clear, button);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(glyph, button_style)).centered()).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.accent))
                    .style(Style::default().bg(theme.surface)),
            ),
            button,
        );

        if !app.menu.container().visible {
            return;
        }

        // Stage 0 sits next to the button, later stages further left
        for index in 0..app.stage_count() {
            if !app.menu.is_visible(index) {
                continue;
            }
            let offset = (index as u16 + 1) * (CHIP_WIDTH + 1);
            if offset > button.x.saturating_sub(area.x) {
                break;
            }
            let chip = Rect::new(button.x - offset, y, CHIP_WIDTH, CHIP_HEIGHT);

            let selected = index == app.selected_stage;
            let border = if selected { theme.accent } else { theme.border };
            let label_style = if selected {
                Style::default().fg(theme.fg).bg(theme.selection)
            } else {
                Style::default().fg(theme.fg)
            };

            frame.render_widget(Clear, chip);
            frame.render_widget(
                Paragraph::new(
                    Line::from(Span::styled(app.stage_label(index), label_style)).centered(),
                )
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(border))
                        .style(Style::default().bg(theme.surface)),
                ),
                chip,
            );
        }
    }
}
