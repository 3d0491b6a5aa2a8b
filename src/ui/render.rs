//! View dispatch and overlays.

use crate::app::{App, ViewMode};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{form, list, picker, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 12;

pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    match app.view {
        ViewMode::List => list::render(f, app, chunks[0]),
        ViewMode::Add | ViewMode::Edit { .. } => form::render(f, app, chunks[0]),
    }
    status::render(f, app, chunks[1]);

    if app.picker.open {
        picker::render(f, app, centered(area, 60, area.height.saturating_sub(4)));
    }

    if let Some(prompt) = app.delete_prompt() {
        render_confirm_overlay(f, prompt);
    }
}

/// A `width` x `height` rect centered in `area`, shrunk to fit.
pub(super) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_confirm_overlay(f: &mut Frame, prompt: &str) {
    let overlay = centered(f.area(), 44, 5);
    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let text = format!("{}\n\n(y) Confirm  (n/Esc) Cancel", prompt);
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Delete "),
        )
        .alignment(Alignment::Center);

    f.render_widget(paragraph, overlay);
}
