use crate::app::{App, ViewMode};
use crate::toast::ToastKind;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar: toast first, then status hint, then key help.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    if let Some(toast) = app.toaster.current() {
        let bg = match toast.kind {
            ToastKind::Success => Color::Green,
            ToastKind::Danger => Color::Red,
        };
        let style = Style::default()
            .bg(bg)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD);
        f.render_widget(Paragraph::new(toast.message.as_ref()).style(style), area);
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if app.picker.open {
        Cow::Borrowed("Type to search | [Enter]toggle [Ctrl+A]select all [Ctrl+U]unselect all [Esc]done")
    } else {
        match app.view {
            ViewMode::List => {
                Cow::Borrowed("[a]dd [e]dit [d]elete [r]efresh [j/k]move [q]uit")
            }
            ViewMode::Add | ViewMode::Edit { .. } => Cow::Borrowed(
                "[Tab]next [Ctrl+S]save [Ctrl+N]video [Ctrl+P]podcast [Ctrl+D]remove [Esc]cancel",
            ),
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}
