use crate::app::App;
use crate::util::{sanitize_line, truncate_to_width};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Render the related-topic picker overlay in `area`.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 20 || area.height < 6 {
        return;
    }
    f.render_widget(Clear, area);

    let picker = &app.picker;
    let settings = &picker.settings;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(format!(
            " Related topics ({} selected) ",
            picker.selected().len()
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    let search = if settings.allow_search_filter {
        format!("Search: {}_", picker.search)
    } else {
        "Search disabled".to_string()
    };
    f.render_widget(
        Paragraph::new(search).style(Style::default().fg(Color::Gray)),
        chunks[0],
    );

    let width = (inner.width as usize).saturating_sub(6);
    let visible = picker.visible(&app.library);
    let items: Vec<ListItem> = if visible.is_empty() {
        vec![ListItem::new("No matching topics")]
    } else {
        visible
            .iter()
            .map(|topic| {
                let mark = if picker.is_selected(&topic.topic) {
                    "[x] "
                } else {
                    "[ ] "
                };
                let name = truncate_to_width(&sanitize_line(&topic.topic), width).into_owned();
                ListItem::new(Line::from(format!("{}{}", mark, name)))
            })
            .collect()
    };

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !visible.is_empty() {
        state.select(Some(picker.cursor.min(visible.len() - 1)));
    }
    f.render_stateful_widget(list, chunks[1], &mut state);

    let footer = format!(
        "[Ctrl+A] {}  [Ctrl+U] {}",
        settings.select_all_text, settings.unselect_all_text
    );
    f.render_widget(
        Paragraph::new(footer).style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );
}
