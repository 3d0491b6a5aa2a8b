use crate::api::Topic;
use crate::app::App;
use crate::util::{display_width, sanitize_line, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Width reserved for the created-date column.
const DATE_WIDTH: usize = 10;

/// Render the topic list
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    // Borders, highlight marker and column gaps.
    let inner_width = (area.width as usize).saturating_sub(2 + 2);

    let items: Vec<ListItem> = if app.library.is_empty() {
        let msg = if app.loading {
            "Loading topics..."
        } else {
            "No topics yet. Press [a] to add one."
        };
        vec![ListItem::new(msg)]
    } else {
        app.library
            .iter()
            .map(|topic| ListItem::new(topic_line(topic, inner_width)))
            .collect()
    };

    let title = if app.loading {
        format!(" Library ({}) - loading... ", app.library.len())
    } else {
        format!(" Library ({}) ", app.library.len())
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !app.library.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}

/// One row: importance marker, name, tags, created date right-aligned.
fn topic_line(topic: &Topic, width: usize) -> Line<'static> {
    let marker = if topic.important { "* " } else { "  " };
    let date = topic
        .created_at
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let text_width = width.saturating_sub(marker.len() + DATE_WIDTH + 1);
    let name = sanitize_line(&topic.topic);
    let tags = if topic.tags.is_empty() {
        String::new()
    } else {
        format!("  [{}]", sanitize_line(&topic.tags.join(", ")))
    };
    let body = truncate_to_width(&format!("{}{}", name, tags), text_width).into_owned();
    let pad = text_width.saturating_sub(display_width(&body)) + 1;

    let name_style = if topic.important {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Yellow)),
        Span::styled(body, name_style),
        Span::raw(" ".repeat(pad)),
        Span::styled(date, Style::default().fg(Color::DarkGray)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(json: serde_json::Value) -> Topic {
        serde_json::from_value(json).unwrap()
    }

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_topic_line_layout() {
        let t = topic(serde_json::json!({
            "id": 1,
            "topic": "Pattern matching",
            "tags": ["syntax"],
            "important": 1,
            "createdAt": "2024-03-05T10:00:00Z"
        }));
        let text = plain(&topic_line(&t, 50));
        assert!(text.starts_with("* Pattern matching  [syntax]"));
        assert!(text.ends_with("2024-03-05"));
        assert_eq!(display_width(&text), 50);
    }

    #[test]
    fn test_topic_line_truncates_long_names() {
        let t = topic(serde_json::json!({ "id": 2, "topic": "x".repeat(200) }));
        let text = plain(&topic_line(&t, 40));
        assert!(text.contains("..."));
        assert!(display_width(&text) <= 40);
    }
}
