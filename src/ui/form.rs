use crate::app::{App, ViewMode};
use crate::form::{AttachedFile, FormField};
use crate::util::{sanitize_line, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Column where field values start.
const LABEL_WIDTH: usize = 20;

/// Render the add/edit form.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let title = form_title(app);

    let value_width = (area.width as usize).saturating_sub(2 + LABEL_WIDTH + 2);
    let (lines, focused_line) = form_lines(app, value_width);

    // Keep the focused line inside the viewport.
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = focused_line.saturating_sub(visible.saturating_sub(2));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title),
        )
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));

    f.render_widget(paragraph, area);
}

fn form_title(app: &App) -> String {
    let title = match app.view {
        ViewMode::Edit { id } => format!(" Edit topic #{} ", id),
        _ => " New topic ".to_string(),
    };
    if app.pending_edit().is_some() {
        format!("{}- loading... ", title)
    } else if app.is_submitting() {
        format!("{}- saving... ", title)
    } else {
        title
    }
}

/// Build every line of the form and the index of the focused one.
fn form_lines(app: &App, value_width: usize) -> (Vec<Line<'static>>, usize) {
    let draft = &app.draft;
    let focused = app.focused_field();
    let mut lines = Vec::new();
    let mut focused_line = 0;

    for field in draft.fields() {
        if field == FormField::Document && draft.podcast_details.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from("Podcasts: none (Ctrl+P to add)"));
            if !draft.podcast_files.is_empty() {
                lines.push(pending_line("Pending files", &draft.podcast_files));
            }
        }

        if let Some(header) = section_header(field) {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                header,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )));
        }

        if field == focused {
            focused_line = lines.len();
        }

        let value = field_value(app, field);
        lines.push(field_line(field, value, value_width, field == focused));

        match field {
            // Empty sections still get a line so they can be found.
            FormField::Related if draft.video_details.is_empty() => {
                lines.push(Line::from(""));
                lines.push(Line::from("Videos: none (Ctrl+N to add)"));
            }
            FormField::PodcastFile(row) if row + 1 == draft.podcast_details.len() => {
                lines.push(pending_line("Pending files", &draft.podcast_files));
            }
            FormField::Document => {
                if let Some(doc) = &draft.document {
                    lines.push(pending_line("Attached", std::slice::from_ref(doc)));
                }
            }
            _ => {}
        }
    }

    (lines, focused_line)
}

fn section_header(field: FormField) -> Option<String> {
    match field {
        FormField::TagInput => Some("Tags".to_string()),
        FormField::Related => Some("Related".to_string()),
        FormField::VideoName(i) => Some(format!("Video {}", i + 1)),
        FormField::PodcastName(i) => Some(format!("Podcast {}", i + 1)),
        FormField::Document => Some("Document".to_string()),
        _ => None,
    }
}

fn field_value(app: &App, field: FormField) -> String {
    match field {
        FormField::Important => {
            let mark = if app.draft.important { "[x]" } else { "[ ]" };
            mark.to_string()
        }
        FormField::Tag(i) => app
            .draft
            .tags
            .get(i)
            .map(|t| format!("#{}  (x to remove)", t))
            .unwrap_or_default(),
        FormField::Related => {
            let (shown, hidden) = app.picker.chips();
            let mut names: Vec<&str> = shown.iter().map(|s| s.topic.as_str()).collect();
            let more = format!("+{} more", hidden);
            if hidden > 0 {
                names.push(&more);
            }
            if names.is_empty() {
                "(none, Enter to pick)".to_string()
            } else {
                names.join(", ")
            }
        }
        other => app.draft.text(other).unwrap_or_default().to_string(),
    }
}

fn field_line(field: FormField, value: String, width: usize, focused: bool) -> Line<'static> {
    let label = format!("{:<w$}", field.label(), w = LABEL_WIDTH);
    let mut value = truncate_to_width(&sanitize_line(&value), width).into_owned();
    if focused && field.is_text() {
        value.push('_');
    }

    let (label_style, value_style) = if focused {
        (
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            Style::default().bg(Color::DarkGray).fg(Color::White),
        )
    } else {
        (Style::default().fg(Color::Gray), Style::default())
    };

    Line::from(vec![
        Span::styled(if focused { "> " } else { "  " }, label_style),
        Span::styled(label, label_style),
        Span::styled(value, value_style),
    ])
}

fn pending_line(label: &str, files: &[AttachedFile]) -> Line<'static> {
    let names = if files.is_empty() {
        "none".to_string()
    } else {
        files
            .iter()
            .map(|f| format!("{} ({} KB)", f.file_name, f.size().div_ceil(1024)))
            .collect::<Vec<_>>()
            .join(", ")
    };
    Line::from(Span::styled(
        format!("  {:<w$}{}", label, names, w = LABEL_WIDTH),
        Style::default().fg(Color::Green),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TopicClient;
    use crate::config::Config;
    use std::time::Duration;

    fn test_app() -> App {
        let client =
            TopicClient::new("http://127.0.0.1:9", None, Duration::from_secs(1)).unwrap();
        App::new(client, &Config::default())
    }

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[tokio::test]
    async fn test_focused_line_tracks_focus() {
        let mut app = test_app();
        app.view = ViewMode::Add;
        app.draft.topic = "Generics".into();
        let (lines, idx) = form_lines(&app, 40);
        assert!(plain(&lines[idx]).contains("Generics_"));

        app.focus = app.draft.fields().len() - 1;
        let (lines, idx) = form_lines(&app, 40);
        assert!(plain(&lines[idx]).contains("Document"));
    }

    #[tokio::test]
    async fn test_title_shows_loading_until_edit_arrives() {
        let (tx, _rx) = tokio::sync::mpsc::channel(8);
        let mut app = test_app();
        let topic: crate::api::Topic =
            serde_json::from_value(serde_json::json!({ "id": 9, "topic": "Slices" })).unwrap();
        app.edit(topic, &tx);
        assert_eq!(form_title(&app), " Edit topic #9 - loading... ");

        app.handle_event(
            crate::app::AppEvent::TopicsLoaded {
                generation: app.list_generation(),
                result: Err("HTTP 502".into()),
            },
            &tx,
        );
        assert_eq!(form_title(&app), " Edit topic #9 ");
    }

    #[tokio::test]
    async fn test_related_chips_collapse() {
        let mut app = test_app();
        app.picker.settings.items_show_limit = 1;
        app.picker.select("A");
        app.picker.select("B");
        app.picker.select("C");
        assert_eq!(field_value(&app, FormField::Related), "A, +2 more");
    }

    #[tokio::test]
    async fn test_empty_sections_are_labelled() {
        let mut app = test_app();
        app.draft.remove_video(0);
        app.draft.remove_podcast(0);
        let (lines, _) = form_lines(&app, 40);
        let text: Vec<String> = lines.iter().map(plain).collect();
        assert!(text.iter().any(|l| l.starts_with("Videos: none")));
        assert!(text.iter().any(|l| l.starts_with("Podcasts: none")));
    }
}
