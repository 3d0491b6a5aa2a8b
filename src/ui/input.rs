//! Input handling for the TUI.
//!
//! Overlays capture keys first (delete confirmation, then the picker), then
//! the active view gets them.

use crate::app::{App, AppEvent, AttachmentTarget, DeleteConfirm, ViewMode};
use crate::form::FormField;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::Action;

/// Longest search text the picker accepts.
const MAX_SEARCH_LENGTH: usize = 128;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if matches!(app.delete_confirm, DeleteConfirm::Confirming { .. }) {
        handle_confirm_input(app, code, event_tx);
        return Action::Continue;
    }

    if app.picker.open {
        handle_picker_input(app, code, modifiers);
        return Action::Continue;
    }

    match app.view {
        ViewMode::List => handle_list_input(app, code, event_tx),
        ViewMode::Add | ViewMode::Edit { .. } => {
            handle_form_input(app, code, modifiers, event_tx);
            Action::Continue
        }
    }
}

fn handle_confirm_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if app.confirm_delete(event_tx) {
                app.set_status("Deleting...");
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
        _ => {}
    }
}

fn handle_list_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Char('a') => app.add_details(event_tx),
        KeyCode::Char('e') | KeyCode::Enter => match app.selected_topic().cloned() {
            Some(topic) => app.edit(topic, event_tx),
            None => app.set_status("No topic selected"),
        },
        KeyCode::Char('d') | KeyCode::Delete => match app.selected_topic().map(|t| t.id) {
            Some(id) => app.delete_request(id),
            None => app.set_status("No topic selected"),
        },
        KeyCode::Char('r') => {
            app.refresh_topics(event_tx);
            app.set_status("Refreshing...");
        }
        _ => {}
    }
    Action::Continue
}

fn handle_picker_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    let visible: Vec<String> = app
        .picker
        .visible(&app.library)
        .iter()
        .map(|t| t.topic.clone())
        .collect();

    if modifiers.contains(KeyModifiers::CONTROL) {
        match code {
            KeyCode::Char('a') => app
                .picker
                .select_all(app.library.iter().map(|t| t.topic.as_str())),
            KeyCode::Char('u') => app.picker.deselect_all(),
            _ => {}
        }
        return;
    }

    match code {
        KeyCode::Esc | KeyCode::Tab => app.picker.close(),
        KeyCode::Down => app.picker.move_cursor(1, visible.len()),
        KeyCode::Up => app.picker.move_cursor(-1, visible.len()),
        KeyCode::Enter => {
            if let Some(name) = visible.get(app.picker.cursor) {
                app.picker.toggle(name);
            }
        }
        KeyCode::Backspace => {
            app.picker.search.pop();
            app.picker.cursor = 0;
        }
        KeyCode::Char(c) if app.picker.settings.allow_search_filter => {
            if app.picker.search.chars().count() < MAX_SEARCH_LENGTH {
                app.picker.search.push(c);
                app.picker.cursor = 0;
            }
        }
        _ => {}
    }
}

fn handle_form_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let field = app.focused_field();

    // The edited topic lands on the draft when its fetch completes.
    if app.pending_edit().is_some() {
        if code == KeyCode::Esc {
            app.back_to_library();
        } else {
            app.set_status("Loading topic...");
        }
        return;
    }

    if modifiers.contains(KeyModifiers::CONTROL) {
        match code {
            KeyCode::Char('s') => {
                if app.submit(event_tx) {
                    app.set_status("Saving...");
                }
            }
            KeyCode::Char('n') => app.draft.add_video(),
            KeyCode::Char('p') => app.draft.add_podcast(),
            KeyCode::Char('d') => remove_focused_row(app, field),
            _ => {}
        }
        return;
    }

    match code {
        KeyCode::Esc => app.back_to_library(),
        KeyCode::Tab | KeyCode::Down => app.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.focus_prev(),
        KeyCode::Enter => match field {
            FormField::Important => app.draft.important = !app.draft.important,
            FormField::TagInput => {
                app.draft.add_tag();
            }
            FormField::Tag(i) => {
                app.draft.remove_tag(i);
                app.clamp_focus();
            }
            FormField::Related => app.picker.open(),
            FormField::PodcastFile(row) => {
                app.load_attachment(AttachmentTarget::Podcast { row }, event_tx)
            }
            FormField::Document => app.load_attachment(AttachmentTarget::Document, event_tx),
            _ => app.focus_next(),
        },
        KeyCode::Char(' ') if field == FormField::Important => {
            app.draft.important = !app.draft.important;
        }
        KeyCode::Char('x') | KeyCode::Delete if matches!(field, FormField::Tag(_)) => {
            remove_focused_row(app, field);
        }
        KeyCode::Backspace => {
            if let Some(text) = app.draft.text_mut(field) {
                text.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(text) = app.draft.text_mut(field) {
                text.push(c);
            }
        }
        _ => {}
    }
}

/// Remove the tag, video row or podcast row under the cursor.
fn remove_focused_row(app: &mut App, field: FormField) {
    if let FormField::Tag(i) = field {
        app.draft.remove_tag(i);
    } else if let Some(row) = field.video_row() {
        app.draft.remove_video(row);
    } else if let Some(row) = field.podcast_row() {
        app.draft.remove_podcast(row);
    } else {
        app.set_status("Move to a tag, video or podcast to remove it");
        return;
    }
    app.clamp_focus();
}
