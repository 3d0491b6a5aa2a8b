use crate::api::{ApiReply, Topic, TopicClient};
use crate::config::Config;
use crate::form::{load_selection, AttachedFile, Draft, FormField};
use crate::picker::RelationPicker;
use crate::task::spawn_event;
use crate::toast::{ToastKind, Toaster};
use std::borrow::Cow;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Prompt shown while a delete awaits confirmation.
pub const DELETE_PROMPT: &str = "Are you sure you want to delete?";

// ============================================================================
// View and Overlay State
// ============================================================================

/// Which screen is active. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    List,
    Add,
    Edit { id: i64 },
}

/// Two-step delete confirmation, orthogonal to [`ViewMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteConfirm {
    Idle,
    Confirming { id: i64 },
}

/// Where a file selection typed into the form should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentTarget {
    Document,
    Podcast { row: usize },
}

// ============================================================================
// Events
// ============================================================================

/// Results delivered from background tasks to the UI task.
#[derive(Debug)]
pub enum AppEvent {
    /// Topic list fetch finished.
    ///
    /// `generation` is the list generation when the fetch was spawned; older
    /// results are dropped.
    TopicsLoaded {
        generation: u64,
        result: Result<Vec<Topic>, String>,
    },
    /// Create/update finished.
    ///
    /// `session` is the form session that submitted; a reply for a form the
    /// user has since left must not touch the current one.
    SubmitFinished {
        id: Option<i64>,
        session: u64,
        result: Result<ApiReply, String>,
    },
    DeleteFinished {
        id: i64,
        result: Result<ApiReply, String>,
    },
    AttachmentsLoaded {
        target: AttachmentTarget,
        result: Result<Vec<AttachedFile>, String>,
    },
    ToastExpired {
        generation: u64,
    },
    /// A background task panicked.
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

// ============================================================================
// Application State
// ============================================================================

/// The topic form controller: every piece of UI state and every command.
///
/// Commands return immediately. Backend work runs on spawned tasks whose
/// results come back through [`App::handle_event`].
pub struct App {
    client: TopicClient,

    /// Topics from the last successful fetch.
    pub library: Vec<Topic>,
    /// Selected row in the list view.
    pub selected: usize,
    pub view: ViewMode,
    pub draft: Draft,
    pub picker: RelationPicker,
    pub delete_confirm: DeleteConfirm,
    pub toaster: Toaster,
    /// Index into `draft.fields()`.
    pub focus: usize,
    /// True while a list fetch is in flight.
    pub loading: bool,

    /// Status bar hint (auto-expires after 3 seconds).
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    /// Set whenever state changes; cleared after a frame is drawn.
    pub needs_redraw: bool,

    /// Topic whose values are patched onto the draft once the list reloads.
    pending_edit: Option<Topic>,
    /// Bumped whenever a form is opened or cleared.
    form_session: u64,
    list_generation: u64,
    list_handle: Option<JoinHandle<()>>,
    /// `Some` while a create/update is in flight.
    submit_handle: Option<JoinHandle<()>>,
    delete_handle: Option<JoinHandle<()>>,
    attachment_handle: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(client: TopicClient, config: &Config) -> Self {
        Self {
            client,
            library: Vec::new(),
            selected: 0,
            view: ViewMode::List,
            draft: Draft::seeded(),
            picker: RelationPicker::new(config.picker_settings()),
            delete_confirm: DeleteConfirm::Idle,
            toaster: Toaster::new(config.toast_duration()),
            focus: 0,
            loading: false,
            status_message: None,
            needs_redraw: true,
            pending_edit: None,
            form_session: 0,
            list_generation: 0,
            list_handle: None,
            submit_handle: None,
            delete_handle: None,
            attachment_handle: None,
        }
    }

    pub fn list_generation(&self) -> u64 {
        self.list_generation
    }

    pub fn is_submitting(&self) -> bool {
        self.submit_handle.is_some()
    }

    pub fn pending_edit(&self) -> Option<&Topic> {
        self.pending_edit.as_ref()
    }

    pub fn form_session(&self) -> u64 {
        self.form_session
    }

    // ========================================================================
    // Lifecycle Commands
    // ========================================================================

    /// Seed an empty draft and load the topic list.
    pub fn initialize(&mut self, tx: &mpsc::Sender<AppEvent>) {
        self.draft.reset();
        tracing::info!(base_url = %self.client.base_url(), "Initializing topic library");
        self.refresh_topics(tx);
    }

    /// Re-fetch the topic list, superseding any fetch in flight.
    pub fn refresh_topics(&mut self, tx: &mpsc::Sender<AppEvent>) {
        if let Some(handle) = self.list_handle.take() {
            handle.abort();
            tracing::debug!("Aborted previous topic fetch");
        }
        self.list_generation = self.list_generation.wrapping_add(1);
        let generation = self.list_generation;
        self.loading = true;

        let client = self.client.clone();
        tracing::debug!(generation, "Spawning topic fetch");
        self.list_handle = Some(spawn_event("fetch_topics", tx, async move {
            let result = client.fetch_topics().await.map_err(|e| e.to_string());
            AppEvent::TopicsLoaded { generation, result }
        }));
    }

    pub fn add_details(&mut self, tx: &mpsc::Sender<AppEvent>) {
        self.view = ViewMode::Add;
        self.focus = 0;
        self.form_session = self.form_session.wrapping_add(1);
        self.refresh_topics(tx);
    }

    /// Cancel the form: back to the list with a fresh draft.
    pub fn back_to_library(&mut self) {
        self.view = ViewMode::List;
        self.clear_form();
    }

    fn clear_form(&mut self) {
        self.draft.reset();
        self.picker.reset();
        self.pending_edit = None;
        self.focus = 0;
        self.form_session = self.form_session.wrapping_add(1);
    }

    /// Open `topic` for editing. Its values land on the draft once the list
    /// fetch started here completes.
    pub fn edit(&mut self, topic: Topic, tx: &mpsc::Sender<AppEvent>) {
        tracing::debug!(id = topic.id, "Editing topic");
        self.view = ViewMode::Edit { id: topic.id };
        self.focus = 0;
        self.form_session = self.form_session.wrapping_add(1);
        self.pending_edit = Some(topic);
        self.refresh_topics(tx);
    }

    /// Validate and send the draft. Returns whether a request was spawned.
    pub fn submit(&mut self, tx: &mpsc::Sender<AppEvent>) -> bool {
        let id = match self.view {
            ViewMode::List => return false,
            ViewMode::Add => None,
            ViewMode::Edit { id } => Some(id),
        };

        if self.is_submitting() {
            tracing::debug!("Submit ignored, previous submission in flight");
            self.toaster.show(
                ToastKind::Danger,
                "A submission is already in progress",
                tx,
            );
            return false;
        }

        if let Err(e) = self.draft.validate() {
            tracing::warn!(error = %e, "Form is invalid, not submitting");
            self.set_status(e.to_string());
            return false;
        }

        let payload = self.draft.to_payload(self.picker.selected_names());
        let client = self.client.clone();
        let session = self.form_session;
        tracing::debug!(?id, session, topic = %payload.topic, "Spawning submit");
        self.submit_handle = Some(spawn_event("submit", tx, async move {
            let result = client
                .create_or_update_topic(payload, id)
                .await
                .map_err(|e| e.to_string());
            AppEvent::SubmitFinished {
                id,
                session,
                result,
            }
        }));
        true
    }

    // ========================================================================
    // Delete Confirmation
    // ========================================================================

    /// Ask for confirmation before deleting `id`. Makes no call.
    pub fn delete_request(&mut self, id: i64) {
        self.delete_confirm = DeleteConfirm::Confirming { id };
    }

    pub fn delete_prompt(&self) -> Option<&'static str> {
        matches!(self.delete_confirm, DeleteConfirm::Confirming { .. }).then_some(DELETE_PROMPT)
    }

    /// Delete the pending topic. Returns whether a call was made.
    pub fn confirm_delete(&mut self, tx: &mpsc::Sender<AppEvent>) -> bool {
        let DeleteConfirm::Confirming { id } = self.delete_confirm else {
            return false;
        };
        self.delete_confirm = DeleteConfirm::Idle;

        let client = self.client.clone();
        tracing::debug!(id, "Spawning delete");
        self.delete_handle = Some(spawn_event("delete", tx, async move {
            let result = client.delete_topic(id).await.map_err(|e| e.to_string());
            AppEvent::DeleteFinished { id, result }
        }));
        true
    }

    pub fn cancel_delete(&mut self) {
        self.delete_confirm = DeleteConfirm::Idle;
    }

    // ========================================================================
    // Attachments
    // ========================================================================

    /// Load the path(s) typed for `target` from disk in the background.
    pub fn load_attachment(&mut self, target: AttachmentTarget, tx: &mpsc::Sender<AppEvent>) {
        let input = match target {
            AttachmentTarget::Document => self.draft.document_path.clone(),
            AttachmentTarget::Podcast { row } => self.draft.podcast_path(row).to_string(),
        };
        if input.trim().is_empty() {
            self.set_status("Type a file path first");
            return;
        }
        if let Some(handle) = self.attachment_handle.take() {
            handle.abort();
        }
        self.attachment_handle = Some(spawn_event("load_attachment", tx, async move {
            let result = load_selection(&input).await.map_err(|e| e.to_string());
            AppEvent::AttachmentsLoaded { target, result }
        }));
    }

    fn apply_attachments(&mut self, target: AttachmentTarget, files: Vec<AttachedFile>) {
        let count = files.len();
        match target {
            AttachmentTarget::Document => {
                // A document field holds one file; extra paths are ignored.
                if let Some(file) = files.into_iter().next() {
                    self.set_status(format!("Attached {}", file.file_name));
                    self.draft.attach_document(file);
                }
                self.draft.document_path.clear();
            }
            AttachmentTarget::Podcast { row } => {
                self.draft.attach_podcast_files(files, row);
                self.draft.clear_podcast_path(row);
                self.set_status(format!("Attached {} podcast file(s)", count));
            }
        }
    }

    // ========================================================================
    // Event Handling
    // ========================================================================

    pub fn handle_event(&mut self, event: AppEvent, tx: &mpsc::Sender<AppEvent>) {
        self.needs_redraw = true;
        match event {
            AppEvent::TopicsLoaded { generation, result } => {
                self.handle_topics_loaded(generation, result, tx)
            }
            AppEvent::SubmitFinished {
                id,
                session,
                result,
            } => self.handle_submit_finished(id, session, result, tx),
            AppEvent::DeleteFinished { id, result } => self.handle_delete_finished(id, result, tx),
            AppEvent::AttachmentsLoaded { target, result } => {
                self.attachment_handle = None;
                match result {
                    Ok(files) => self.apply_attachments(target, files),
                    Err(e) => {
                        tracing::warn!(?target, error = %e, "Failed to load attachment");
                        self.set_status(e);
                    }
                }
            }
            AppEvent::ToastExpired { generation } => {
                self.toaster.expire(generation);
            }
            AppEvent::TaskPanicked { task, error } => {
                tracing::error!(task, error, "Background task panicked");
                match task {
                    "fetch_topics" => {
                        self.list_handle = None;
                        self.loading = false;
                    }
                    "submit" => self.submit_handle = None,
                    "delete" => self.delete_handle = None,
                    "load_attachment" => self.attachment_handle = None,
                    _ => {}
                }
                self.set_status(format!("Internal error in {} task", task));
            }
        }
    }

    fn handle_topics_loaded(
        &mut self,
        generation: u64,
        result: Result<Vec<Topic>, String>,
        tx: &mpsc::Sender<AppEvent>,
    ) {
        if generation != self.list_generation {
            tracing::debug!(
                generation,
                current = self.list_generation,
                "Discarding stale topic list"
            );
            return;
        }
        self.list_handle = None;
        self.loading = false;

        match result {
            Ok(topics) => {
                tracing::debug!(count = topics.len(), "Topic list loaded");
                self.library = topics;
                self.selected = self.selected.min(self.library.len().saturating_sub(1));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load topics");
                self.toaster
                    .show(ToastKind::Danger, format!("Failed to load topics: {}", e), tx);
            }
        }

        // Patch the edited topic whatever the fetch outcome; the values come
        // from the topic passed to `edit`.
        if let Some(topic) = self.pending_edit.take() {
            if self.view == (ViewMode::Edit { id: topic.id }) {
                self.draft.reset();
                self.draft.hydrate(&topic);
                self.picker.reset();
                self.picker.set_from_related(&topic.related_topics);
                self.focus = 0;
            }
        }
    }

    fn handle_submit_finished(
        &mut self,
        id: Option<i64>,
        session: u64,
        result: Result<ApiReply, String>,
        tx: &mpsc::Sender<AppEvent>,
    ) {
        self.submit_handle = None;
        match result {
            Ok(reply) if reply.is_success() => {
                tracing::info!(?id, "Topic saved");
                let message = reply.message.unwrap_or_else(|| "Topic saved".to_string());
                if session == self.form_session && self.view != ViewMode::List {
                    self.view = ViewMode::List;
                    self.clear_form();
                } else {
                    tracing::debug!(
                        session,
                        current = self.form_session,
                        "Form changed since submit, leaving it open"
                    );
                }
                self.toaster.show(ToastKind::Success, message, tx);
                self.refresh_topics(tx);
            }
            Ok(reply) if reply.is_rejected() => {
                tracing::info!(?id, message = ?reply.message, "Topic rejected by server");
                let message = reply
                    .message
                    .unwrap_or_else(|| "The server rejected this topic".to_string());
                self.toaster.show(ToastKind::Danger, message, tx);
            }
            Ok(reply) => {
                tracing::warn!(?id, status = reply.status, "Unexpected status saving topic");
                let message = match reply.message {
                    Some(m) => format!("Failed to save topic ({}): {}", reply.status, m),
                    None => format!("Failed to save topic (status {})", reply.status),
                };
                self.toaster.show(ToastKind::Danger, message, tx);
            }
            Err(e) => {
                tracing::warn!(?id, error = %e, "Failed to save topic");
                self.toaster
                    .show(ToastKind::Danger, format!("Failed to save topic: {}", e), tx);
            }
        }
    }

    fn handle_delete_finished(
        &mut self,
        id: i64,
        result: Result<ApiReply, String>,
        tx: &mpsc::Sender<AppEvent>,
    ) {
        self.delete_handle = None;
        match result {
            Ok(reply) if reply.is_success() => {
                tracing::info!(id, "Topic deleted");
                let message = reply.message.unwrap_or_else(|| "Topic deleted".to_string());
                self.toaster.show(ToastKind::Success, message, tx);
            }
            Ok(reply) => {
                tracing::warn!(id, status = reply.status, "Delete not accepted");
                let message = reply
                    .message
                    .unwrap_or_else(|| format!("Failed to delete topic (status {})", reply.status));
                self.toaster.show(ToastKind::Danger, message, tx);
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "Failed to delete topic");
                self.toaster
                    .show(ToastKind::Danger, format!("Failed to delete topic: {}", e), tx);
            }
        }
        self.refresh_topics(tx);
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn selected_topic(&self) -> Option<&Topic> {
        self.library.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.library.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// The focused form field, clamped to the current field list.
    pub fn focused_field(&self) -> FormField {
        let fields = self.draft.fields();
        fields
            .get(self.focus.min(fields.len().saturating_sub(1)))
            .copied()
            .unwrap_or(FormField::Topic)
    }

    pub fn focus_next(&mut self) {
        let len = self.draft.fields().len();
        self.focus = (self.focus.min(len - 1) + 1) % len;
    }

    pub fn focus_prev(&mut self) {
        let len = self.draft.fields().len();
        self.focus = (self.focus.min(len - 1) + len - 1) % len;
    }

    /// Keep focus in range after rows were removed.
    pub fn clamp_focus(&mut self) {
        self.focus = self.focus.min(self.draft.fields().len() - 1);
    }

    // ========================================================================
    // Status Bar
    // ========================================================================

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired. Returns true if one was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

impl Drop for App {
    fn drop(&mut self) {
        for (name, handle) in [
            ("fetch_topics", self.list_handle.take()),
            ("submit", self.submit_handle.take()),
            ("delete", self.delete_handle.take()),
            ("load_attachment", self.attachment_handle.take()),
        ] {
            if let Some(handle) = handle {
                handle.abort();
                tracing::debug!(task = name, "Aborted task on App drop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{RelatedTopic, VideoDetail};
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tokio::time;

    fn test_app() -> App {
        // Port 9 (discard) on loopback: spawned requests fail fast and are
        // never awaited by these tests.
        let client =
            TopicClient::new("http://127.0.0.1:9", None, Duration::from_secs(1)).unwrap();
        App::new(client, &Config::default())
    }

    fn topic(id: i64, name: &str, videos: usize) -> Topic {
        Topic {
            id,
            topic: name.into(),
            tags: vec!["t".into()],
            important: false,
            created_at: None,
            web_site_link: None,
            description: Some("d".into()),
            related_topics: vec![RelatedTopic { topic: "Other".into() }],
            video_details: (0..videos)
                .map(|i| VideoDetail {
                    video_name: format!("v{}", i),
                    ..Default::default()
                })
                .collect(),
            podcast_details: Vec::new(),
            document: None,
            podcast_files: Vec::new(),
        }
    }

    fn reply(status: u16, message: Option<&str>) -> Result<ApiReply, String> {
        Ok(ApiReply {
            status,
            message: message.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_new_app_is_list_with_seeded_draft() {
        let app = test_app();
        assert_eq!(app.view, ViewMode::List);
        assert_eq!(app.draft, Draft::seeded());
        assert_eq!(app.delete_confirm, DeleteConfirm::Idle);
        assert!(app.toaster.current().is_none());
    }

    #[tokio::test]
    async fn test_submit_without_topic_makes_no_call() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut app = test_app();
        app.view = ViewMode::Add;
        assert!(!app.submit(&tx));
        assert!(!app.is_submitting());
        assert!(app.status_message.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_submit_from_list_is_ignored() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        app.draft.topic = "Ownership".into();
        assert!(!app.submit(&tx));
    }

    #[tokio::test]
    async fn test_double_submit_is_rejected() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        app.view = ViewMode::Add;
        app.draft.topic = "Ownership".into();
        assert!(app.submit(&tx));
        assert!(!app.submit(&tx));
        assert_eq!(
            app.toaster.current().map(|t| t.kind),
            Some(ToastKind::Danger)
        );
    }

    #[tokio::test]
    async fn test_submit_success_resets_and_returns_to_list() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        app.view = ViewMode::Add;
        app.draft.topic = "Ownership".into();
        app.draft.tags = vec!["rust".into()];
        app.picker.select("Borrowing");

        app.handle_event(
            AppEvent::SubmitFinished {
                id: None,
                session: app.form_session(),
                result: reply(200, Some("Created")),
            },
            &tx,
        );

        assert_eq!(app.view, ViewMode::List);
        assert_eq!(app.draft, Draft::seeded());
        assert!(app.picker.selected().is_empty());
        let toast = app.toaster.current().unwrap();
        assert_eq!(toast.kind, ToastKind::Success);
        assert_eq!(toast.message, "Created");
        assert!(app.loading);
    }

    #[tokio::test]
    async fn test_late_submit_success_keeps_reopened_form() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        app.add_details(&tx);
        app.draft.topic = "First".into();
        assert!(app.submit(&tx));
        let submitted = app.form_session();

        app.back_to_library();
        app.add_details(&tx);
        app.draft.topic = "Second, unsaved".into();
        let generation = app.list_generation();

        app.handle_event(
            AppEvent::SubmitFinished {
                id: None,
                session: submitted,
                result: reply(200, Some("Created")),
            },
            &tx,
        );

        assert_eq!(app.view, ViewMode::Add);
        assert_eq!(app.draft.topic, "Second, unsaved");
        assert!(!app.is_submitting());
        assert_eq!(
            app.toaster.current().map(|t| t.kind),
            Some(ToastKind::Success)
        );
        assert_eq!(app.list_generation(), generation + 1);
    }

    #[tokio::test]
    async fn test_late_submit_success_leaves_other_edit_alone() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        app.edit(topic(1, "One", 0), &tx);
        let submitted = app.form_session();
        app.back_to_library();
        app.edit(topic(2, "Two", 0), &tx);

        app.handle_event(
            AppEvent::SubmitFinished {
                id: Some(1),
                session: submitted,
                result: reply(200, None),
            },
            &tx,
        );

        assert_eq!(app.view, ViewMode::Edit { id: 2 });
        assert!(app.pending_edit().is_some());
    }

    #[tokio::test]
    async fn test_submit_rejected_keeps_edit_state() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        app.view = ViewMode::Edit { id: 4 };
        app.draft.topic = "Ownership".into();
        let before = app.draft.clone();

        app.handle_event(
            AppEvent::SubmitFinished {
                id: Some(4),
                session: app.form_session(),
                result: reply(400, Some("Duplicate topic")),
            },
            &tx,
        );

        assert_eq!(app.view, ViewMode::Edit { id: 4 });
        assert_eq!(app.draft, before);
        let toast = app.toaster.current().unwrap();
        assert_eq!(toast.kind, ToastKind::Danger);
        assert_eq!(toast.message, "Duplicate topic");
    }

    #[tokio::test]
    async fn test_submit_other_status_is_generic_failure() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        app.view = ViewMode::Add;
        app.draft.topic = "Ownership".into();
        let before = app.draft.clone();

        app.handle_event(
            AppEvent::SubmitFinished {
                id: None,
                session: app.form_session(),
                result: reply(500, None),
            },
            &tx,
        );

        assert_eq!(app.view, ViewMode::Add);
        assert_eq!(app.draft, before);
        let toast = app.toaster.current().unwrap();
        assert_eq!(toast.kind, ToastKind::Danger);
        assert!(toast.message.contains("500"));
    }

    #[tokio::test]
    async fn test_submit_network_error_is_generic_failure() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        app.view = ViewMode::Add;
        app.handle_event(
            AppEvent::SubmitFinished {
                id: None,
                session: app.form_session(),
                result: Err("Request timed out after 30s".into()),
            },
            &tx,
        );
        let toast = app.toaster.current().unwrap();
        assert_eq!(toast.kind, ToastKind::Danger);
        assert!(toast.message.contains("timed out"));
        assert_eq!(app.view, ViewMode::Add);
    }

    #[tokio::test]
    async fn test_delete_request_and_cancel() {
        let (_tx, mut rx) = mpsc::channel::<AppEvent>(8);
        let mut app = test_app();
        app.delete_request(5);
        assert_eq!(app.delete_confirm, DeleteConfirm::Confirming { id: 5 });
        assert_eq!(app.delete_prompt(), Some(DELETE_PROMPT));
        app.cancel_delete();
        assert_eq!(app.delete_confirm, DeleteConfirm::Idle);
        assert_eq!(app.delete_prompt(), None);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_confirm_delete_without_request_is_noop() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        assert!(!app.confirm_delete(&tx));
    }

    #[tokio::test]
    async fn test_delete_finished_refreshes_on_failure_too() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        let generation = app.list_generation();
        app.handle_event(
            AppEvent::DeleteFinished {
                id: 5,
                result: reply(404, None),
            },
            &tx,
        );
        assert_eq!(app.list_generation(), generation + 1);
        assert_eq!(
            app.toaster.current().map(|t| t.kind),
            Some(ToastKind::Danger)
        );
    }

    #[tokio::test]
    async fn test_stale_topic_list_is_discarded() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        app.refresh_topics(&tx);
        let stale = app.list_generation();
        app.refresh_topics(&tx);

        app.handle_event(
            AppEvent::TopicsLoaded {
                generation: stale,
                result: Ok(vec![topic(1, "Old", 0)]),
            },
            &tx,
        );
        assert!(app.library.is_empty());
        assert!(app.loading);

        app.handle_event(
            AppEvent::TopicsLoaded {
                generation: app.list_generation(),
                result: Ok(vec![topic(2, "New", 0)]),
            },
            &tx,
        );
        assert_eq!(app.library.len(), 1);
        assert_eq!(app.library[0].topic, "New");
        assert!(!app.loading);
    }

    #[tokio::test]
    async fn test_edit_hydrates_after_fetch() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        app.edit(topic(7, "Traits", 3), &tx);
        assert_eq!(app.view, ViewMode::Edit { id: 7 });
        assert_eq!(app.draft, Draft::seeded());

        app.handle_event(
            AppEvent::TopicsLoaded {
                generation: app.list_generation(),
                result: Ok(vec![topic(7, "Traits", 3)]),
            },
            &tx,
        );
        assert_eq!(app.draft.video_details.len(), 3);
        assert_eq!(app.draft.topic, "Traits");
        assert_eq!(app.picker.selected_names(), vec!["Other"]);
        assert!(app.pending_edit().is_none());
    }

    #[tokio::test]
    async fn test_edit_hydrates_even_when_fetch_fails() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        app.edit(topic(7, "Traits", 2), &tx);
        app.handle_event(
            AppEvent::TopicsLoaded {
                generation: app.list_generation(),
                result: Err("HTTP 502".into()),
            },
            &tx,
        );
        assert_eq!(app.draft.topic, "Traits");
        assert_eq!(app.draft.video_details.len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_before_fetch_skips_hydration() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        app.edit(topic(7, "Traits", 2), &tx);
        app.back_to_library();
        app.handle_event(
            AppEvent::TopicsLoaded {
                generation: app.list_generation(),
                result: Ok(Vec::new()),
            },
            &tx,
        );
        assert_eq!(app.view, ViewMode::List);
        assert_eq!(app.draft, Draft::seeded());
    }

    #[tokio::test]
    async fn test_back_to_library_clears_form() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        app.add_details(&tx);
        assert_eq!(app.view, ViewMode::Add);
        app.draft.topic = "Draft".into();
        app.draft.add_video();
        app.picker.select("X");
        app.back_to_library();
        assert_eq!(app.view, ViewMode::List);
        assert_eq!(app.draft, Draft::seeded());
        assert!(app.picker.selected().is_empty());
    }

    #[tokio::test]
    async fn test_attachments_loaded_into_draft() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        app.draft.podcast_paths = vec!["/tmp/a.mp3".into()];
        app.handle_event(
            AppEvent::AttachmentsLoaded {
                target: AttachmentTarget::Podcast { row: 0 },
                result: Ok(vec![AttachedFile::new("a.mp3", vec![1])]),
            },
            &tx,
        );
        assert_eq!(app.draft.podcast_files.len(), 1);
        assert_eq!(app.draft.podcast_path(0), "");

        app.handle_event(
            AppEvent::AttachmentsLoaded {
                target: AttachmentTarget::Document,
                result: Ok(vec![AttachedFile::new("doc.pdf", vec![])]),
            },
            &tx,
        );
        assert_eq!(
            app.draft.document.as_ref().map(|d| d.file_name.as_str()),
            Some("doc.pdf")
        );
    }

    #[tokio::test]
    async fn test_load_attachment_requires_path() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut app = test_app();
        app.load_attachment(AttachmentTarget::Document, &tx);
        assert!(app.status_message.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_focus_wraps_and_clamps() {
        let mut app = test_app();
        assert_eq!(app.focused_field(), FormField::Topic);
        app.focus_prev();
        assert_eq!(app.focused_field(), FormField::Document);
        app.focus_next();
        assert_eq!(app.focused_field(), FormField::Topic);

        app.draft.add_video();
        app.focus = app.draft.fields().len() - 1;
        app.draft.remove_video(1);
        app.clamp_focus();
        assert_eq!(app.focused_field(), FormField::Document);
    }

    #[tokio::test]
    async fn test_selection_bounds() {
        let mut app = test_app();
        app.select_prev();
        assert_eq!(app.selected, 0);
        app.library = vec![topic(1, "A", 0), topic(2, "B", 0)];
        app.select_next();
        app.select_next();
        assert_eq!(app.selected, 1);
        assert_eq!(app.selected_topic().map(|t| t.id), Some(2));
    }

    #[tokio::test]
    async fn test_status_expires_after_3_seconds() {
        let mut app = test_app();
        time::pause();
        app.set_status("Test message");

        time::advance(Duration::from_secs(2)).await;
        app.clear_expired_status();
        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }
}
