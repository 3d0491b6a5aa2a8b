//! Integration tests for the topic form controller against a mock backend.
//!
//! Each test starts its own wiremock server and drives `App` the way the
//! event loop does: issue a command, then feed the resulting `AppEvent`s
//! back through `handle_event`.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use topic_desk::api::{Topic, TopicClient};
use topic_desk::app::{App, AppEvent, DeleteConfirm, ViewMode};
use topic_desk::config::Config;
use topic_desk::form::{AttachedFile, Draft};
use topic_desk::toast::ToastKind;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> Config {
    Config {
        // Long enough that no expiry event interleaves with the test.
        toast_duration_ms: 60_000,
        ..Config::default()
    }
}

fn app_for(server: &MockServer) -> (App, mpsc::Sender<AppEvent>, mpsc::Receiver<AppEvent>) {
    let client = TopicClient::new(&server.uri(), None, Duration::from_secs(5)).unwrap();
    let (tx, rx) = mpsc::channel(32);
    (App::new(client, &test_config()), tx, rx)
}

/// Receive one event and apply it.
async fn pump(app: &mut App, rx: &mut mpsc::Receiver<AppEvent>, tx: &mpsc::Sender<AppEvent>) {
    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed");
    app.handle_event(event, tx);
}

fn library_body() -> serde_json::Value {
    json!({
        "status": 200,
        "data": [
            {
                "id": 5,
                "topic": "Ownership",
                "tags": ["memory"],
                "important": 1,
                "createdAt": 1_700_000_000_000_i64
            },
            {
                "id": 7,
                "topic": "Traits",
                "tags": ["generics", "dispatch"],
                "important": false,
                "webSiteLink": "https://doc.rust-lang.org/book/ch10-02-traits.html",
                "description": "Shared behaviour",
                "relatedTopicId": [{"topic": "Ownership"}],
                "videoDetails": [
                    {"videoName": "Intro", "videoLink": "https://v/1", "videoDescription": ""},
                    {"videoName": "Objects", "videoLink": "https://v/2", "videoDescription": ""},
                    {"videoName": "Bounds", "videoLink": "https://v/3", "videoDescription": ""}
                ],
                "podcastDetails": null
            }
        ]
    })
}

async fn mount_library(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/library"))
        .respond_with(ResponseTemplate::new(200).set_body_json(library_body()))
        .mount(server)
        .await;
}

fn traits_topic() -> Topic {
    let mut body = library_body();
    serde_json::from_value(body["data"][1].take()).unwrap()
}

// ============================================================================
// Initialize / List
// ============================================================================

#[tokio::test]
async fn test_initialize_loads_library() {
    let server = MockServer::start().await;
    mount_library(&server).await;
    let (mut app, tx, mut rx) = app_for(&server);

    app.initialize(&tx);
    assert!(app.loading);
    pump(&mut app, &mut rx, &tx).await;

    assert!(!app.loading);
    assert_eq!(app.library.len(), 2);
    assert_eq!(app.library[0].topic, "Ownership");
    assert!(app.library[0].important);
    assert_eq!(app.view, ViewMode::List);
    assert_eq!(app.draft, Draft::seeded());
}

#[tokio::test]
async fn test_list_failure_shows_danger_toast() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/library"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let (mut app, tx, mut rx) = app_for(&server);

    app.initialize(&tx);
    pump(&mut app, &mut rx, &tx).await;

    assert!(app.library.is_empty());
    assert_eq!(
        app.toaster.current().map(|t| t.kind),
        Some(ToastKind::Danger)
    );
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/library"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(library_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = TopicClient::new(
        &server.uri(),
        Some(SecretString::from("secret-token".to_string())),
        Duration::from_secs(5),
    )
    .unwrap();
    let (tx, mut rx) = mpsc::channel(8);
    let mut app = App::new(client, &test_config());

    app.initialize(&tx);
    pump(&mut app, &mut rx, &tx).await;
    assert_eq!(app.library.len(), 2);
    server.verify().await;
}

// ============================================================================
// Submit
// ============================================================================

#[tokio::test]
async fn test_create_success_resets_form() {
    let server = MockServer::start().await;
    mount_library(&server).await;
    Mock::given(method("POST"))
        .and(path("/library"))
        .and(body_string_contains("Closures"))
        .and(body_string_contains("capture,fn-traits"))
        .and(body_string_contains("Ownership,Traits"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": 200, "message": "Topic created"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let (mut app, tx, mut rx) = app_for(&server);

    app.add_details(&tx);
    pump(&mut app, &mut rx, &tx).await;
    assert_eq!(app.view, ViewMode::Add);

    app.draft.topic = "Closures".into();
    for tag in ["capture", "fn-traits"] {
        app.draft.tag_input = tag.into();
        app.draft.add_tag();
    }
    app.picker.select("Ownership");
    app.picker.select("Traits");

    assert!(app.submit(&tx));
    pump(&mut app, &mut rx, &tx).await;

    assert_eq!(app.view, ViewMode::List);
    assert_eq!(app.draft, Draft::seeded());
    assert!(app.draft.tags.is_empty());
    assert!(app.picker.selected().is_empty());
    let toast = app.toaster.current().unwrap();
    assert_eq!(toast.kind, ToastKind::Success);
    assert_eq!(toast.message, "Topic created");

    // Success triggers a list refresh.
    assert!(app.loading);
    pump(&mut app, &mut rx, &tx).await;
    assert!(!app.loading);
    server.verify().await;
}

#[tokio::test]
async fn test_empty_topic_makes_no_backend_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/library"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let (mut app, tx, mut rx) = app_for(&server);
    app.view = ViewMode::Add;

    assert!(!app.submit(&tx));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
    server.verify().await;
}

#[tokio::test]
async fn test_rejected_update_keeps_edit_state() {
    let server = MockServer::start().await;
    mount_library(&server).await;
    Mock::given(method("PUT"))
        .and(path("/library/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 400,
            "message": "Topic already exists"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let (mut app, tx, mut rx) = app_for(&server);

    app.edit(traits_topic(), &tx);
    pump(&mut app, &mut rx, &tx).await;
    assert_eq!(app.view, ViewMode::Edit { id: 7 });
    assert_eq!(app.draft.topic, "Traits");
    assert_eq!(app.draft.video_details.len(), 3);
    assert_eq!(app.draft.podcast_details.len(), 1);
    assert_eq!(app.draft.tags, vec!["generics", "dispatch"]);
    assert_eq!(app.picker.selected_names(), vec!["Ownership"]);

    let before = app.draft.clone();
    assert!(app.submit(&tx));
    pump(&mut app, &mut rx, &tx).await;

    assert_eq!(app.view, ViewMode::Edit { id: 7 });
    assert_eq!(app.draft, before);
    let toast = app.toaster.current().unwrap();
    assert_eq!(toast.kind, ToastKind::Danger);
    assert_eq!(toast.message, "Topic already exists");
    server.verify().await;
}

#[tokio::test]
async fn test_unexpected_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/library"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad gateway"))
        .expect(1)
        .mount(&server)
        .await;
    let (mut app, tx, mut rx) = app_for(&server);
    app.view = ViewMode::Add;
    app.draft.topic = "Smart pointers".into();
    let before = app.draft.clone();

    assert!(app.submit(&tx));
    pump(&mut app, &mut rx, &tx).await;

    assert_eq!(app.view, ViewMode::Add);
    assert_eq!(app.draft, before);
    let toast = app.toaster.current().unwrap();
    assert_eq!(toast.kind, ToastKind::Danger);
    assert!(toast.message.contains("502"));
}

#[tokio::test]
async fn test_second_submit_while_in_flight_is_rejected() {
    let server = MockServer::start().await;
    mount_library(&server).await;
    Mock::given(method("POST"))
        .and(path("/library"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": 200, "message": "ok"}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;
    let (mut app, tx, mut rx) = app_for(&server);
    app.view = ViewMode::Add;
    app.draft.topic = "Lifetimes".into();

    assert!(app.submit(&tx));
    assert!(!app.submit(&tx));
    assert!(app.is_submitting());

    pump(&mut app, &mut rx, &tx).await;
    assert!(!app.is_submitting());
    assert_eq!(app.view, ViewMode::List);
    server.verify().await;
}

#[tokio::test]
async fn test_attachments_are_sent_as_file_parts() {
    let server = MockServer::start().await;
    mount_library(&server).await;
    Mock::given(method("POST"))
        .and(path("/library"))
        .and(body_string_contains(r#"name="documentFiles"; filename="guide.pdf""#))
        .and(body_string_contains(r#"name="podcastFiles"; filename="ep1.mp3""#))
        .and(body_string_contains(r#"name="podcastFiles"; filename="ep2.mp3""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": 200})))
        .expect(1)
        .mount(&server)
        .await;
    let (mut app, tx, mut rx) = app_for(&server);
    app.view = ViewMode::Add;
    app.draft.topic = "Async".into();
    app.draft.attach_document(AttachedFile::new("guide.pdf", b"%PDF".to_vec()));
    app.draft
        .attach_podcast_files(vec![AttachedFile::new("ep1.mp3", b"1".to_vec())], 0);
    app.draft.add_podcast();
    app.draft
        .attach_podcast_files(vec![AttachedFile::new("ep2.mp3", b"2".to_vec())], 1);

    assert!(app.submit(&tx));
    pump(&mut app, &mut rx, &tx).await;

    let toast = app.toaster.current().unwrap();
    assert_eq!(toast.kind, ToastKind::Success);
    assert_eq!(toast.message, "Topic saved");
    server.verify().await;
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_confirm_flow_refreshes_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/library"))
        .respond_with(ResponseTemplate::new(200).set_body_json(library_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/library/5"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status": 404,
            "message": "Topic not found"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let (mut app, tx, mut rx) = app_for(&server);

    app.delete_request(5);
    assert_eq!(app.delete_confirm, DeleteConfirm::Confirming { id: 5 });
    assert_eq!(app.delete_prompt(), Some("Are you sure you want to delete?"));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());

    assert!(app.confirm_delete(&tx));
    assert_eq!(app.delete_confirm, DeleteConfirm::Idle);

    pump(&mut app, &mut rx, &tx).await;
    let toast = app.toaster.current().unwrap();
    assert_eq!(toast.kind, ToastKind::Danger);
    assert_eq!(toast.message, "Topic not found");

    pump(&mut app, &mut rx, &tx).await;
    assert_eq!(app.library.len(), 2);
    server.verify().await;
}

#[tokio::test]
async fn test_delete_success_shows_server_message() {
    let server = MockServer::start().await;
    mount_library(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/library/7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": 200, "message": "Deleted"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let (mut app, tx, mut rx) = app_for(&server);

    app.delete_request(7);
    assert!(app.confirm_delete(&tx));
    pump(&mut app, &mut rx, &tx).await;

    let toast = app.toaster.current().unwrap();
    assert_eq!(toast.kind, ToastKind::Success);
    assert_eq!(toast.message, "Deleted");
    assert!(app.loading);
    server.verify().await;
}
