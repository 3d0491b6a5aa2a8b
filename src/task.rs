//! Background task plumbing shared by the controller and the toaster.

use crate::app::AppEvent;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Run `future`, turning a panic into `Err(message)`.
pub async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future).catch_unwind().await.map_err(|panic| {
        if let Some(s) = panic.downcast_ref::<&'static str>() {
            s.to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        }
    })
}

/// Spawn `future` and deliver the event it yields.
///
/// A panic is reported as [`AppEvent::TaskPanicked`] instead of vanishing
/// with the task.
pub fn spawn_event<F>(task: &'static str, tx: &mpsc::Sender<AppEvent>, future: F) -> JoinHandle<()>
where
    F: Future<Output = AppEvent> + Send + 'static,
{
    let tx = tx.clone();
    tokio::spawn(async move {
        let event = match catch_task_panic(future).await {
            Ok(event) => event,
            Err(error) => {
                tracing::error!(task, error = %error, "Background task panicked");
                AppEvent::TaskPanicked { task, error }
            }
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(task, error = %e, "Channel send failed (receiver dropped)");
        }
    })
}
