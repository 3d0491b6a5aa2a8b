//! Transient notifications with a cancellable hide timer.

use crate::app::AppEvent;
use crate::task::spawn_event;
use std::borrow::Cow;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: Cow<'static, str>,
    pub kind: ToastKind,
}

/// Holds at most one visible toast.
///
/// Every `show` bumps the generation and restarts the timer, so an expiry
/// from an earlier toast can never hide a later one.
pub struct Toaster {
    current: Option<Toast>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
    duration: Duration,
}

impl Toaster {
    pub fn new(duration: Duration) -> Self {
        Self {
            current: None,
            generation: 0,
            timer: None,
            duration,
        }
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn show(
        &mut self,
        kind: ToastKind,
        message: impl Into<Cow<'static, str>>,
        tx: &mpsc::Sender<AppEvent>,
    ) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let message = message.into();
        tracing::debug!(?kind, generation, message = %message, "Toast shown");
        self.current = Some(Toast { message, kind });

        let duration = self.duration;
        self.timer = Some(spawn_event("toast_timer", tx, async move {
            tokio::time::sleep(duration).await;
            AppEvent::ToastExpired { generation }
        }));
    }

    /// Hide the toast if `generation` is still the latest. Returns whether it
    /// was hidden.
    pub fn expire(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.current.is_none() {
            tracing::trace!(generation, latest = self.generation, "Ignoring stale toast expiry");
            return false;
        }
        self.current = None;
        self.timer = None;
        true
    }
}

impl Drop for Toaster {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }
}
