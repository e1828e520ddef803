//! Debounced autosave of the workspace document.
//!
//! Every local mutation schedules a save of the full (externalized)
//! document; the timer is trailing-edge, so a burst of edits collapses to
//! one write two seconds after the last edit, carrying the latest snapshot.
//!
//! The scheduler itself is pure state driven by caller-supplied instants,
//! which keeps the debounce window testable without sleeping. A background
//! driver task polls it on a short interval and performs the actual writes.

#[cfg(test)]
#[path = "autosave_test.rs"]
mod autosave_test;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use canvas::store::CardDocument;
use tokio::task::JoinHandle;
use tracing::{error, warn};
use wire::CardId;

use crate::api::{ApiError, CardApi};

/// Trailing-edge debounce window between the last edit and the write.
pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_secs(2);

/// How often the driver task checks for an elapsed window.
const DRIVER_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Debounce state for one card's autosave.
#[derive(Debug, Default)]
pub struct AutosaveScheduler {
    pending: Option<(CardDocument, Instant)>,
    disabled: bool,
}

impl AutosaveScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edit: hold the latest snapshot and restart the window.
    ///
    /// Ignored after [`disable`](Self::disable); a deleted card must never
    /// be written again.
    pub fn schedule(&mut self, doc: CardDocument, now: Instant) {
        if self.disabled {
            return;
        }
        self.pending = Some((doc, now + AUTOSAVE_DEBOUNCE));
    }

    /// Take the pending snapshot if its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<CardDocument> {
        let due = matches!(&self.pending, Some((_, deadline)) if now >= *deadline);
        if due { self.pending.take().map(|(doc, _)| doc) } else { None }
    }

    /// Take the pending snapshot immediately, ignoring the window. Used by
    /// explicit manual saves, which supersede any queued autosave.
    pub fn flush(&mut self) -> Option<CardDocument> {
        self.pending.take().map(|(doc, _)| doc)
    }

    /// Drop any pending snapshot without disabling future scheduling.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Permanently stop autosaving. Terminal: there is no re-enable.
    pub fn disable(&mut self) {
        self.disabled = true;
        self.pending = None;
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Spawn the background autosave driver. Returns a handle for shutdown.
///
/// The driver wakes on a short interval, takes an elapsed snapshot under
/// the lock, releases the lock, then writes to the card endpoint. A `404`
/// from the endpoint means the card was deleted out from under the session;
/// that disables the scheduler for good. Transient failures are logged and
/// the snapshot is dropped, exactly like a lost fire-and-forget write.
pub fn spawn_autosave_driver(
    scheduler: Arc<Mutex<AutosaveScheduler>>,
    api: Arc<dyn CardApi>,
    card_id: CardId,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(DRIVER_POLL_INTERVAL);
        loop {
            interval.tick().await;

            let due = {
                let Ok(mut scheduler) = scheduler.lock() else {
                    return;
                };
                if scheduler.is_disabled() {
                    return;
                }
                scheduler.poll(Instant::now())
            };

            let Some(doc) = due else { continue };

            match api.save_workspace(card_id, &doc).await {
                Ok(()) => {}
                Err(ApiError::NotFound) => {
                    warn!(%card_id, "card deleted; autosave disabled");
                    if let Ok(mut scheduler) = scheduler.lock() {
                        scheduler.disable();
                    }
                    return;
                }
                Err(e) => {
                    error!(%card_id, error = %e, "autosave write failed");
                }
            }
        }
    })
}
