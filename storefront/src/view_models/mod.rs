//! Per-view state machines.
//!
//! Each view model owns its snapshot and is the only thing that writes it.
//! Fetches are sequenced: a response is applied only if its ticket is still
//! the latest one issued, so a slow earlier fetch can never overwrite the
//! result of a later one. On failure the previous snapshot stays visible.

pub mod inventory;
pub mod notices;
pub mod payments;
pub mod sequence;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

use crate::error::StorefrontError;
use crate::services::metrics;
pub use inventory::{InventoryView, InventoryViewModel, MutationKind, ProductCard};
pub use notices::{Notice, NoticeBoard, NoticeLevel};
pub use payments::{PaymentRow, PaymentsView, PaymentsViewModel};
pub use sequence::{FetchSequencer, FetchTicket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Empty,
    Loading,
    Ready,
    Error,
}

/// Backend data as of one successful fetch. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot<T> {
    pub ticket: FetchTicket,
    pub fetched_at: DateTime<Utc>,
    pub items: Vec<T>,
}

/// What happened to a fetch response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    /// A newer fetch was issued meanwhile; this response was dropped.
    Superseded,
}

/// Run an intent on its own task and wait for it. Dropping the caller only
/// stops the wait; the intent still releases its write slot and settles the
/// phase.
pub(crate) async fn run_detached<T, F>(intent: F) -> Result<T, StorefrontError>
where
    F: Future<Output = Result<T, StorefrontError>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(intent).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => {
            tracing::warn!(error = %e, "Intent task cancelled by runtime shutdown");
            Err(StorefrontError::Disposed)
        }
    }
}

/// Phase, sequencing, snapshot and notices shared by every view model.
#[derive(Debug)]
pub(crate) struct SnapshotState<T> {
    view: &'static str,
    pub(crate) phase: Phase,
    pub(crate) sequencer: FetchSequencer,
    pub(crate) snapshot: Option<Snapshot<T>>,
    pub(crate) notices: NoticeBoard,
    pub(crate) disposed: bool,
}

impl<T> SnapshotState<T> {
    pub(crate) fn new(view: &'static str, notice_ttl: Duration) -> Self {
        Self {
            view,
            phase: Phase::Empty,
            sequencer: FetchSequencer::default(),
            snapshot: None,
            notices: NoticeBoard::new(notice_ttl),
            disposed: false,
        }
    }

    pub(crate) fn ensure_live(&self) -> Result<(), StorefrontError> {
        if self.disposed {
            return Err(StorefrontError::Disposed);
        }
        Ok(())
    }

    /// Enter `Loading` and issue the ticket the response must present.
    pub(crate) fn begin_fetch(&mut self) -> FetchTicket {
        self.phase = Phase::Loading;
        let ticket = self.sequencer.issue();
        metrics::record_fetch(self.view);
        tracing::debug!(view = self.view, seq = ticket.value(), "Fetch issued");
        ticket
    }

    /// Apply a fetch result if `ticket` is still the latest. A failure keeps
    /// the previous snapshot and posts `failure_notice`.
    pub(crate) fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<T>, StorefrontError>,
        failure_notice: &str,
    ) -> Result<RefreshOutcome, StorefrontError> {
        if self.disposed || !self.sequencer.is_latest(ticket) {
            metrics::record_stale_response(self.view);
            tracing::debug!(
                view = self.view,
                seq = ticket.value(),
                latest = ?self.sequencer.latest().map(FetchTicket::value),
                "Discarding superseded fetch response"
            );
            return Ok(RefreshOutcome::Superseded);
        }

        match result {
            Ok(items) => {
                tracing::debug!(view = self.view, seq = ticket.value(), count = items.len(), "Snapshot replaced");
                self.snapshot = Some(Snapshot {
                    ticket,
                    fetched_at: Utc::now(),
                    items,
                });
                self.phase = Phase::Ready;
                Ok(RefreshOutcome::Applied)
            }
            Err(err) => {
                tracing::error!(view = self.view, seq = ticket.value(), error = %err, "Fetch failed, keeping previous snapshot");
                self.phase = Phase::Error;
                self.notices.post(NoticeLevel::Danger, failure_notice);
                Err(err)
            }
        }
    }
}
