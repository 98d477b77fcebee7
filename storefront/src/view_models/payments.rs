use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex};

use super::{run_detached, Notice, Phase, RefreshOutcome, Snapshot, SnapshotState};
use crate::error::StorefrontError;
use crate::models::{Payment, StatusTone};
use crate::services::InventoryGateway;

const VIEW: &str = "payments";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRow {
    #[serde(flatten)]
    pub payment: Payment,
    pub tone: StatusTone,
    pub session_label: String,
}

impl From<&Payment> for PaymentRow {
    fn from(payment: &Payment) -> Self {
        Self {
            tone: payment.status.tone(),
            session_label: payment
                .session_id
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "N/A".to_string()),
            payment: payment.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentsView {
    pub phase: Phase,
    pub payments: Vec<PaymentRow>,
    pub snapshot_seq: Option<u64>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub notices: Vec<Notice>,
}

/// Read-only payment history. Refreshes run detached like the inventory's.
pub struct PaymentsViewModel {
    core: Arc<PaymentsCore>,
}

impl PaymentsViewModel {
    pub fn new(gateway: Arc<dyn InventoryGateway>, notice_ttl: Duration) -> Self {
        let (view_tx, _) = watch::channel(PaymentsView {
            phase: Phase::Empty,
            payments: Vec::new(),
            snapshot_seq: None,
            fetched_at: None,
            notices: Vec::new(),
        });

        Self {
            core: Arc::new(PaymentsCore {
                gateway,
                state: Mutex::new(SnapshotState::new(VIEW, notice_ttl)),
                view_tx,
            }),
        }
    }

    pub fn view(&self) -> PaymentsView {
        self.core.view_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PaymentsView> {
        self.core.view_tx.subscribe()
    }

    pub async fn snapshot(&self) -> Option<Snapshot<Payment>> {
        self.core.state.lock().await.snapshot.clone()
    }

    pub async fn refresh(&self) -> Result<RefreshOutcome, StorefrontError> {
        let core = self.core.clone();
        run_detached(async move { core.refresh().await }).await
    }

    pub async fn dismiss_notice(&self, notice_id: u64) -> bool {
        let mut state = self.core.state.lock().await;
        let removed = state.notices.dismiss(notice_id);
        if removed {
            self.core.publish(&state);
        }
        removed
    }

    pub async fn expire_notices(&self) {
        let mut state = self.core.state.lock().await;
        if state.notices.expire(Instant::now()) > 0 {
            self.core.publish(&state);
        }
    }

    pub async fn dispose(&self) {
        self.core.state.lock().await.disposed = true;
    }
}

struct PaymentsCore {
    gateway: Arc<dyn InventoryGateway>,
    state: Mutex<SnapshotState<Payment>>,
    view_tx: watch::Sender<PaymentsView>,
}

impl PaymentsCore {
    async fn refresh(&self) -> Result<RefreshOutcome, StorefrontError> {
        let ticket = {
            let mut state = self.state.lock().await;
            state.ensure_live()?;
            let ticket = state.begin_fetch();
            self.publish(&state);
            ticket
        };

        let result = self.gateway.list_payments().await;

        let mut state = self.state.lock().await;
        let outcome = state.complete_fetch(ticket, result, "Error loading payments");
        self.publish(&state);
        outcome
    }

    fn publish(&self, state: &SnapshotState<Payment>) {
        let snapshot = state.snapshot.as_ref();
        self.view_tx.send_replace(PaymentsView {
            phase: state.phase,
            payments: snapshot
                .map(|s| s.items.iter().map(PaymentRow::from).collect())
                .unwrap_or_default(),
            snapshot_seq: snapshot.map(|s| s.ticket.value()),
            fetched_at: snapshot.map(|s| s.fetched_at),
            notices: state.notices.all().to_vec(),
        });
    }
}
