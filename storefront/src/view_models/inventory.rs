use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Mutex};

use super::{
    run_detached, FetchTicket, Notice, NoticeLevel, Phase, RefreshOutcome, Snapshot,
    SnapshotState,
};
use crate::config::PresentationSettings;
use crate::dtos::{parse_checkout_quantity, parse_stock_quantity, ProductDraft};
use crate::error::StorefrontError;
use crate::models::{ImageRef, Product, ProductId};
use crate::services::checkout::CHECKOUT_FALLBACK_MESSAGE;
use crate::services::{metrics, CheckoutInitiator, CheckoutRedirect, InventoryGateway};

const VIEW: &str = "inventory";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    CreateProduct,
    StockUpdate,
}

/// A product as the catalog should render it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductCard {
    #[serde(flatten)]
    pub product: Product,
    pub purchase_enabled: bool,
    pub image: ImageRef,
}

/// Immutable view published to observers after every state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryView {
    pub phase: Phase,
    pub products: Vec<ProductCard>,
    pub snapshot_seq: Option<u64>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub pending_write: Option<MutationKind>,
    pub notices: Vec<Notice>,
}

impl InventoryView {
    fn empty() -> Self {
        Self {
            phase: Phase::Empty,
            products: Vec::new(),
            snapshot_seq: None,
            fetched_at: None,
            pending_write: None,
            notices: Vec::new(),
        }
    }

    pub fn card(&self, product_id: ProductId) -> Option<&ProductCard> {
        self.products.iter().find(|c| c.product.id == product_id)
    }
}

#[derive(Debug)]
struct InventoryState {
    base: SnapshotState<Product>,
    pending_write: Option<MutationKind>,
}

/// Catalog view model: product snapshot, purchase eligibility, and
/// serialized stock/product writes followed by a full refetch.
///
/// Network-bound intents run detached (see [`run_detached`]), so a caller that
/// stops waiting, like a handler whose client hung up, cannot strand the
/// write slot or leave the view in `Loading`.
pub struct InventoryViewModel {
    core: Arc<InventoryCore>,
}

impl InventoryViewModel {
    pub fn new(
        gateway: Arc<dyn InventoryGateway>,
        checkout: Arc<dyn CheckoutInitiator>,
        presentation: PresentationSettings,
    ) -> Self {
        Self {
            core: Arc::new(InventoryCore::new(gateway, checkout, presentation)),
        }
    }

    pub fn view(&self) -> InventoryView {
        self.core.view()
    }

    pub fn subscribe(&self) -> watch::Receiver<InventoryView> {
        self.core.view_tx.subscribe()
    }

    /// Whether the buy action is enabled for `product_id` in the current snapshot.
    pub fn purchase_enabled(&self, product_id: ProductId) -> bool {
        self.core.purchase_enabled(product_id)
    }

    pub async fn snapshot(&self) -> Option<Snapshot<Product>> {
        self.core.state.lock().await.base.snapshot.clone()
    }

    /// Fetch the full product list. Used for the initial load and explicit reloads.
    pub async fn refresh(&self) -> Result<RefreshOutcome, StorefrontError> {
        let core = self.core.clone();
        run_detached(async move { core.refresh().await }).await
    }

    /// Set a product's stock. On success the catalog is refetched, never patched.
    pub async fn update_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), StorefrontError> {
        let core = self.core.clone();
        run_detached(async move { core.update_stock(product_id, quantity).await }).await
    }

    /// Stock form submission: parse the typed quantity, then [`Self::update_stock`].
    pub async fn submit_stock_form(
        &self,
        product_id: ProductId,
        raw_quantity: &str,
    ) -> Result<(), StorefrontError> {
        let core = self.core.clone();
        let raw_quantity = raw_quantity.to_string();
        run_detached(async move { core.submit_stock_form(product_id, &raw_quantity).await }).await
    }

    /// Add-product form submission. The new product appears only via the refetch.
    pub async fn add_product(&self, draft: ProductDraft) -> Result<(), StorefrontError> {
        let core = self.core.clone();
        run_detached(async move { core.add_product(draft).await }).await
    }

    /// Buy action. Refused while a fetch is loading or when the current snapshot
    /// shows no stock; otherwise the backend has the final say. Nothing local
    /// changes on success.
    pub async fn purchase(
        &self,
        product_id: ProductId,
        raw_quantity: &str,
    ) -> Result<CheckoutRedirect, StorefrontError> {
        let core = self.core.clone();
        let raw_quantity = raw_quantity.to_string();
        run_detached(async move { core.purchase(product_id, &raw_quantity).await }).await
    }

    pub async fn dismiss_notice(&self, notice_id: u64) -> bool {
        self.core.dismiss_notice(notice_id).await
    }

    pub async fn expire_notices(&self) {
        self.core.expire_notices().await
    }

    /// End of life: later intents fail with `Disposed` and late responses are dropped.
    pub async fn dispose(&self) {
        self.core.dispose().await
    }
}

struct InventoryCore {
    gateway: Arc<dyn InventoryGateway>,
    checkout: Arc<dyn CheckoutInitiator>,
    presentation: PresentationSettings,
    state: Mutex<InventoryState>,
    view_tx: watch::Sender<InventoryView>,
}

impl InventoryCore {
    fn new(
        gateway: Arc<dyn InventoryGateway>,
        checkout: Arc<dyn CheckoutInitiator>,
        presentation: PresentationSettings,
    ) -> Self {
        let (view_tx, _) = watch::channel(InventoryView::empty());
        let state = InventoryState {
            base: SnapshotState::new(VIEW, presentation.notice_ttl()),
            pending_write: None,
        };

        Self {
            gateway,
            checkout,
            presentation,
            state: Mutex::new(state),
            view_tx,
        }
    }

    fn view(&self) -> InventoryView {
        self.view_tx.borrow().clone()
    }

    fn purchase_enabled(&self, product_id: ProductId) -> bool {
        self.view_tx
            .borrow()
            .card(product_id)
            .map(|c| c.purchase_enabled)
            .unwrap_or(false)
    }

    async fn refresh(&self) -> Result<RefreshOutcome, StorefrontError> {
        let ticket = {
            let mut state = self.state.lock().await;
            state.base.ensure_live()?;
            let ticket = state.base.begin_fetch();
            self.publish(&state);
            ticket
        };

        self.fetch(ticket).await
    }

    async fn fetch(&self, ticket: FetchTicket) -> Result<RefreshOutcome, StorefrontError> {
        let result = self.gateway.list_products().await;

        let mut state = self.state.lock().await;
        let outcome = state
            .base
            .complete_fetch(ticket, result, "Error loading products");
        self.publish(&state);
        outcome
    }

    /// Post-mutation hook: runs exactly once per successful write and issues
    /// the single refetch that makes the write visible.
    fn after_mutation(&self, state: &mut InventoryState, kind: MutationKind) -> FetchTicket {
        tracing::info!(?kind, "Write succeeded, refetching inventory");
        state.base.begin_fetch()
    }

    /// Claim the write slot. Refused while loading or while another write runs.
    async fn begin_write(&self, kind: MutationKind) -> Result<(), StorefrontError> {
        let mut state = self.state.lock().await;
        state.base.ensure_live()?;

        if state.base.phase == Phase::Loading || state.pending_write.is_some() {
            metrics::record_rejected_write(VIEW);
            tracing::warn!(
                ?kind,
                in_flight = ?state.pending_write,
                phase = ?state.base.phase,
                "Write rejected while another operation is in flight"
            );
            let err = StorefrontError::WriteInFlight;
            state.base.notices.post(NoticeLevel::Danger, err.to_string());
            self.publish(&state);
            return Err(err);
        }

        state.pending_write = Some(kind);
        self.publish(&state);
        Ok(())
    }

    /// Release the write slot, post the outcome, and on success start the refetch.
    async fn finish_write(
        &self,
        kind: MutationKind,
        result: &Result<(), StorefrontError>,
        success_notice: &str,
        failure_notice: String,
    ) {
        let refetch = {
            let mut state = self.state.lock().await;
            state.pending_write = None;

            if state.base.disposed {
                return;
            }

            let refetch = match result {
                Ok(()) => {
                    state.base.notices.post(NoticeLevel::Success, success_notice);
                    Some(self.after_mutation(&mut state, kind))
                }
                Err(err) => {
                    tracing::error!(?kind, error = %err, "Write failed, snapshot unchanged");
                    state.base.notices.post(NoticeLevel::Danger, failure_notice);
                    None
                }
            };
            self.publish(&state);
            refetch
        };

        if let Some(ticket) = refetch {
            // A failed refetch already posted its own notice
            let _ = self.fetch(ticket).await;
        }
    }

    async fn update_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), StorefrontError> {
        self.begin_write(MutationKind::StockUpdate).await?;

        let result = self.gateway.update_stock(product_id, quantity).await;
        let failure = match &result {
            Err(err) => err.notice_text("Error updating stock"),
            Ok(()) => String::new(),
        };
        self.finish_write(
            MutationKind::StockUpdate,
            &result,
            "Stock updated successfully!",
            failure,
        )
        .await;

        result
    }

    async fn submit_stock_form(
        &self,
        product_id: ProductId,
        raw_quantity: &str,
    ) -> Result<(), StorefrontError> {
        match parse_stock_quantity(raw_quantity) {
            Ok(quantity) => self.update_stock(product_id, quantity).await,
            Err(err) => {
                self.post_notice(NoticeLevel::Danger, err.notice_text("Error updating stock"))
                    .await;
                Err(err)
            }
        }
    }

    async fn add_product(&self, draft: ProductDraft) -> Result<(), StorefrontError> {
        let product = match draft.into_new_product() {
            Ok(product) => product,
            Err(err) => {
                self.post_notice(NoticeLevel::Danger, adding_failed(&err)).await;
                return Err(err);
            }
        };

        self.begin_write(MutationKind::CreateProduct).await?;

        let result = self.gateway.create_product(product).await;
        let failure = match &result {
            Err(err) => adding_failed(err),
            Ok(()) => String::new(),
        };
        self.finish_write(
            MutationKind::CreateProduct,
            &result,
            "Product added successfully!",
            failure,
        )
        .await;

        result
    }

    async fn purchase(
        &self,
        product_id: ProductId,
        raw_quantity: &str,
    ) -> Result<CheckoutRedirect, StorefrontError> {
        let quantity = match parse_checkout_quantity(raw_quantity) {
            Ok(quantity) => quantity,
            Err(err) => {
                self.post_notice(NoticeLevel::Danger, err.notice_text(CHECKOUT_FALLBACK_MESSAGE))
                    .await;
                return Err(err);
            }
        };

        {
            let mut state = self.state.lock().await;
            state.base.ensure_live()?;

            // The snapshot is about to be replaced; don't judge stock from it
            if state.base.phase == Phase::Loading {
                metrics::record_rejected_write(VIEW);
                tracing::warn!(product_id = %product_id, "Purchase rejected while inventory is loading");
                let err = StorefrontError::WriteInFlight;
                state.base.notices.post(NoticeLevel::Danger, err.to_string());
                self.publish(&state);
                return Err(err);
            }

            let available = state
                .base
                .snapshot
                .as_ref()
                .and_then(|s| s.items.iter().find(|p| p.id == product_id))
                .map(|p| p.available_quantity);

            let refusal = match available {
                None => Some("Product is not available"),
                Some(0) => Some("Product is out of stock"),
                Some(_) => None,
            };
            if let Some(reason) = refusal {
                state.base.notices.post(NoticeLevel::Danger, reason);
                self.publish(&state);
                return Err(StorefrontError::validation(reason));
            }
        }

        match self.checkout.create_checkout_session(product_id, quantity).await {
            Ok(redirect) => Ok(redirect),
            Err(err) => {
                self.post_notice(NoticeLevel::Danger, err.notice_text(CHECKOUT_FALLBACK_MESSAGE))
                    .await;
                Err(err)
            }
        }
    }

    async fn dismiss_notice(&self, notice_id: u64) -> bool {
        let mut state = self.state.lock().await;
        let removed = state.base.notices.dismiss(notice_id);
        if removed {
            self.publish(&state);
        }
        removed
    }

    async fn expire_notices(&self) {
        let mut state = self.state.lock().await;
        if state.base.notices.expire(Instant::now()) > 0 {
            self.publish(&state);
        }
    }

    async fn dispose(&self) {
        let mut state = self.state.lock().await;
        state.base.disposed = true;
        tracing::debug!(view = VIEW, "View model disposed");
    }

    async fn post_notice(&self, level: NoticeLevel, message: String) {
        let mut state = self.state.lock().await;
        state.base.notices.post(level, message);
        self.publish(&state);
    }

    fn publish(&self, state: &InventoryState) {
        let snapshot = state.base.snapshot.as_ref();
        let products = snapshot
            .map(|s| {
                s.items
                    .iter()
                    .map(|product| ProductCard {
                        purchase_enabled: product.is_purchasable(),
                        image: ImageRef::resolve(
                            product.picture_url.as_deref(),
                            &self.presentation.uploads_prefix,
                            &self.presentation.placeholder_image_url,
                        ),
                        product: product.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        self.view_tx.send_replace(InventoryView {
            phase: state.base.phase,
            products,
            snapshot_seq: snapshot.map(|s| s.ticket.value()),
            fetched_at: snapshot.map(|s| s.fetched_at),
            pending_write: state.pending_write,
            notices: state.base.notices.all().to_vec(),
        });
    }
}

fn adding_failed(err: &StorefrontError) -> String {
    format!("Error adding product: {}", err.notice_text("Failed to add product"))
}
