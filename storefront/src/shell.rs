use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::config::Settings;
use crate::services::http::build_client;
use crate::services::{
    CheckoutInitiator, HttpCheckoutInitiator, HttpInventoryGateway, InventoryGateway,
};
use crate::view_models::{InventoryView, InventoryViewModel, PaymentsView, PaymentsViewModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    AddProduct,
    Products,
    Payments,
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add-product" => Ok(Section::AddProduct),
            "products" => Ok(Section::Products),
            "payments" => Ok(Section::Payments),
            other => Err(format!("Unknown section: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "section", content = "view", rename_all = "kebab-case")]
pub enum SectionView {
    AddProduct(InventoryView),
    Products(InventoryView),
    Payments(PaymentsView),
}

/// Owns one view model per view and routes navigation to the right refresh.
#[derive(Clone)]
pub struct Storefront {
    pub inventory: Arc<InventoryViewModel>,
    pub payments: Arc<PaymentsViewModel>,
}

impl Storefront {
    pub fn new(
        gateway: Arc<dyn InventoryGateway>,
        checkout: Arc<dyn CheckoutInitiator>,
        settings: &Settings,
    ) -> Self {
        let presentation = settings.presentation.clone();
        let notice_ttl = presentation.notice_ttl();

        Self {
            inventory: Arc::new(InventoryViewModel::new(
                gateway.clone(),
                checkout,
                presentation,
            )),
            payments: Arc::new(PaymentsViewModel::new(gateway, notice_ttl)),
        }
    }

    /// Wire the HTTP gateway and checkout initiator against the configured backend.
    pub fn connect(settings: &Settings) -> anyhow::Result<Self> {
        let client = build_client(&settings.backend)?;
        let gateway = Arc::new(HttpInventoryGateway::new(
            client.clone(),
            settings.backend.base_url.clone(),
        ));
        let checkout = Arc::new(HttpCheckoutInitiator::new(
            client,
            settings.backend.base_url.clone(),
        ));

        tracing::info!(backend = %settings.backend.base_url, "Storefront connected");
        Ok(Self::new(gateway, checkout, settings))
    }

    /// Show a section. Products and payments refetch on every visit; a failed
    /// fetch is already a notice in the returned view.
    pub async fn navigate(&self, section: Section) -> SectionView {
        tracing::debug!(?section, "Navigating");
        match section {
            Section::AddProduct => SectionView::AddProduct(self.inventory.view()),
            Section::Products => {
                let _ = self.inventory.refresh().await;
                SectionView::Products(self.inventory.view())
            }
            Section::Payments => {
                let _ = self.payments.refresh().await;
                SectionView::Payments(self.payments.view())
            }
        }
    }

    pub async fn expire_notices(&self) {
        self.inventory.expire_notices().await;
        self.payments.expire_notices().await;
    }

    pub async fn dispose(&self) {
        self.inventory.dispose().await;
        self.payments.dispose().await;
    }
}
