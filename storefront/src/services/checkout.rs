//! Checkout initiation: ask the backend for a hosted payment session and
//! hand back the URL the shopper should be sent to.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use storefront_core::observability::TracedClientExt;

use super::http::api_url;
use crate::dtos::{CheckoutRequest, CheckoutSessionBody};
use crate::error::StorefrontError;
use crate::models::ProductId;

/// Shown when the backend gives no usable reason.
pub const CHECKOUT_FALLBACK_MESSAGE: &str = "Failed to create checkout session";

/// Where to send the shopper. Navigation is handed off; nothing local changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRedirect {
    pub url: String,
}

#[async_trait]
pub trait CheckoutInitiator: Send + Sync {
    /// Quantity must be at least 1; anything else fails before any I/O.
    /// Stock is not checked here, the backend decides availability.
    async fn create_checkout_session(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CheckoutRedirect, StorefrontError>;
}

#[derive(Clone)]
pub struct HttpCheckoutInitiator {
    client: Client,
    base_url: String,
}

impl HttpCheckoutInitiator {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CheckoutInitiator for HttpCheckoutInitiator {
    async fn create_checkout_session(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CheckoutRedirect, StorefrontError> {
        let request = CheckoutRequest::new(product_id, quantity)?;
        let url = api_url(&self.base_url, "/payments/create-checkout-session");

        tracing::info!(
            product_id = %product_id,
            quantity,
            "Creating checkout session"
        );

        let response = self
            .client
            .traced_post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send POST request to {}: {}", url, e);
                StorefrontError::from(e)
            })?;

        let status = response.status();
        let text = response.text().await?;

        let body = match serde_json::from_str::<CheckoutSessionBody>(&text) {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                tracing::error!(error = %e, "Checkout session response is not JSON");
                return Err(StorefrontError::Application(
                    CHECKOUT_FALLBACK_MESSAGE.to_string(),
                ));
            }
            Err(_) => {
                tracing::warn!(status = %status, "Checkout session failed without a body");
                return Err(StorefrontError::Network(format!(
                    "create checkout session failed with status {}",
                    status
                )));
            }
        };

        session_outcome(status.is_success(), body)
    }
}

fn session_outcome(
    success: bool,
    body: CheckoutSessionBody,
) -> Result<CheckoutRedirect, StorefrontError> {
    if success {
        if let Some(url) = body.url.as_deref().and_then(valid_redirect) {
            tracing::info!(url = %url, "Checkout session created");
            return Ok(CheckoutRedirect { url });
        }
    }

    let message = body
        .error
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| {
            tracing::warn!(url = ?body.url, "Checkout session response has no usable URL");
            CHECKOUT_FALLBACK_MESSAGE.to_string()
        });
    Err(StorefrontError::Application(message))
}

fn valid_redirect(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}
