//! Remote inventory gateway.
//!
//! Stateless facade over the backend's product and payment endpoints. It
//! never patches or caches anything: callers refetch after every write.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use storefront_core::observability::TracedClientExt;

use super::http::{api_url, failure, read_json};
use crate::dtos::{NewProduct, StockUpdate};
use crate::error::StorefrontError;
use crate::models::{Payment, Product, ProductId};

#[async_trait]
pub trait InventoryGateway: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, StorefrontError>;

    async fn create_product(&self, product: NewProduct) -> Result<(), StorefrontError>;

    async fn update_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), StorefrontError>;

    async fn list_payments(&self) -> Result<Vec<Payment>, StorefrontError>;
}

/// Gateway speaking JSON and multipart to the product/payment backend.
#[derive(Clone)]
pub struct HttpInventoryGateway {
    client: Client,
    base_url: String,
}

impl HttpInventoryGateway {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl InventoryGateway for HttpInventoryGateway {
    async fn list_products(&self) -> Result<Vec<Product>, StorefrontError> {
        let url = api_url(&self.base_url, "/products");
        tracing::debug!(url = %url, "Fetching products");

        let response = self
            .client
            .traced_get(&url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send GET request to {}: {}", url, e);
                StorefrontError::from(e)
            })?;

        let products: Vec<Product> = read_json(response, "list products").await?;
        tracing::info!(count = products.len(), "Products fetched");
        Ok(products)
    }

    async fn create_product(&self, product: NewProduct) -> Result<(), StorefrontError> {
        let url = api_url(&self.base_url, "/products/upload");
        tracing::debug!(name = %product.name, has_image = product.image.is_some(), "Uploading product");

        let mut form = Form::new()
            .text("name", product.name.clone())
            .text("description", product.description)
            .text("price", product.price.to_string())
            .text("availableQuantity", product.available_quantity.to_string());

        if let Some(image) = product.image {
            let content_type = image
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&content_type)
                .map_err(|e| StorefrontError::validation(format!("Invalid image type: {}", e)))?;
            form = form.part("productImage", part);
        }

        let response = self
            .client
            .traced_post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send POST request to {}: {}", url, e);
                StorefrontError::from(e)
            })?;

        if !response.status().is_success() {
            return Err(failure(response, "create product").await);
        }

        tracing::info!(name = %product.name, "Product created");
        Ok(())
    }

    async fn update_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), StorefrontError> {
        let url = api_url(&self.base_url, &format!("/products/stock/{}", product_id));
        tracing::debug!(product_id = %product_id, quantity, "Updating stock");

        let response = self
            .client
            .traced_put(&url)
            .json(&StockUpdate { quantity })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send PUT request to {}: {}", url, e);
                StorefrontError::from(e)
            })?;

        match response.status() {
            status if status.is_success() => {
                // The updated product in the body is ignored; the caller refetches.
                tracing::info!(product_id = %product_id, quantity, "Stock updated");
                Ok(())
            }
            StatusCode::NOT_FOUND => {
                tracing::warn!(product_id = %product_id, "Stock update for unknown product");
                Err(StorefrontError::NotFound(product_id))
            }
            _ => Err(failure(response, "update stock").await),
        }
    }

    async fn list_payments(&self) -> Result<Vec<Payment>, StorefrontError> {
        let url = api_url(&self.base_url, "/payments");
        tracing::debug!(url = %url, "Fetching payments");

        let response = self
            .client
            .traced_get(&url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send GET request to {}: {}", url, e);
                StorefrontError::from(e)
            })?;

        let payments: Vec<Payment> = read_json(response, "list payments").await?;
        tracing::info!(count = payments.len(), "Payments fetched");
        Ok(payments)
    }
}
