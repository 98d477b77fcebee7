use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{Json, Redirect},
};
use serde::Deserialize;
use serde_json::Value;

use crate::dtos::{ProductDraft, ProductImage};
use crate::error::StorefrontError;
use crate::models::ProductId;
use crate::view_models::InventoryView;
use crate::AppState;

/// `{ "quantity": ... }` as sent by a form: either the raw text or a number.
#[derive(Debug, Deserialize)]
pub struct QuantityBody {
    #[serde(default)]
    pub quantity: Value,
}

impl QuantityBody {
    fn raw(&self) -> String {
        match &self.quantity {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        }
    }
}

pub async fn get_inventory(State(state): State<AppState>) -> Json<InventoryView> {
    Json(state.storefront.inventory.view())
}

pub async fn refresh_inventory(
    State(state): State<AppState>,
) -> Result<Json<InventoryView>, StorefrontError> {
    state.storefront.inventory.refresh().await?;
    Ok(Json(state.storefront.inventory.view()))
}

pub async fn add_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<InventoryView>), StorefrontError> {
    let draft = read_product_form(multipart).await?;
    tracing::info!(name = %draft.name, has_image = draft.image.is_some(), "Add product submitted");

    state.storefront.inventory.add_product(draft).await?;
    Ok((StatusCode::CREATED, Json(state.storefront.inventory.view())))
}

pub async fn update_stock(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Json(body): Json<QuantityBody>,
) -> Result<Json<InventoryView>, StorefrontError> {
    state
        .storefront
        .inventory
        .submit_stock_form(product_id, &body.raw())
        .await?;
    Ok(Json(state.storefront.inventory.view()))
}

pub async fn purchase(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Json(body): Json<QuantityBody>,
) -> Result<Redirect, StorefrontError> {
    let redirect = state
        .storefront
        .inventory
        .purchase(product_id, &body.raw())
        .await?;

    tracing::info!(%product_id, url = %redirect.url, "Redirecting to checkout");
    Ok(Redirect::to(&redirect.url))
}

pub async fn dismiss_inventory_notice(
    State(state): State<AppState>,
    Path(notice_id): Path<u64>,
) -> StatusCode {
    if state.storefront.inventory.dismiss_notice(notice_id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Collect the add-product form. Unknown parts are skipped.
async fn read_product_form(mut multipart: Multipart) -> Result<ProductDraft, StorefrontError> {
    let mut draft = ProductDraft::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => draft.name = field.text().await.map_err(malformed)?,
            "description" => draft.description = field.text().await.map_err(malformed)?,
            "price" => draft.price = field.text().await.map_err(malformed)?,
            "availableQuantity" => {
                draft.available_quantity = field.text().await.map_err(malformed)?
            }
            "productImage" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(malformed)?;
                draft.image = Some(ProductImage {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            other => tracing::debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    Ok(draft)
}

fn malformed(err: axum::extract::multipart::MultipartError) -> StorefrontError {
    tracing::warn!(error = %err, "Malformed add-product form");
    StorefrontError::validation(format!("Malformed form: {}", err))
}
