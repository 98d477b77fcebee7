use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::StorefrontError;
use crate::models::ProductId;

/// Body of `POST /api/payments/create-checkout-session`.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub product_id: ProductId,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,
}

impl CheckoutRequest {
    pub fn new(product_id: ProductId, quantity: i64) -> Result<Self, StorefrontError> {
        let request = Self {
            product_id,
            quantity,
        };
        request.validate()?;
        Ok(request)
    }
}

/// Session endpoint reply. Either field may be missing or both present.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutSessionBody {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Parse the purchase quantity typed by the shopper.
pub fn parse_checkout_quantity(raw: &str) -> Result<i64, StorefrontError> {
    let quantity = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| StorefrontError::validation("Quantity must be a whole number"))?;
    if quantity <= 0 {
        return Err(StorefrontError::validation("Quantity must be at least 1"));
    }
    Ok(quantity)
}
