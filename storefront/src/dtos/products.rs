use serde::Serialize;
use validator::Validate;

use crate::error::StorefrontError;

/// Add-product form exactly as the operator typed it.
#[derive(Debug, Default, Clone, Validate)]
pub struct ProductDraft {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    pub description: String,
    #[validate(length(min = 1, message = "Price is required"))]
    pub price: String,
    #[validate(length(min = 1, message = "Available quantity is required"))]
    pub available_quantity: String,
    pub image: Option<ProductImage>,
}

/// Image attached to a new product, sent as the `productImage` part.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductImage {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A product ready to submit. Only presence and number format are checked
/// here; the backend decides everything else.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub available_quantity: u32,
    pub image: Option<ProductImage>,
}

impl ProductDraft {
    pub fn into_new_product(self) -> Result<NewProduct, StorefrontError> {
        let draft = ProductDraft {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price.trim().to_string(),
            available_quantity: self.available_quantity.trim().to_string(),
            image: self.image,
        };
        draft.validate()?;

        let price = draft
            .price
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .ok_or_else(|| StorefrontError::validation("Price must be a number"))?;
        let available_quantity = parse_stock_quantity(&draft.available_quantity)?;

        Ok(NewProduct {
            name: draft.name,
            description: draft.description,
            price,
            available_quantity,
            image: draft.image.filter(|image| !image.bytes.is_empty()),
        })
    }
}

/// Body of `PUT /api/products/stock/{id}`.
#[derive(Debug, Serialize)]
pub struct StockUpdate {
    pub quantity: u32,
}

/// Parse a stock level typed by the operator.
pub fn parse_stock_quantity(raw: &str) -> Result<u32, StorefrontError> {
    raw.trim().parse::<u32>().map_err(|_| {
        StorefrontError::validation("Quantity must be a whole number of 0 or more")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, price: &str, quantity: &str) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            description: "desc".to_string(),
            price: price.to_string(),
            available_quantity: quantity.to_string(),
            image: None,
        }
    }

    #[test]
    fn complete_draft_becomes_new_product() {
        let product = draft(" Lamp ", "19.99", " 4 ").into_new_product().unwrap();
        assert_eq!(product.name, "Lamp");
        assert_eq!(product.price, 19.99);
        assert_eq!(product.available_quantity, 4);
    }

    #[test]
    fn missing_fields_are_rejected() {
        let err = draft("", "1", "1").into_new_product().unwrap_err();
        assert_eq!(err, StorefrontError::validation("Product name is required"));

        let err = draft("Lamp", "  ", "1").into_new_product().unwrap_err();
        assert_eq!(err, StorefrontError::validation("Price is required"));
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        assert!(draft("Lamp", "cheap", "1").into_new_product().is_err());
        assert!(draft("Lamp", "NaN", "1").into_new_product().is_err());
        assert!(draft("Lamp", "1", "2.5").into_new_product().is_err());
        assert!(draft("Lamp", "1", "-3").into_new_product().is_err());
    }

    #[test]
    fn empty_image_is_dropped() {
        let mut d = draft("Lamp", "1", "1");
        d.image = Some(ProductImage {
            file_name: "empty.png".to_string(),
            content_type: None,
            bytes: vec![],
        });
        assert!(d.into_new_product().unwrap().image.is_none());
    }

    #[test]
    fn stock_quantity_accepts_zero() {
        assert_eq!(parse_stock_quantity("0").unwrap(), 0);
        assert_eq!(parse_stock_quantity(" 12 ").unwrap(), 12);
        assert!(parse_stock_quantity("").is_err());
        assert!(parse_stock_quantity("ten").is_err());
    }
}
