use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::ProductId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorefrontError {
    /// Transport failure, timeout, or a non-2xx answer without a readable error body.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend refused the request and said why. The message is shown verbatim.
    #[error("{0}")]
    Application(String),

    /// Client-side precondition failure. Nothing was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Product {0} not found")]
    NotFound(ProductId),

    #[error("Another change is still in progress")]
    WriteInFlight,

    #[error("View has been disposed")]
    Disposed,
}

impl StorefrontError {
    pub fn validation(message: impl Into<String>) -> Self {
        StorefrontError::Validation(message.into())
    }

    /// Text for the user-visible notice. Backend and validation reasons are
    /// shown as-is, everything else collapses to `fallback`.
    pub fn notice_text(&self, fallback: &str) -> String {
        match self {
            StorefrontError::Application(message) | StorefrontError::Validation(message) => {
                message.clone()
            }
            StorefrontError::WriteInFlight | StorefrontError::Disposed => self.to_string(),
            StorefrontError::Network(_) | StorefrontError::NotFound(_) => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for StorefrontError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StorefrontError::Network(format!("request timed out: {}", err))
        } else if err.is_decode() {
            StorefrontError::Network(format!("unreadable response body: {}", err))
        } else {
            StorefrontError::Network(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for StorefrontError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
            })
            .collect::<Vec<_>>()
            .join(", ");
        StorefrontError::Validation(message)
    }
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        let status = match &self {
            StorefrontError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StorefrontError::NotFound(_) => StatusCode::NOT_FOUND,
            StorefrontError::WriteInFlight => StatusCode::CONFLICT,
            StorefrontError::Disposed => StatusCode::SERVICE_UNAVAILABLE,
            StorefrontError::Application(_) | StorefrontError::Network(_) => {
                StatusCode::BAD_GATEWAY
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
