use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::BackendSettings;
use crate::error::StorefrontError;

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Build the reqwest client shared by the gateway and the checkout initiator.
pub fn build_client(settings: &BackendSettings) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(settings.request_timeout())
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))
}

pub(crate) fn api_url(base_url: &str, path: &str) -> String {
    format!("{}/api{}", base_url.trim_end_matches('/'), path)
}

/// Turn a non-2xx response into an error: a readable `{error}` body becomes
/// `Application`, anything else `Network`.
pub(crate) async fn failure(response: Response, operation: &str) -> StorefrontError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody {
            error: Some(message),
        }) if !message.trim().is_empty() => {
            tracing::warn!(operation, status = %status, error = %message, "Backend rejected request");
            StorefrontError::Application(message)
        }
        _ => {
            tracing::warn!(operation, status = %status, "Backend returned an error without a body");
            StorefrontError::Network(format!("{} failed with status {}", operation, status))
        }
    }
}

/// Read a successful JSON response, or map the failure.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    operation: &str,
) -> Result<T, StorefrontError> {
    if !response.status().is_success() {
        return Err(failure(response, operation).await);
    }

    let body = response.text().await?;
    tracing::debug!(operation, bytes = body.len(), "Backend response received");

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(operation, error = %e, "Failed to decode backend response");
        StorefrontError::Network(format!("{} returned an unreadable body: {}", operation, e))
    })
}
