use serde::Deserialize;
use std::time::Duration;
use storefront_core::config::{load_settings, TelemetryConfig};

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub presentation: PresentationSettings,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BackendSettings {
    /// Origin of the product/payment service, without the `/api` suffix.
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl BackendSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_request_timeout_secs() -> u64 {
    15
}

#[derive(Deserialize, Clone, Debug)]
pub struct PresentationSettings {
    /// Prefix for bare image file names returned by the backend.
    #[serde(default = "default_uploads_prefix")]
    pub uploads_prefix: String,
    #[serde(default = "default_placeholder_image_url")]
    pub placeholder_image_url: String,
    /// Seconds a notice stays visible before it expires on its own.
    #[serde(default = "default_notice_ttl_secs")]
    pub notice_ttl_secs: u64,
}

impl PresentationSettings {
    pub fn notice_ttl(&self) -> Duration {
        Duration::from_secs(self.notice_ttl_secs)
    }
}

impl Default for PresentationSettings {
    fn default() -> Self {
        Self {
            uploads_prefix: default_uploads_prefix(),
            placeholder_image_url: default_placeholder_image_url(),
            notice_ttl_secs: default_notice_ttl_secs(),
        }
    }
}

fn default_uploads_prefix() -> String {
    "/uploads/".to_string()
}

fn default_placeholder_image_url() -> String {
    "https://via.placeholder.com/300?text=Image+Not+Found".to_string()
}

fn default_notice_ttl_secs() -> u64 {
    5
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("Cannot read current dir: {}", e)))?;

    // Works both from the workspace root and from inside the crate directory
    let configuration_directory = if base_path.ends_with("storefront") {
        base_path.join("config")
    } else {
        base_path.join("storefront").join("config")
    };

    load_settings(&configuration_directory)
}
