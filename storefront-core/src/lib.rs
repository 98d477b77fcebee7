//! storefront-core: Shared infrastructure for the storefront client.
pub mod config;
pub mod middleware;
pub mod observability;

pub use axum;
pub use reqwest;
pub use tracing;
