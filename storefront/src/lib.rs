pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod shell;
pub mod view_models;

use std::sync::Arc;
use shell::Storefront;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub storefront: Arc<Storefront>,
}

impl AppState {
    pub fn new(storefront: Storefront) -> Self {
        Self {
            storefront: Arc::new(storefront),
        }
    }
}
