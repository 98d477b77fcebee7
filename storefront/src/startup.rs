use axum::{
    middleware::from_fn,
    routing::{delete, get, post, put},
    Router,
};
use storefront_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    app::{health_check, metrics_handler},
    inventory::{
        add_product, dismiss_inventory_notice, get_inventory, purchase, refresh_inventory,
        update_stock,
    },
    payments::{dismiss_payment_notice, get_payments, refresh_payments},
    sections::show_section,
};
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/sections/:section", get(show_section))
        .route("/inventory", get(get_inventory))
        .route("/inventory/refresh", post(refresh_inventory))
        .route("/inventory/products", post(add_product))
        .route("/inventory/products/:id/stock", put(update_stock))
        .route("/inventory/products/:id/purchase", post(purchase))
        .route("/inventory/notices/:id", delete(dismiss_inventory_notice))
        .route("/payments", get(get_payments))
        .route("/payments/refresh", post(refresh_payments))
        .route("/payments/notices/:id", delete(dismiss_payment_notice))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
