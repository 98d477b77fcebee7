use crate::services::metrics::get_metrics;

pub async fn health_check() -> &'static str {
    "OK"
}

/// Prometheus text exposition of every recorded storefront metric.
pub async fn metrics_handler() -> String {
    get_metrics()
}
