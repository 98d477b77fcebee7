use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn init_metrics() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("Metrics recorder already initialized"))
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// A snapshot fetch was issued for `view`.
pub fn record_fetch(view: &'static str) {
    counter!("storefront_fetches_total", "view" => view).increment(1);
}

/// A fetch completed after a newer one was issued and its result was dropped.
pub fn record_stale_response(view: &'static str) {
    counter!("storefront_stale_responses_total", "view" => view).increment(1);
}

/// A write was refused because another one was still running.
pub fn record_rejected_write(view: &'static str) {
    counter!("storefront_rejected_writes_total", "view" => view).increment(1);
}
