//! W3C trace context for calls to the storefront backend.
//!
//! Requests built through [`TracedClientExt`] are stamped with the current
//! span's `traceparent` (and `tracestate` when non-empty) so backend logs can
//! be joined to the storefront action that caused them.
//!
//! See: https://www.w3.org/TR/trace-context/

use opentelemetry::trace::TraceContextExt;
use reqwest::RequestBuilder;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub const TRACEPARENT_HEADER: &str = "traceparent";
pub const TRACESTATE_HEADER: &str = "tracestate";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Trace headers for the current span. Empty when OTLP export is off, since
/// spans then carry no valid OpenTelemetry context.
pub fn current_trace_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    let context = Span::current().context();
    let span_ref = context.span();
    let span_context = span_ref.span_context();

    if !span_context.is_valid() {
        return headers;
    }

    let traceparent = format!(
        "00-{}-{}-{:02x}",
        span_context.trace_id(),
        span_context.span_id(),
        span_context.trace_flags().to_u8()
    );
    if let Ok(value) = HeaderValue::from_str(&traceparent) {
        headers.insert(TRACEPARENT_HEADER, value);
    }

    let state = span_context.trace_state().header();
    if !state.is_empty()
        && let Ok(value) = HeaderValue::from_str(&state)
    {
        headers.insert(TRACESTATE_HEADER, value);
    }

    headers
}

/// Stamp a request with [`current_trace_headers`].
pub trait WithTraceContext {
    fn with_trace_context(self) -> Self;
}

impl WithTraceContext for RequestBuilder {
    fn with_trace_context(self) -> Self {
        self.headers(current_trace_headers())
    }
}

/// `get`/`post`/`put` that start out carrying the caller's trace context.
pub trait TracedClientExt {
    fn traced_get(&self, url: &str) -> RequestBuilder;
    fn traced_post(&self, url: &str) -> RequestBuilder;
    fn traced_put(&self, url: &str) -> RequestBuilder;
}

impl TracedClientExt for reqwest::Client {
    fn traced_get(&self, url: &str) -> RequestBuilder {
        self.get(url).with_trace_context()
    }

    fn traced_post(&self, url: &str) -> RequestBuilder {
        self.post(url).with_trace_context()
    }

    fn traced_put(&self, url: &str) -> RequestBuilder {
        self.put(url).with_trace_context()
    }
}
