//! # Prometheus Metrics
//!
//! Request metrics and registry operation counters, recorded through the
//! `metrics` facade. When no recorder is installed the macros are no-ops,
//! so handlers record unconditionally.
//!
//! | Metric | Kind | Labels |
//! |--------|------|--------|
//! | `idreg_http_requests_total` | counter | `method`, `route`, `status` |
//! | `idreg_http_request_duration_seconds` | histogram | `method`, `route` |
//! | `idreg_operations_total` | counter | `operation`, `outcome` |
//! | `idreg_identities_bound` | gauge | |

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use idreg_state::RegistryError;

/// Middleware that records request count and latency per matched route.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    metrics::counter!(
        "idreg_http_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "idreg_http_request_duration_seconds",
        "method" => method,
        "route" => route
    )
    .record(start.elapsed().as_secs_f64());

    response
}

/// Count one registry operation by outcome: `ok` or the error name.
pub fn record_operation<T>(operation: &'static str, result: &Result<T, RegistryError>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(err) => err.name(),
    };
    metrics::counter!(
        "idreg_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

/// Publish the current number of bound identities.
pub fn set_identities_bound(count: usize) {
    metrics::gauge!("idreg_identities_bound").set(count as f64);
}
