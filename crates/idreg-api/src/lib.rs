//! # idreg-api — HTTP Service for the Identity Registry
//!
//! Exposes the registry's five operations and its read queries over HTTP.
//! Handlers translate JSON to registry calls and registry errors to
//! structured responses; every authorization decision is made by
//! [`idreg_state::Registry`] itself.
//!
//! ## API Surface
//!
//! | Route | Handler |
//! |-------|---------|
//! | `POST /v1/identities` | [`routes::identity::bind_identity`] |
//! | `GET /v1/identities/{principal}` | [`routes::identity::get_identity_record`] |
//! | `GET /v1/identities/{principal}/bound` | [`routes::identity::is_identity_bound`] |
//! | `GET /v1/identities/{principal}/hash` | [`routes::identity::get_identity_hash`] |
//! | `POST /v1/identities/{principal}/revoke` | [`routes::identity::revoke_identity`] |
//! | `POST /v1/identities/{principal}/recover` | [`routes::identity::recover_identity`] |
//! | `GET /v1/admin` | [`routes::admin::get_admin`] |
//! | `POST /v1/admin/transfer` | [`routes::admin::transfer_admin`] |
//! | `GET /v1/events` | [`routes::events::list_events`] |
//!
//! `/health/*` and `/metrics` are mounted outside the auth middleware.
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;

pub use config::{AppConfig, ConfigError};
pub use error::AppError;
pub use state::AppState;

/// Maximum accepted request body size.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes and `/metrics` are mounted outside the auth middleware
/// so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::identity::router())
        .merge(routes::admin::router())
        .merge(routes::events::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .with_state(state.clone());

    // Unauthenticated operational routes.
    let ops = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(render_metrics))
        .with_state(state);

    Router::new().merge(ops).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — 200 when the registry lock is free right now. Never
/// blocks the worker thread.
async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.registry.try_lock() {
        Some(_) => (StatusCode::OK, "ready"),
        None => {
            tracing::warn!("readiness check failed: registry lock busy");
            (StatusCode::SERVICE_UNAVAILABLE, "registry busy")
        }
    }
}

/// GET /metrics — Prometheus text exposition.
async fn render_metrics(State(state): State<AppState>) -> Result<String, AppError> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or_else(|| AppError::ServiceUnavailable("metrics are disabled".into()))
}
