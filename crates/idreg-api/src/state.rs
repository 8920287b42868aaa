//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! The registry sits behind one `parking_lot::Mutex`. Each handler takes
//! the lock once, runs its entire check-then-write sequence, and releases
//! it before responding, so concurrent requests observe the same total
//! order of transactions a single-threaded ledger would. The lock is never
//! held across an `.await`.

use std::sync::Arc;

use idreg_state::{LedgerHeight, Registry};
use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::Mutex;

use crate::config::AppConfig;

/// The registry as shared between handlers.
pub type SharedRegistry = Arc<Mutex<Registry<LedgerHeight>>>;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// The one registry instance for this process.
    pub registry: SharedRegistry,
    /// Service configuration.
    pub config: AppConfig,
    /// Prometheus render handle, when metrics are enabled.
    pub metrics: Option<PrometheusHandle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create state with default configuration and metrics disabled.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create state with a fresh registry built from `config`.
    pub fn with_config(config: AppConfig) -> Self {
        let registry = Registry::with_heights(
            config.genesis_admin.clone(),
            LedgerHeight::starting_at(config.start_height),
        );
        Self {
            registry: Arc::new(Mutex::new(registry)),
            config,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle used to render `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
