//! # Route Modules
//!
//! Each module defines an Axum Router for one API surface area.
//! Routers are assembled in [`crate::app`].

pub mod admin;
pub mod events;
pub mod identity;

use idreg_state::{LedgerHeight, Registry, RegistryError};

use crate::error::AppError;
use crate::middleware::metrics::{record_operation, set_identities_bound};
use crate::state::AppState;

/// Run one mutating registry operation under the registry lock.
///
/// The whole check-then-write sequence inside `op` executes while the lock
/// is held, and the lock is released before this returns. The outcome is
/// counted and rejections are logged with their numeric code.
pub(crate) fn with_registry<T>(
    state: &AppState,
    operation: &'static str,
    op: impl FnOnce(&mut Registry<LedgerHeight>) -> Result<T, RegistryError>,
) -> Result<T, AppError> {
    let result = {
        let mut registry = state.registry.lock();
        let result = op(&mut registry);
        if result.is_ok() {
            set_identities_bound(registry.len());
        }
        result
    };

    record_operation(operation, &result);
    if let Err(err) = &result {
        tracing::warn!(operation, code = err.code(), error = %err, "registry rejected operation");
    }
    result.map_err(AppError::from)
}
