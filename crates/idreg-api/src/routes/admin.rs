//! # Admin Routes
//!
//! Routes:
//! - GET  /v1/admin — current admin and registry status
//! - POST /v1/admin/transfer — hand admin rights to another principal

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use idreg_core::Principal;
use idreg_state::{LedgerHeight, Registry};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::with_registry;
use crate::auth::CallerPrincipal;
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Admin transfer request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferAdminRequest {
    pub new_admin: String,
}

/// Registry status as seen by operators.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminStatusResponse {
    /// Current administrator.
    pub admin: String,
    /// Height the next transaction will execute at.
    pub height: u64,
    /// Number of principals with a record, revoked ones included.
    pub identities_bound: usize,
}

impl AdminStatusResponse {
    fn from_registry(registry: &Registry<LedgerHeight>) -> Self {
        Self {
            admin: registry.admin().to_string(),
            height: registry.height().get(),
            identities_bound: registry.len(),
        }
    }
}

/// Build the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/admin", get(get_admin))
        .route("/v1/admin/transfer", post(transfer_admin))
}

/// GET /v1/admin — Current admin and registry status.
#[utoipa::path(
    get,
    path = "/v1/admin",
    responses(
        (status = 200, description = "Registry status", body = AdminStatusResponse),
    ),
    tag = "admin"
)]
pub async fn get_admin(State(state): State<AppState>) -> Json<AdminStatusResponse> {
    let registry = state.registry.lock();
    Json(AdminStatusResponse::from_registry(&registry))
}

/// POST /v1/admin/transfer — Transfer admin rights.
#[utoipa::path(
    post,
    path = "/v1/admin/transfer",
    request_body = TransferAdminRequest,
    params(("X-Caller-Principal" = String, Header, description = "Authenticated caller")),
    responses(
        (status = 200, description = "Admin transferred", body = AdminStatusResponse),
        (status = 403, description = "Caller is not admin (105)", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
pub async fn transfer_admin(
    State(state): State<AppState>,
    caller: CallerPrincipal,
    body: Result<Json<TransferAdminRequest>, JsonRejection>,
) -> Result<Json<AdminStatusResponse>, AppError> {
    let req = extract_json(body)?;
    let new_admin = Principal::new(req.new_admin)?;

    let status = with_registry(&state, "transfer_admin", |registry| {
        registry.transfer_admin(&caller, new_admin)?;
        Ok(AdminStatusResponse::from_registry(registry))
    })?;

    tracing::info!(
        caller = %caller.0,
        new_admin = %status.admin,
        height = status.height,
        "admin rights transferred"
    );
    Ok(Json(status))
}
