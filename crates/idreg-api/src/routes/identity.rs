//! # Identity Routes
//!
//! Routes:
//! - POST /v1/identities — bind an identity to the caller
//! - GET  /v1/identities/{principal} — full record
//! - GET  /v1/identities/{principal}/bound — existence check
//! - GET  /v1/identities/{principal}/hash — bound identity hash
//! - POST /v1/identities/{principal}/revoke — admin revocation
//! - POST /v1/identities/{principal}/recover — guardian recovery

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use idreg_core::{IdentityHash, Principal};
use idreg_state::IdentityRecord;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::with_registry;
use crate::auth::CallerPrincipal;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, path_principal, Validate};
use crate::state::AppState;

/// Upper bound on guardians accepted in one bind request.
pub const MAX_GUARDIANS: usize = 64;

// ── DTOs ─────────────────────────────────────────────────────────────────────

/// Bind request. The bound principal is the caller, never a body field.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BindIdentityRequest {
    /// Opaque identity commitment, stored verbatim.
    pub identity_hash: String,
    /// Attesting issuer.
    pub issued_by: String,
    /// Principals allowed to recover this identity. Duplicates collapse.
    #[serde(default)]
    pub recovery_guardians: Vec<String>,
}

impl Validate for BindIdentityRequest {
    fn validate(&self) -> Result<(), String> {
        if self.recovery_guardians.len() > MAX_GUARDIANS {
            return Err(format!(
                "at most {MAX_GUARDIANS} recovery guardians are accepted, got {}",
                self.recovery_guardians.len()
            ));
        }
        Ok(())
    }
}

/// Guardian recovery request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecoverIdentityRequest {
    /// Principal the record moves to. Must not already be bound.
    pub new_principal: String,
}

/// An identity record as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IdentityRecordView {
    pub principal: String,
    pub identity_hash: String,
    pub issued_by: String,
    /// Ledger height at which the binding was created.
    pub issued_at: u64,
    /// Guardian principals in lexicographic order.
    pub recovery_guardians: Vec<String>,
    pub is_revoked: bool,
}

impl IdentityRecordView {
    pub fn new(principal: &Principal, record: &IdentityRecord) -> Self {
        Self {
            principal: principal.to_string(),
            identity_hash: record.identity_hash().to_string(),
            issued_by: record.issued_by().to_string(),
            issued_at: record.issued_at().get(),
            recovery_guardians: record
                .recovery_guardians()
                .iter()
                .map(ToString::to_string)
                .collect(),
            is_revoked: record.is_revoked(),
        }
    }
}

/// Response for the existence check.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BoundResponse {
    pub principal: String,
    pub bound: bool,
}

/// Response carrying only the bound hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IdentityHashResponse {
    pub principal: String,
    pub identity_hash: String,
}

// ── Router ───────────────────────────────────────────────────────────────────

/// Build the identity router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/identities", post(bind_identity))
        .route("/v1/identities/{principal}", get(get_identity_record))
        .route("/v1/identities/{principal}/bound", get(is_identity_bound))
        .route("/v1/identities/{principal}/hash", get(get_identity_hash))
        .route("/v1/identities/{principal}/revoke", post(revoke_identity))
        .route("/v1/identities/{principal}/recover", post(recover_identity))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /v1/identities — Bind an identity to the caller.
#[utoipa::path(
    post,
    path = "/v1/identities",
    request_body = BindIdentityRequest,
    params(("X-Caller-Principal" = String, Header, description = "Authenticated caller")),
    responses(
        (status = 201, description = "Identity bound", body = IdentityRecordView),
        (status = 409, description = "Caller already bound (101)", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    tag = "identity"
)]
pub async fn bind_identity(
    State(state): State<AppState>,
    caller: CallerPrincipal,
    body: Result<Json<BindIdentityRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IdentityRecordView>), AppError> {
    let req = extract_validated_json(body)?;
    let identity_hash = IdentityHash::new(req.identity_hash)?;
    let issued_by = Principal::new(req.issued_by)?;
    let guardians = req
        .recovery_guardians
        .into_iter()
        .map(Principal::new)
        .collect::<Result<Vec<_>, _>>()?;

    let view = with_registry(&state, "bind", |registry| {
        registry.bind(&caller, identity_hash, issued_by, guardians)?;
        registry
            .identity_record(&caller)
            .map(|record| IdentityRecordView::new(&caller, record))
    })?;

    tracing::info!(
        caller = %caller.0,
        issued_by = %view.issued_by,
        height = view.issued_at,
        "identity bound"
    );
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /v1/identities/{principal} — Full identity record.
#[utoipa::path(
    get,
    path = "/v1/identities/{principal}",
    params(("principal" = String, Path, description = "Bound principal")),
    responses(
        (status = 200, description = "Identity record", body = IdentityRecordView),
        (status = 404, description = "Not bound (102)", body = crate::error::ErrorBody),
    ),
    tag = "identity"
)]
pub async fn get_identity_record(
    State(state): State<AppState>,
    Path(principal): Path<String>,
) -> Result<Json<IdentityRecordView>, AppError> {
    let principal = path_principal(principal)?;
    let registry = state.registry.lock();
    let record = registry.identity_record(&principal)?;
    Ok(Json(IdentityRecordView::new(&principal, record)))
}

/// GET /v1/identities/{principal}/bound — Existence check. Never fails.
#[utoipa::path(
    get,
    path = "/v1/identities/{principal}/bound",
    params(("principal" = String, Path, description = "Principal to check")),
    responses(
        (status = 200, description = "Whether a record exists", body = BoundResponse),
    ),
    tag = "identity"
)]
pub async fn is_identity_bound(
    State(state): State<AppState>,
    Path(principal): Path<String>,
) -> Result<Json<BoundResponse>, AppError> {
    let principal = path_principal(principal)?;
    let bound = state.registry.lock().is_identity_bound(&principal);
    Ok(Json(BoundResponse {
        principal: principal.to_string(),
        bound,
    }))
}

/// GET /v1/identities/{principal}/hash — Bound identity hash.
#[utoipa::path(
    get,
    path = "/v1/identities/{principal}/hash",
    params(("principal" = String, Path, description = "Bound principal")),
    responses(
        (status = 200, description = "Identity hash", body = IdentityHashResponse),
        (status = 404, description = "Not bound (102)", body = crate::error::ErrorBody),
    ),
    tag = "identity"
)]
pub async fn get_identity_hash(
    State(state): State<AppState>,
    Path(principal): Path<String>,
) -> Result<Json<IdentityHashResponse>, AppError> {
    let principal = path_principal(principal)?;
    let registry = state.registry.lock();
    let identity_hash = registry.get_identity_hash(&principal)?.to_string();
    Ok(Json(IdentityHashResponse {
        principal: principal.to_string(),
        identity_hash,
    }))
}

/// POST /v1/identities/{principal}/revoke — Admin-only revocation.
#[utoipa::path(
    post,
    path = "/v1/identities/{principal}/revoke",
    params(
        ("principal" = String, Path, description = "Principal to revoke"),
        ("X-Caller-Principal" = String, Header, description = "Authenticated caller"),
    ),
    responses(
        (status = 200, description = "Identity revoked", body = IdentityRecordView),
        (status = 403, description = "Caller is not admin (100)", body = crate::error::ErrorBody),
        (status = 404, description = "Not bound (102)", body = crate::error::ErrorBody),
    ),
    tag = "identity"
)]
pub async fn revoke_identity(
    State(state): State<AppState>,
    caller: CallerPrincipal,
    Path(principal): Path<String>,
) -> Result<Json<IdentityRecordView>, AppError> {
    let user = path_principal(principal)?;

    let view = with_registry(&state, "revoke", |registry| {
        registry.revoke_identity(&caller, &user)?;
        registry
            .identity_record(&user)
            .map(|record| IdentityRecordView::new(&user, record))
    })?;

    tracing::info!(caller = %caller.0, principal = %user, "identity revoked");
    Ok(Json(view))
}

/// POST /v1/identities/{principal}/recover — Guardian recovery.
///
/// Moves the record, revocation flag included, to `new_principal`.
#[utoipa::path(
    post,
    path = "/v1/identities/{principal}/recover",
    request_body = RecoverIdentityRequest,
    params(
        ("principal" = String, Path, description = "Principal whose key was lost"),
        ("X-Caller-Principal" = String, Header, description = "Authenticated caller"),
    ),
    responses(
        (status = 200, description = "Record moved", body = IdentityRecordView),
        (status = 403, description = "Caller is not a guardian (103)", body = crate::error::ErrorBody),
        (status = 404, description = "Lost principal not bound (102)", body = crate::error::ErrorBody),
        (status = 409, description = "Target already bound (104)", body = crate::error::ErrorBody),
    ),
    tag = "identity"
)]
pub async fn recover_identity(
    State(state): State<AppState>,
    caller: CallerPrincipal,
    Path(principal): Path<String>,
    body: Result<Json<RecoverIdentityRequest>, JsonRejection>,
) -> Result<Json<IdentityRecordView>, AppError> {
    let lost = path_principal(principal)?;
    let req = crate::extractors::extract_json(body)?;
    let new_principal = Principal::new(req.new_principal)?;

    let view = with_registry(&state, "recover", |registry| {
        registry.recover_identity(&caller, &lost, &new_principal)?;
        registry
            .identity_record(&new_principal)
            .map(|record| IdentityRecordView::new(&new_principal, record))
    })?;

    tracing::info!(
        caller = %caller.0,
        principal = %lost,
        new_principal = %new_principal,
        "identity recovered"
    );
    Ok(Json(view))
}
