//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the gateway Bearer token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Gateway token, required when IDREG_AUTH_TOKEN is set.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Assembled OpenAPI spec for the registry API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Identity Registry API",
        description = "Binds one identity hash per principal, with admin revocation, guardian recovery, and admin transfer.\n\nMutating endpoints act on behalf of the principal in the `X-Caller-Principal` header. Registry rejections carry a numeric `registry_code` (100-105).",
        license(name = "AGPL-3.0-or-later")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    paths(
        crate::routes::identity::bind_identity,
        crate::routes::identity::get_identity_record,
        crate::routes::identity::is_identity_bound,
        crate::routes::identity::get_identity_hash,
        crate::routes::identity::revoke_identity,
        crate::routes::identity::recover_identity,
        crate::routes::admin::get_admin,
        crate::routes::admin::transfer_admin,
        crate::routes::events::list_events,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            crate::routes::identity::BindIdentityRequest,
            crate::routes::identity::RecoverIdentityRequest,
            crate::routes::identity::IdentityRecordView,
            crate::routes::identity::BoundResponse,
            crate::routes::identity::IdentityHashResponse,
            crate::routes::admin::TransferAdminRequest,
            crate::routes::admin::AdminStatusResponse,
            crate::routes::events::EventsResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "identity", description = "Identity binding, lookup, revocation, and guardian recovery"),
        (name = "admin", description = "Registry administrator status and transfer"),
        (name = "events", description = "Journal of committed registry transitions"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
