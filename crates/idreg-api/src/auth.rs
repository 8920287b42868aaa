//! # Authentication
//!
//! Two independent checks run on every `/v1/*` request:
//!
//! 1. **Gateway token.** When `IDREG_AUTH_TOKEN` is configured, the request
//!    must carry `Authorization: Bearer <token>`. This proves the request
//!    came through the trusted gateway, not who the caller is.
//! 2. **Caller principal.** The gateway forwards the authenticated caller in
//!    the `X-Caller-Principal` header. Mutating handlers read it through the
//!    [`CallerPrincipal`] extractor and pass it to the registry, which makes
//!    every authorization decision itself.

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use idreg_core::Principal;
use subtle::ConstantTimeEq;

use crate::error::AppError;

/// Header carrying the authenticated caller's principal.
pub const CALLER_HEADER: &str = "x-caller-principal";

// ── Caller Principal ────────────────────────────────────────────────────────

/// The principal on whose behalf the request executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerPrincipal(pub Principal);

impl std::ops::Deref for CallerPrincipal {
    type Target = Principal;

    fn deref(&self) -> &Principal {
        &self.0
    }
}

/// Reads the caller from [`CALLER_HEADER`]. A missing header is 401; a
/// present but malformed one is 422.
impl<S: Send + Sync> FromRequestParts<S> for CallerPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts.headers.get(CALLER_HEADER).ok_or_else(|| {
            AppError::Unauthorized(format!("missing {} header", CALLER_HEADER))
        })?;
        let value = value.to_str().map_err(|_| {
            AppError::Validation(format!("{} header is not valid UTF-8", CALLER_HEADER))
        })?;
        Ok(Self(Principal::new(value)?))
    }
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value to prevent credential leakage in logs.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Token Validation ────────────────────────────────────────────────────────

/// Constant-time comparison of bearer tokens.
///
/// When lengths differ, performs a dummy comparison so timing does not
/// depend on where the mismatch is.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Check the gateway bearer token when one is configured.
///
/// When `AuthConfig.token` is `None` (or no config is installed), every
/// request passes through.
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|c| c.token.clone());

    let Some(expected) = expected else {
        return next.run(request).await;
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(provided) if constant_time_token_eq(provided, &expected) => next.run(request).await,
        Some(_) => {
            tracing::warn!("authentication failed: invalid bearer token");
            AppError::Unauthorized("invalid bearer token".into()).into_response()
        }
        None if auth_header.is_some() => {
            tracing::warn!("authentication failed: non-Bearer authorization scheme");
            AppError::Unauthorized("authorization header must use Bearer scheme".into())
                .into_response()
        }
        None => {
            tracing::warn!("authentication failed: missing authorization header");
            AppError::Unauthorized("missing authorization header".into()).into_response()
        }
    }
}
