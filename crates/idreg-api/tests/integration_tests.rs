//! HTTP-level tests for the registry API: every route, every registry
//! error code, gateway auth, and the operational endpoints.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use idreg_api::{app, AppConfig, AppState};
use idreg_core::{IdentityHash, Principal, GENESIS_ADMIN};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> axum::Router {
    app(AppState::new())
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_as(caller: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-caller-principal", caller)
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn post_empty_as(caller: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-caller-principal", caller)
        .body(Body::empty())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn bind(app: &axum::Router, caller: &str, hash: &str, guardians: &[&str]) -> StatusCode {
    app.clone()
        .oneshot(post_as(
            caller,
            "/v1/identities",
            json!({
                "identity_hash": hash,
                "issued_by": "STISSUER",
                "recovery_guardians": guardians,
            }),
        ))
        .await
        .unwrap()
        .status()
}

async fn assert_registry_error(response: axum::http::Response<Body>, status: StatusCode, code: u64) {
    assert_eq!(response.status(), status);
    let body = body_json(response).await;
    assert_eq!(body["error"]["registry_code"], code, "body: {body}");
}

// ── Health & operational ────────────────────────────────────────────

#[tokio::test]
async fn health_probes_respond() {
    let app = test_app();
    let live = app.clone().oneshot(get("/health/liveness")).await.unwrap();
    assert_eq!(live.status(), StatusCode::OK);
    let ready = app.oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
async fn readiness_reports_busy_without_waiting_for_the_lock() {
    let state = AppState::new();
    let app = app(state.clone());
    let guard = state.registry.lock();
    let started = std::time::Instant::now();
    let ready = app.clone().oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(started.elapsed() < std::time::Duration::from_millis(200));
    drop(guard);

    let ready = app.oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
async fn metrics_disabled_returns_503() {
    let response = test_app().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn metrics_enabled_renders() {
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let app = app(AppState::new().with_metrics(handle));
    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn openapi_json_served() {
    let response = test_app().oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/v1/identities"].is_object());
}

// ── Bind & reads ────────────────────────────────────────────────────

#[tokio::test]
async fn bind_then_read_back() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(post_as(
            "ST1USER",
            "/v1/identities",
            json!({
                "identity_hash": "0xabc",
                "issued_by": "ST1ISSUER",
                "recovery_guardians": ["ST1G2", "ST1G1", "ST1G1"],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["principal"], "ST1USER");
    assert_eq!(created["identity_hash"], "0xabc");
    assert_eq!(created["issued_by"], "ST1ISSUER");
    assert_eq!(created["issued_at"], 1);
    assert_eq!(created["recovery_guardians"], json!(["ST1G1", "ST1G2"]));
    assert_eq!(created["is_revoked"], false);

    let record = body_json(app.clone().oneshot(get("/v1/identities/ST1USER")).await.unwrap()).await;
    assert_eq!(record, created);

    let bound = body_json(app.clone().oneshot(get("/v1/identities/ST1USER/bound")).await.unwrap()).await;
    assert_eq!(bound["bound"], true);

    let hash = body_json(app.oneshot(get("/v1/identities/ST1USER/hash")).await.unwrap()).await;
    assert_eq!(hash["identity_hash"], "0xabc");
}

#[tokio::test]
async fn bind_without_caller_is_unauthorized() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/identities")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"identity_hash":"0x1","issued_by":"I"}"#))
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn double_bind_is_conflict_101() {
    let app = test_app();
    assert_eq!(bind(&app, "ST1USER", "0x1", &[]).await, StatusCode::CREATED);
    let response = app
        .clone()
        .oneshot(post_as(
            "ST1USER",
            "/v1/identities",
            json!({"identity_hash": "0x2", "issued_by": "OTHER"}),
        ))
        .await
        .unwrap();
    assert_registry_error(response, StatusCode::CONFLICT, 101).await;

    let hash = body_json(app.oneshot(get("/v1/identities/ST1USER/hash")).await.unwrap()).await;
    assert_eq!(hash["identity_hash"], "0x1");
}

#[tokio::test]
async fn reads_of_unbound_principal() {
    let app = test_app();
    let bound = body_json(app.clone().oneshot(get("/v1/identities/NOBODY/bound")).await.unwrap()).await;
    assert_eq!(bound["bound"], false);

    let response = app.clone().oneshot(get("/v1/identities/NOBODY/hash")).await.unwrap();
    assert_registry_error(response, StatusCode::NOT_FOUND, 102).await;

    let response = app.oneshot(get("/v1/identities/NOBODY")).await.unwrap();
    assert_registry_error(response, StatusCode::NOT_FOUND, 102).await;
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/identities")
        .header("content-type", "application/json")
        .header("x-caller-principal", "ST1USER")
        .body(Body::from("{not json"))
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn empty_hash_and_oversized_guardian_list_are_validation_errors() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(post_as(
            "ST1USER",
            "/v1/identities",
            json!({"identity_hash": "", "issued_by": "I"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let guardians: Vec<String> = (0..65).map(|i| format!("G{i}")).collect();
    let response = app
        .oneshot(post_as(
            "ST1USER",
            "/v1/identities",
            json!({"identity_hash": "0x1", "issued_by": "I", "recovery_guardians": guardians}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

// ── Revoke ──────────────────────────────────────────────────────────

#[tokio::test]
async fn revoke_requires_admin_then_existence() {
    let app = test_app();
    bind(&app, "ST1USER", "0x1", &[]).await;

    let response = app
        .clone()
        .oneshot(post_empty_as("ST1USER", "/v1/identities/ST1USER/revoke"))
        .await
        .unwrap();
    assert_registry_error(response, StatusCode::FORBIDDEN, 100).await;

    // Admin check precedes the existence check.
    let response = app
        .clone()
        .oneshot(post_empty_as("ST1USER", "/v1/identities/NOBODY/revoke"))
        .await
        .unwrap();
    assert_registry_error(response, StatusCode::FORBIDDEN, 100).await;

    let response = app
        .clone()
        .oneshot(post_empty_as(GENESIS_ADMIN, "/v1/identities/NOBODY/revoke"))
        .await
        .unwrap();
    assert_registry_error(response, StatusCode::NOT_FOUND, 102).await;

    let response = app
        .clone()
        .oneshot(post_empty_as(GENESIS_ADMIN, "/v1/identities/ST1USER/revoke"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["is_revoked"], true);

    // Revoking again succeeds and the record stays bound.
    let response = app
        .clone()
        .oneshot(post_empty_as(GENESIS_ADMIN, "/v1/identities/ST1USER/revoke"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bound = body_json(app.oneshot(get("/v1/identities/ST1USER/bound")).await.unwrap()).await;
    assert_eq!(bound["bound"], true);
}

// ── Recover ─────────────────────────────────────────────────────────

#[tokio::test]
async fn recovery_error_order_and_success() {
    let app = test_app();
    bind(&app, "ST1LOST", "0xfeed", &["ST1GUARD"]).await;
    bind(&app, "ST1TAKEN", "0x2", &[]).await;

    let recover = |caller: &str, lost: &str, new: &str| {
        post_as(
            caller,
            &format!("/v1/identities/{lost}/recover"),
            json!({"new_principal": new}),
        )
    };

    let response = app.clone().oneshot(recover("ST1GUARD", "NOBODY", "ST1NEW")).await.unwrap();
    assert_registry_error(response, StatusCode::NOT_FOUND, 102).await;

    // Target check precedes the guardian check.
    let response = app.clone().oneshot(recover("ST1MALLORY", "ST1LOST", "ST1TAKEN")).await.unwrap();
    assert_registry_error(response, StatusCode::CONFLICT, 104).await;

    let response = app.clone().oneshot(recover("ST1MALLORY", "ST1LOST", "ST1NEW")).await.unwrap();
    assert_registry_error(response, StatusCode::FORBIDDEN, 103).await;

    let response = app.clone().oneshot(recover("ST1GUARD", "ST1LOST", "ST1NEW")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let moved = body_json(response).await;
    assert_eq!(moved["principal"], "ST1NEW");
    assert_eq!(moved["identity_hash"], "0xfeed");
    assert_eq!(moved["recovery_guardians"], json!(["ST1GUARD"]));

    let old = body_json(app.oneshot(get("/v1/identities/ST1LOST/bound")).await.unwrap()).await;
    assert_eq!(old["bound"], false);
}

// ── Admin ───────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_transfer_moves_authority() {
    let app = test_app();
    bind(&app, "ST1USER", "0x1", &[]).await;

    let response = app
        .clone()
        .oneshot(post_as("ST1USER", "/v1/admin/transfer", json!({"new_admin": "ST1USER"})))
        .await
        .unwrap();
    assert_registry_error(response, StatusCode::FORBIDDEN, 105).await;

    let response = app
        .clone()
        .oneshot(post_as(GENESIS_ADMIN, "/v1/admin/transfer", json!({"new_admin": "ST1NEWADMIN"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["admin"], "ST1NEWADMIN");

    let status = body_json(app.clone().oneshot(get("/v1/admin")).await.unwrap()).await;
    assert_eq!(status["admin"], "ST1NEWADMIN");
    assert_eq!(status["identities_bound"], 1);

    let response = app
        .clone()
        .oneshot(post_empty_as(GENESIS_ADMIN, "/v1/identities/ST1USER/revoke"))
        .await
        .unwrap();
    assert_registry_error(response, StatusCode::FORBIDDEN, 100).await;

    let response = app
        .oneshot(post_empty_as("ST1NEWADMIN", "/v1/identities/ST1USER/revoke"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn configured_genesis_admin_and_height() {
    let config = AppConfig {
        genesis_admin: "STBOOT".parse().unwrap(),
        start_height: idreg_core::BlockHeight(1000),
        ..AppConfig::default()
    };
    let app = app(AppState::with_config(config));
    let status = body_json(app.clone().oneshot(get("/v1/admin")).await.unwrap()).await;
    assert_eq!(status["admin"], "STBOOT");
    assert_eq!(status["height"], 1000);

    let response = app
        .oneshot(post_as(
            "ST1USER",
            "/v1/identities",
            json!({"identity_hash": "0x1", "issued_by": "I"}),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["issued_at"], 1000);
}

// ── Events ──────────────────────────────────────────────────────────

#[tokio::test]
async fn events_record_committed_transitions_only() {
    let app = test_app();
    bind(&app, "ST1USER", "0x1", &[]).await;
    // Rejected: must not appear in the journal.
    bind(&app, "ST1USER", "0x2", &[]).await;
    app.clone()
        .oneshot(post_empty_as(GENESIS_ADMIN, "/v1/identities/ST1USER/revoke"))
        .await
        .unwrap();

    let page = body_json(app.clone().oneshot(get("/v1/events")).await.unwrap()).await;
    let events = page["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["type"], "identity_bound");
    assert_eq!(events[0]["sequence"], 0);
    assert_eq!(events[1]["type"], "identity_revoked");
    assert_eq!(page["next_sequence"], 2);

    let tail = body_json(app.oneshot(get("/v1/events?since=1")).await.unwrap()).await;
    assert_eq!(tail["events"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn events_are_paged_by_limit() {
    let app = test_app();
    for caller in ["ST1A", "ST1B", "ST1C"] {
        assert_eq!(bind(&app, caller, "0x1", &[]).await, StatusCode::CREATED);
    }

    let first = body_json(app.clone().oneshot(get("/v1/events?limit=2")).await.unwrap()).await;
    assert_eq!(first["events"].as_array().unwrap().len(), 2);
    assert_eq!(first["next_sequence"], 2);
    assert_eq!(first["has_more"], true);

    let second = body_json(
        app.clone()
            .oneshot(get("/v1/events?since=2&limit=2"))
            .await
            .unwrap(),
    )
    .await;
    let events = second["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["principal"], "ST1C");
    assert_eq!(second["next_sequence"], 3);
    assert_eq!(second["has_more"], false);

    let past_end = body_json(app.oneshot(get("/v1/events?since=50")).await.unwrap()).await;
    assert!(past_end["events"].as_array().unwrap().is_empty());
    assert_eq!(past_end["next_sequence"], 3);
}

#[tokio::test]
async fn events_page_is_capped() {
    let state = AppState::new();
    {
        let mut registry = state.registry.lock();
        for i in 0..1005 {
            let user = Principal::new(format!("ST1USER{i}")).unwrap();
            registry
                .bind(
                    &user,
                    IdentityHash::new("0x1").unwrap(),
                    Principal::new("STISSUER").unwrap(),
                    Vec::new(),
                )
                .unwrap();
        }
    }
    let app = app(state);

    let capped = body_json(app.clone().oneshot(get("/v1/events?limit=5000")).await.unwrap()).await;
    assert_eq!(capped["events"].as_array().unwrap().len(), 1000);
    assert_eq!(capped["next_sequence"], 1000);
    assert_eq!(capped["has_more"], true);

    let default = body_json(app.oneshot(get("/v1/events")).await.unwrap()).await;
    assert_eq!(default["events"].as_array().unwrap().len(), 100);
}

// ── Gateway auth ────────────────────────────────────────────────────

#[tokio::test]
async fn gateway_token_enforced_on_api_not_health() {
    let config = AppConfig {
        auth_token: Some("gw-secret".into()),
        ..AppConfig::default()
    };
    let app = app(AppState::with_config(config));

    let response = app.clone().oneshot(get("/v1/admin")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/v1/admin")
        .header("authorization", "Bearer gw-secret")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/health/liveness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
