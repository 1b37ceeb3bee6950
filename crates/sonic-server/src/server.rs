//! HTTP server implementation using axum.

use std::net::SocketAddr;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;
use sonic_cache::CacheSnapshot;
use sonic_telemetry::Metrics;
use sonic_vault::Scope;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;

/// Create the axum router.
///
/// The admin route is only mounted when basic auth credentials are configured.
pub fn create_router(state: ServerState) -> Router {
    let mut router = Router::new()
        .route("/api/v2/public/config", get(get_public_config))
        .route("/version", get(get_version))
        .route("/metrics", get(get_metrics));

    if state.config.auth_enabled() {
        router = router.route("/api/v2/admin/sync", post(trigger_sync));
    }

    router.with_state(state)
}

/// Public scope of every cached application.
async fn get_public_config(State(state): State<ServerState>) -> Json<CacheSnapshot> {
    Json(public_only(state.cache.snapshot()))
}

fn public_only(mut snapshot: CacheSnapshot) -> CacheSnapshot {
    for scopes in snapshot.values_mut() {
        scopes.retain(|scope, _| scope == Scope::Public.as_str());
    }
    snapshot
}

async fn get_version() -> Json<serde_json::Value> {
    Json(json!({ "version": env!("CARGO_PKG_VERSION") }))
}

async fn get_metrics() -> Response {
    match Metrics::render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Run one reconciliation tick now.
async fn trigger_sync(State(state): State<ServerState>, headers: HeaderMap) -> Response {
    if !check_basic_auth(&headers, &state.config) {
        return unauthorized_response();
    }

    let Some(trigger) = state.trigger.as_ref() else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "reconciliation is not running in this process",
        );
    };

    info!("Reconciliation triggered over HTTP");
    match trigger.trigger().await {
        Ok(Some(report)) => Json(report).into_response(),
        Ok(None) => error_response(StatusCode::CONFLICT, "reconciliation is disabled"),
        Err(e) => {
            warn!(error = %e, "Triggered reconciliation failed");
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// Check basic authentication.
fn check_basic_auth(headers: &HeaderMap, config: &ServerConfig) -> bool {
    let Some(encoded) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Basic "))
    else {
        return false;
    };

    let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
        return false;
    };

    decoded == format!("{}:{}", config.username, config.password).as_bytes()
}

fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"sonic\"")],
        "Unauthorized",
    )
        .into_response()
}

/// Run the HTTP server until it fails.
pub async fn run_server(state: ServerState) -> ServerResult<()> {
    let port = state.config.port;
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { port, source })?;
    axum::serve(listener, app).await?;

    Ok(())
}
