//! API Handlers
//!
//! HTTP request handlers for each endpoint. Lookups are admitted by the
//! orchestrator itself; the other limited routes go through
//! `admit_client` before reaching their handler.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    ClearResponse, CreateResponse, HealthResponse, LookupResponse, NewRecord, StatusResponse,
};
use crate::service::RequestOrchestrator;

/// Identity used when the peer address is unknown.
pub const DEFAULT_IDENTITY: &str = "global";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<RequestOrchestrator>,
}

impl AppState {
    /// Creates a new AppState around an orchestrator.
    pub fn new(orchestrator: RequestOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// Creates a new AppState from configuration, over the seeded demo
    /// database.
    pub fn from_config(config: &Config) -> Self {
        Self::new(RequestOrchestrator::from_config(config))
    }
}

/// Derives the rate-limit identity from the peer address.
pub(crate) fn client_identity(peer: Option<ConnectInfo<SocketAddr>>) -> String {
    peer.map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| DEFAULT_IDENTITY.to_string())
}

/// Handler for GET /
///
/// Lists the available endpoints.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the flight cache user API",
        "endpoints": {
            "GET /users/:id": "Fetch a user by id (cached; source lookups are coalesced)",
            "POST /users": "Create a user (JSON body: { name, email }) and cache it",
            "DELETE /cache": "Clear the entire cache",
            "GET /cache-status": "Cache hits, misses, size and average response time",
            "GET /health": "Health check"
        },
        "notes": {
            "rateLimiting": "Rejected only when both the long window and the burst window are full",
            "cache": "LRU by write order with a fixed TTL and a background sweep",
            "concurrent": "Concurrent requests for the same id share one source fetch"
        }
    }))
}

/// Handler for GET /users/:id
pub async fn lookup_handler(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    Path(id): Path<String>,
) -> Result<Json<LookupResponse>> {
    let lookup = state
        .orchestrator
        .lookup(&client_identity(peer), &id)
        .await?;

    Ok(Json(LookupResponse::new(lookup.provenance, lookup.record)))
}

/// Handler for POST /users
///
/// Bodies that are not valid JSON are reported like any other invalid
/// request.
pub async fn create_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<NewRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateResponse>)> {
    let Json(req) = body.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let user = state.orchestrator.create(req).await?;

    Ok((StatusCode::CREATED, Json(CreateResponse { user })))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.orchestrator.clear_cache().await;

    Json(ClearResponse::ok())
}

/// Handler for GET /cache-status
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(state.orchestrator.cache_status().await)
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
