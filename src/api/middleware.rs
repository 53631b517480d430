//! API Middleware
//!
//! Rate-limit admission for routes whose handlers do not admit on their own.
//! Runs before any extractor, so malformed bodies are still charged.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};

use super::handlers::{client_identity, AppState};
use crate::error::Result;

/// Charges the request to the caller's identity, answering 429 when the
/// caller is throttled.
pub async fn admit_client(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Result<Response> {
    state.orchestrator.admit(&client_identity(peer))?;
    Ok(next.run(request).await)
}
