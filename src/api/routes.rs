//! API Routes
//!
//! Configures the Axum router with all endpoints.

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, create_handler, health_handler, lookup_handler, root_handler,
    status_handler, AppState,
};
use super::middleware::admit_client;

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - Admission: charges `/`, `POST /users`, `DELETE /cache` and
///   `/cache-status` to the caller before extraction. Lookups are admitted
///   by the orchestrator, `/health` is never limited
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
///
/// Serve with `into_make_service_with_connect_info::<SocketAddr>()` so
/// clients are rate limited by address; without it every caller shares
/// one identity.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admitted = Router::new()
        .route("/", get(root_handler))
        .route("/users", post(create_handler))
        .route("/cache", delete(clear_handler))
        .route("/cache-status", get(status_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), admit_client));

    Router::new()
        .route("/users/:id", get(lookup_handler))
        .route("/health", get(health_handler))
        .merge(admitted)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
