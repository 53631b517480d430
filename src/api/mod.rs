//! API Module
//!
//! HTTP handlers and routing for the user API.
//!
//! # Endpoints
//! - `GET /` - Endpoint overview
//! - `GET /users/:id` - Look up a user (cache, then coalesced source fetch)
//! - `POST /users` - Create a user and cache it
//! - `DELETE /cache` - Clear the cache
//! - `GET /cache-status` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
