//! Flight Cache - a read-through record cache in front of a slow source
//!
//! Combines a TTL/LRU cache, single-flight fetch coalescing and
//! per-client sliding-window rate limiting.

pub mod api;
pub mod cache;
pub mod coalesce;
pub mod config;
pub mod error;
pub mod models;
pub mod ratelimit;
pub mod service;
pub mod source;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use service::RequestOrchestrator;
pub use tasks::spawn_sweep_task;
