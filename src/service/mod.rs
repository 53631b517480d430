//! Service Module
//!
//! Ties the limiter, cache and coalescer together into the operations the
//! HTTP layer exposes.

mod orchestrator;

pub use orchestrator::{Lookup, RequestOrchestrator};
