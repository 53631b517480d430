//! Domain records and the request/response bodies of the HTTP API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod record;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use record::{Provenance, Record};
pub use requests::NewRecord;
pub use responses::{
    ClearResponse, CreateResponse, HealthResponse, LookupResponse, StatusResponse,
};
