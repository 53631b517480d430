//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::error::{AppError, Result};

/// Request body for record creation (POST /users)
///
/// Missing fields deserialize as empty strings so that validation, not
/// the JSON extractor, decides the error message.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl NewRecord {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Validates the request data
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err(AppError::Validation("name and email required".to_string()));
        }
        Ok(())
    }
}
