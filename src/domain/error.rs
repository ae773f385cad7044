//! Registry error types

use schemaforge_core::SaveError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// No record with this id
    #[error("Schema not found: '{id}'")]
    NotFound { id: String },

    /// Payload rejected by save-time validation
    #[error(transparent)]
    Invalid(#[from] SaveError),

    /// A seed file could not be read or parsed
    #[error("Failed to load seed file {}: {reason}", path.display())]
    Seed { path: PathBuf, reason: String },
}

impl RegistryError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Convert to HTTP status code for API responses
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Seed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_codes() {
        assert_eq!(RegistryError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        let invalid = RegistryError::from(SaveError::MissingFields { fields: vec!["title"] });
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.to_string(), "Category, event type, and title are required");
    }
}
