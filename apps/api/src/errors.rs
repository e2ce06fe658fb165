use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure of a single (major, career) curation run.
/// Never aborts sibling runs; the run is skipped with this as its diagnostic.
#[derive(Debug, Error)]
pub enum CurationError {
    #[error("No pathway file configured for base pathway '{0}'")]
    MissingPathwayFile(String),

    #[error("Cannot load pathway '{path}': {source}")]
    PathwayUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed pathway '{path}': {source}")]
    PathwayMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Catalog '{0}' is not loaded")]
    MissingCatalog(String),

    #[error("Invalid keyword '{keyword}': {source}")]
    InvalidKeyword {
        keyword: String,
        #[source]
        source: regex::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to persist curated pathway: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Curation error: {0}")]
    Curation(#[from] CurationError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Curation(e @ CurationError::MissingCatalog(_))
            | AppError::Curation(e @ CurationError::MissingPathwayFile(_))
            | AppError::Curation(e @ CurationError::InvalidKeyword { .. }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CURATION_ERROR",
                e.to_string(),
            ),
            AppError::Curation(e) => {
                tracing::error!("Curation error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CURATION_ERROR",
                    "A curation data error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
