//! Error taxonomy shared by the store, the HTTP surface, and the client.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};

/// Discriminant carried across the wire with every failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    Conflict,
    Unknown,
}

/// JSON body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub error: String,
}

/// Failure of a resource-store operation. No store operation panics or lets
/// a transport error escape raw; sqlx failures are wrapped as `Database`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Validation(_) => ErrorKind::Validation,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Unauthorized => ErrorKind::Unauthorized,
            StoreError::Conflict(_) => ErrorKind::Conflict,
            StoreError::Database(_) => ErrorKind::Unknown,
            StoreError::Internal(_) => ErrorKind::Unknown,
        }
    }

    /// Flatten validator output into one Validation message.
    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        let mut parts: Vec<String> = Vec::new();
        for (field, errs) in errors.field_errors() {
            for err in errs {
                let msg = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"));
                parts.push(msg);
            }
        }
        parts.sort();
        StoreError::Validation(parts.join("; "))
    }

    /// A row decoded from storage that no longer parses (e.g. an unknown
    /// status string written by an older build).
    pub fn corrupt(detail: String) -> Self {
        StoreError::Internal(detail)
    }
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            kind: self.kind(),
            error: self.to_string(),
        })
    }
}
