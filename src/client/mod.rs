//! Typed client for the Florence API.
//!
//! Layers, bottom up: [`CredentialStore`] persists the bearer token under a
//! fixed key and restores it at startup; [`ApiClient`] wraps the HTTP
//! transport, attaches the credential to every call, and normalizes every
//! failure into [`ApiError`]; [`Session`] owns sign-in/sign-out and the
//! periodic token refresh; the collection types in [`collections`] hold the
//! per-entity in-memory mirror the UI renders from.

pub mod collections;
pub mod credentials;
pub mod http;
pub mod query;
pub mod session;

use validator::ValidationErrors;

use crate::error::ErrorKind;

pub use collections::{
    Appointments, Bills, Collection, DoctorVisits, Doctors, IpdPatients, IvSchedules, Keyed,
    MedicalRecords, MedicineSchedules, Patients, Prescriptions, Vitals, Workspace,
};
pub use credentials::CredentialStore;
pub use http::ApiClient;
pub use query::{search, sort, Queryable, SortField, SortOrder};
pub use session::Session;

pub type ApiResult<T> = Result<T, ApiError>;

/// Uniform failure shape for every client operation: a kind, a message, and
/// for locally-caught validation failures the per-field detail a form needs.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    pub field_errors: Option<ValidationErrors>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            field_errors: None,
        }
    }

    /// Validation caught before any network call.
    pub fn from_validation(errors: ValidationErrors) -> Self {
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
        Self {
            kind: ErrorKind::Validation,
            message: parts.join("; "),
            field_errors: Some(errors),
        }
    }

    pub(crate) fn transport(err: reqwest::Error) -> Self {
        Self::new(ErrorKind::Unknown, err.to_string())
    }

    /// Message for the field, when this is a local validation failure.
    pub fn field_error(&self, field: &str) -> Option<String> {
        let errors = self.field_errors.as_ref()?;
        let errs = errors.field_errors();
        let errs = errs.get(field)?;
        errs.first().map(|err| {
            err.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{field} is invalid"))
        })
    }
}
