//! Request handlers, one module per resource group.

pub mod appointments;
pub mod auth;
pub mod billing;
pub mod doctors;
pub mod ipd;
pub mod patients;
pub mod profile;
pub mod records;
pub mod ward;

use std::str::FromStr;

use crate::error::StoreError;

/// Parse an optional query-string value into its typed form, reporting a
/// Validation failure (not a 500) for garbage input.
pub(crate) fn parse_param<T>(value: Option<&str>, name: &str) -> Result<Option<T>, StoreError>
where
    T: FromStr,
{
    match value {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| StoreError::Validation(format!("invalid value for {name}: '{raw}'"))),
    }
}
