use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub contact: Option<String>,
    pub email: Option<String>,
    /// External national health registry identifier, stored opaquely.
    pub abha_id: Option<String>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PatientInsert {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(range(max = 130, message = "Age is out of range"))]
    pub age: u32,
    #[validate(length(min = 1, message = "Gender is required"))]
    pub gender: String,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub abha_id: Option<String>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
}

/// Partial patch: only provided fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abha_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}
