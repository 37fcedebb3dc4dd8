use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::parse_param;
use crate::api::middleware::AuthedUser;
use crate::error::StoreError;
use crate::models::{IpdPatientInsert, IpdPatientUpdate};
use crate::store::{IpdFilter, Store};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpdQuery {
    pub doctor_id: Option<Uuid>,
    pub severity: Option<String>,
    pub room_number: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub active_only: bool,
}

pub async fn list(
    _user: AuthedUser,
    store: web::Data<Store>,
    query: web::Query<IpdQuery>,
) -> Result<HttpResponse, StoreError> {
    let filter = IpdFilter {
        doctor_id: query.doctor_id,
        severity: parse_param(query.severity.as_deref(), "severity")?,
        room_number: query.room_number.clone(),
        search: query.search.clone(),
        active_only: query.active_only,
    };
    let admissions = store.ipd_patients().list(&filter).await?;
    Ok(HttpResponse::Ok().json(admissions))
}

pub async fn get(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    let admission = store.ipd_patients().get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(admission))
}

pub async fn create(
    _user: AuthedUser,
    store: web::Data<Store>,
    body: web::Json<IpdPatientInsert>,
) -> Result<HttpResponse, StoreError> {
    let admission = store.ipd_patients().create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(admission))
}

pub async fn update(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
    body: web::Json<IpdPatientUpdate>,
) -> Result<HttpResponse, StoreError> {
    let admission = store
        .ipd_patients()
        .update(id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(admission))
}

#[derive(Debug, Deserialize)]
pub struct DischargeBody {
    /// Defaults to now when omitted.
    pub discharged_at: Option<DateTime<Utc>>,
}

pub async fn discharge(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
    body: web::Json<DischargeBody>,
) -> Result<HttpResponse, StoreError> {
    let at = body.discharged_at.unwrap_or_else(Utc::now);
    let admission = store.ipd_patients().discharge(id.into_inner(), at).await?;
    Ok(HttpResponse::Ok().json(admission))
}

pub async fn delete(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    store.ipd_patients().delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
