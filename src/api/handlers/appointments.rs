use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::parse_param;
use crate::api::middleware::AuthedUser;
use crate::error::StoreError;
use crate::models::{AppointmentInsert, AppointmentUpdate};
use crate::store::{AppointmentFilter, Store};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentQuery {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub status: Option<String>,
}

pub async fn list(
    _user: AuthedUser,
    store: web::Data<Store>,
    query: web::Query<AppointmentQuery>,
) -> Result<HttpResponse, StoreError> {
    let filter = AppointmentFilter {
        patient_id: query.patient_id,
        doctor_id: query.doctor_id,
        status: parse_param(query.status.as_deref(), "status")?,
    };
    let appointments = store.appointments().list(&filter).await?;
    Ok(HttpResponse::Ok().json(appointments))
}

pub async fn get(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    let appointment = store.appointments().get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(appointment))
}

pub async fn create(
    _user: AuthedUser,
    store: web::Data<Store>,
    body: web::Json<AppointmentInsert>,
) -> Result<HttpResponse, StoreError> {
    let appointment = store.appointments().create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(appointment))
}

pub async fn update(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
    body: web::Json<AppointmentUpdate>,
) -> Result<HttpResponse, StoreError> {
    let appointment = store
        .appointments()
        .update(id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(appointment))
}

pub async fn delete(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    store.appointments().delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
