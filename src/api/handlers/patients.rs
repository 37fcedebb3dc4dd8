use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::middleware::AuthedUser;
use crate::error::StoreError;
use crate::models::{PatientInsert, PatientUpdate};
use crate::store::{PatientFilter, Store};

#[derive(Debug, Deserialize)]
pub struct PatientQuery {
    pub search: Option<String>,
}

pub async fn list(
    _user: AuthedUser,
    store: web::Data<Store>,
    query: web::Query<PatientQuery>,
) -> Result<HttpResponse, StoreError> {
    let filter = PatientFilter {
        search: query.search.clone(),
    };
    let patients = store.patients().list(&filter).await?;
    Ok(HttpResponse::Ok().json(patients))
}

pub async fn get(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    let patient = store.patients().get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(patient))
}

pub async fn create(
    _user: AuthedUser,
    store: web::Data<Store>,
    body: web::Json<PatientInsert>,
) -> Result<HttpResponse, StoreError> {
    let patient = store.patients().create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(patient))
}

pub async fn update(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
    body: web::Json<PatientUpdate>,
) -> Result<HttpResponse, StoreError> {
    let patient = store
        .patients()
        .update(id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(patient))
}

pub async fn delete(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    store.patients().delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
