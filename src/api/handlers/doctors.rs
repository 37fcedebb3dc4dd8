use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::api::middleware::AuthedUser;
use crate::error::StoreError;
use crate::models::{DoctorInsert, DoctorUpdate};
use crate::store::Store;

pub async fn list(_user: AuthedUser, store: web::Data<Store>) -> Result<HttpResponse, StoreError> {
    let doctors = store.doctors().list().await?;
    Ok(HttpResponse::Ok().json(doctors))
}

pub async fn get(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    let doctor = store.doctors().get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(doctor))
}

pub async fn create(
    _user: AuthedUser,
    store: web::Data<Store>,
    body: web::Json<DoctorInsert>,
) -> Result<HttpResponse, StoreError> {
    let doctor = store.doctors().create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(doctor))
}

pub async fn update(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
    body: web::Json<DoctorUpdate>,
) -> Result<HttpResponse, StoreError> {
    let doctor = store
        .doctors()
        .update(id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(doctor))
}

pub async fn delete(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    store.doctors().delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
