use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::parse_param;
use crate::api::middleware::AuthedUser;
use crate::error::StoreError;
use crate::models::{BillInsert, BillUpdate, Payment};
use crate::store::{BillFilter, Store};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillQuery {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub status: Option<String>,
}

pub async fn list(
    _user: AuthedUser,
    store: web::Data<Store>,
    query: web::Query<BillQuery>,
) -> Result<HttpResponse, StoreError> {
    let filter = BillFilter {
        patient_id: query.patient_id,
        doctor_id: query.doctor_id,
        status: parse_param(query.status.as_deref(), "status")?,
    };
    let bills = store.bills().list(&filter).await?;
    Ok(HttpResponse::Ok().json(bills))
}

pub async fn get(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    let bill = store.bills().get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(bill))
}

pub async fn create(
    _user: AuthedUser,
    store: web::Data<Store>,
    body: web::Json<BillInsert>,
) -> Result<HttpResponse, StoreError> {
    let bill = store.bills().create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(bill))
}

pub async fn update(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
    body: web::Json<BillUpdate>,
) -> Result<HttpResponse, StoreError> {
    let bill = store
        .bills()
        .update(id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(bill))
}

/// Record a payment as one atomic server-side operation.
pub async fn record_payment(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
    body: web::Json<Payment>,
) -> Result<HttpResponse, StoreError> {
    let bill = store
        .bills()
        .record_payment(id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(bill))
}

pub async fn delete(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    store.bills().delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
