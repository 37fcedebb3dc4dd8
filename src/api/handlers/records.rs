//! Medical record and prescription endpoints; both share the same
//! patient-scoped filter surface.

use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::middleware::AuthedUser;
use crate::error::StoreError;
use crate::models::{
    MedicalRecordInsert, MedicalRecordUpdate, PrescriptionInsert, PrescriptionUpdate,
};
use crate::store::{RecordFilter, Store};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordQuery {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
}

impl RecordQuery {
    fn filter(&self) -> RecordFilter {
        RecordFilter {
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            start_date: self.start_date,
            end_date: self.end_date,
            search: self.search.clone(),
        }
    }
}

pub async fn list_records(
    _user: AuthedUser,
    store: web::Data<Store>,
    query: web::Query<RecordQuery>,
) -> Result<HttpResponse, StoreError> {
    let records = store.medical_records().list(&query.filter()).await?;
    Ok(HttpResponse::Ok().json(records))
}

pub async fn get_record(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    let record = store.medical_records().get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn create_record(
    _user: AuthedUser,
    store: web::Data<Store>,
    body: web::Json<MedicalRecordInsert>,
) -> Result<HttpResponse, StoreError> {
    let record = store.medical_records().create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(record))
}

pub async fn update_record(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
    body: web::Json<MedicalRecordUpdate>,
) -> Result<HttpResponse, StoreError> {
    let record = store
        .medical_records()
        .update(id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn delete_record(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    store.medical_records().delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn list_prescriptions(
    _user: AuthedUser,
    store: web::Data<Store>,
    query: web::Query<RecordQuery>,
) -> Result<HttpResponse, StoreError> {
    let prescriptions = store.prescriptions().list(&query.filter()).await?;
    Ok(HttpResponse::Ok().json(prescriptions))
}

pub async fn get_prescription(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    let prescription = store.prescriptions().get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(prescription))
}

pub async fn create_prescription(
    _user: AuthedUser,
    store: web::Data<Store>,
    body: web::Json<PrescriptionInsert>,
) -> Result<HttpResponse, StoreError> {
    let prescription = store.prescriptions().create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(prescription))
}

pub async fn update_prescription(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
    body: web::Json<PrescriptionUpdate>,
) -> Result<HttpResponse, StoreError> {
    let prescription = store
        .prescriptions()
        .update(id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(prescription))
}

pub async fn delete_prescription(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    store.prescriptions().delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
