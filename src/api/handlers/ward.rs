//! Ward observation endpoints. Listings require the `ipdPatientId` query
//! parameter; these resources have no cross-ward listing.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::parse_param;
use crate::api::middleware::AuthedUser;
use crate::error::StoreError;
use crate::models::{
    DoctorVisitInsert, DoctorVisitUpdate, IvScheduleInsert, IvScheduleUpdate,
    MedicineScheduleInsert, MedicineScheduleUpdate, VitalInsert, VitalUpdate,
};
use crate::store::{
    DoctorVisitFilter, IvScheduleFilter, MedicineScheduleFilter, Store, VitalsRange,
};

fn require_scope(ipd_patient_id: Option<Uuid>) -> Result<Uuid, StoreError> {
    ipd_patient_id.ok_or_else(|| {
        StoreError::Validation("ipdPatientId query parameter is required".into())
    })
}

// ===== Vitals =====

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsQuery {
    pub ipd_patient_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub latest: bool,
}

pub async fn list_vitals(
    _user: AuthedUser,
    store: web::Data<Store>,
    query: web::Query<VitalsQuery>,
) -> Result<HttpResponse, StoreError> {
    let ipd_patient_id = require_scope(query.ipd_patient_id)?;
    if query.latest {
        let latest = store.vitals().latest(ipd_patient_id).await?;
        let rows: Vec<_> = latest.into_iter().collect();
        return Ok(HttpResponse::Ok().json(rows));
    }
    let range = VitalsRange {
        start: query.start_date,
        end: query.end_date,
    };
    let vitals = store.vitals().list(ipd_patient_id, &range).await?;
    Ok(HttpResponse::Ok().json(vitals))
}

pub async fn get_vital(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    let vital = store.vitals().get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(vital))
}

pub async fn create_vital(
    _user: AuthedUser,
    store: web::Data<Store>,
    body: web::Json<VitalInsert>,
) -> Result<HttpResponse, StoreError> {
    let vital = store.vitals().create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(vital))
}

pub async fn update_vital(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
    body: web::Json<VitalUpdate>,
) -> Result<HttpResponse, StoreError> {
    let vital = store
        .vitals()
        .update(id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(vital))
}

pub async fn delete_vital(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    store.vitals().delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ===== Medicine schedule =====

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineQuery {
    pub ipd_patient_id: Option<Uuid>,
    pub status: Option<String>,
    pub nurse: Option<String>,
}

pub async fn list_medicine(
    _user: AuthedUser,
    store: web::Data<Store>,
    query: web::Query<MedicineQuery>,
) -> Result<HttpResponse, StoreError> {
    let ipd_patient_id = require_scope(query.ipd_patient_id)?;
    let filter = MedicineScheduleFilter {
        status: parse_param(query.status.as_deref(), "status")?,
        nurse: query.nurse.clone(),
    };
    let doses = store.medicine_schedule().list(ipd_patient_id, &filter).await?;
    Ok(HttpResponse::Ok().json(doses))
}

pub async fn get_medicine(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    let dose = store.medicine_schedule().get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(dose))
}

pub async fn create_medicine(
    _user: AuthedUser,
    store: web::Data<Store>,
    body: web::Json<MedicineScheduleInsert>,
) -> Result<HttpResponse, StoreError> {
    let dose = store.medicine_schedule().create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(dose))
}

pub async fn update_medicine(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
    body: web::Json<MedicineScheduleUpdate>,
) -> Result<HttpResponse, StoreError> {
    let dose = store
        .medicine_schedule()
        .update(id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(dose))
}

pub async fn delete_medicine(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    store.medicine_schedule().delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ===== IV schedule =====

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IvQuery {
    pub ipd_patient_id: Option<Uuid>,
    pub status: Option<String>,
    pub nurse: Option<String>,
}

pub async fn list_iv(
    _user: AuthedUser,
    store: web::Data<Store>,
    query: web::Query<IvQuery>,
) -> Result<HttpResponse, StoreError> {
    let ipd_patient_id = require_scope(query.ipd_patient_id)?;
    let filter = IvScheduleFilter {
        status: parse_param(query.status.as_deref(), "status")?,
        nurse: query.nurse.clone(),
    };
    let infusions = store.iv_schedule().list(ipd_patient_id, &filter).await?;
    Ok(HttpResponse::Ok().json(infusions))
}

pub async fn get_iv(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    let infusion = store.iv_schedule().get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(infusion))
}

pub async fn create_iv(
    _user: AuthedUser,
    store: web::Data<Store>,
    body: web::Json<IvScheduleInsert>,
) -> Result<HttpResponse, StoreError> {
    let infusion = store.iv_schedule().create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(infusion))
}

pub async fn update_iv(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
    body: web::Json<IvScheduleUpdate>,
) -> Result<HttpResponse, StoreError> {
    let infusion = store
        .iv_schedule()
        .update(id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(infusion))
}

pub async fn delete_iv(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    store.iv_schedule().delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ===== Doctor visits =====

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitQuery {
    pub ipd_patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
}

pub async fn list_visits(
    _user: AuthedUser,
    store: web::Data<Store>,
    query: web::Query<VisitQuery>,
) -> Result<HttpResponse, StoreError> {
    let ipd_patient_id = require_scope(query.ipd_patient_id)?;
    let filter = DoctorVisitFilter {
        doctor_id: query.doctor_id,
    };
    let visits = store.doctor_visits().list(ipd_patient_id, &filter).await?;
    Ok(HttpResponse::Ok().json(visits))
}

pub async fn get_visit(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    let visit = store.doctor_visits().get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(visit))
}

pub async fn create_visit(
    _user: AuthedUser,
    store: web::Data<Store>,
    body: web::Json<DoctorVisitInsert>,
) -> Result<HttpResponse, StoreError> {
    let visit = store.doctor_visits().create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(visit))
}

pub async fn update_visit(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
    body: web::Json<DoctorVisitUpdate>,
) -> Result<HttpResponse, StoreError> {
    let visit = store
        .doctor_visits()
        .update(id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(visit))
}

pub async fn delete_visit(
    _user: AuthedUser,
    store: web::Data<Store>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    store.doctor_visits().delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
