//! Per-entity collection stores.
//!
//! Each collection owns the in-memory mirror of one entity type: the item
//! list, a loading flag, and the last error. Clones share one state, so a
//! list view and a modal observing the same collection always agree.
//!
//! Semantics: a fetch populates the list and clears the error, and on
//! failure leaves the list untouched; a create appends only after the
//! server acknowledged the row; an update replaces the matching row in
//! place (a miss is a local no-op); a delete removes by id. Mutations
//! validate locally first, record their failure, and re-raise it; fetches
//! record their failure only.

use std::marker::PhantomData;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use super::http::ApiClient;
use super::{ApiError, ApiResult};
use crate::models::{
    Appointment, AppointmentInsert, AppointmentUpdate, Bill, BillInsert, BillUpdate, Doctor,
    DoctorInsert, DoctorUpdate, DoctorVisit, DoctorVisitInsert, DoctorVisitUpdate, IpdPatient,
    IpdPatientInsert, IpdPatientUpdate, IvSchedule, IvScheduleInsert, IvScheduleUpdate, IvStatus,
    MedicalRecord, MedicalRecordInsert, MedicalRecordUpdate, MedicineSchedule,
    MedicineScheduleInsert, MedicineScheduleUpdate, MedicineStatus, Patient, PatientInsert,
    PatientUpdate, Payment, Prescription, PrescriptionInsert, PrescriptionUpdate, Vital,
    VitalInsert, VitalUpdate,
};

/// Entities addressable by id within a collection.
pub trait Keyed {
    fn key(&self) -> Uuid;
}

struct CollectionState<T> {
    items: Vec<T>,
    loading: bool,
    error: Option<String>,
}

impl<T> Default for CollectionState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

/// Shared snapshot of one entity collection.
pub struct Collection<T> {
    inner: Arc<RwLock<CollectionState<T>>>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(CollectionState::default())),
        }
    }
}

impl<T: Clone> Collection<T> {
    pub fn items(&self) -> Vec<T> {
        self.read().items.clone()
    }

    pub fn loading(&self) -> bool {
        self.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, CollectionState<T>> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, CollectionState<T>> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self) {
        let mut state = self.write();
        state.loading = true;
        state.error = None;
    }

    fn loaded(&self, items: Vec<T>) {
        let mut state = self.write();
        state.items = items;
        state.loading = false;
        state.error = None;
    }

    /// Fetch failure: the previous items stay as they were.
    fn failed(&self, message: String) {
        let mut state = self.write();
        state.loading = false;
        state.error = Some(message);
    }

    fn record_error(&self, message: String) {
        self.write().error = Some(message);
    }
}

impl<T: Clone + Keyed> Collection<T> {
    /// Newest rows render first.
    fn prepend(&self, item: T) {
        let mut state = self.write();
        state.items.insert(0, item);
        state.error = None;
    }

    /// Replace in place by id; an unknown id is a no-op (the caller
    /// refetches if it needs consistency).
    fn replace(&self, item: T) {
        let mut state = self.write();
        if let Some(slot) = state.items.iter_mut().find(|it| it.key() == item.key()) {
            *slot = item;
        }
        state.error = None;
    }

    fn remove(&self, id: Uuid) {
        let mut state = self.write();
        state.items.retain(|it| it.key() != id);
        state.error = None;
    }
}

macro_rules! keyed {
    ($($entity:ty),* $(,)?) => {
        $(impl Keyed for $entity {
            fn key(&self) -> Uuid {
                self.id
            }
        })*
    };
}

keyed!(
    Patient,
    Doctor,
    Appointment,
    MedicalRecord,
    Prescription,
    IpdPatient,
    Vital,
    MedicineSchedule,
    IvSchedule,
    DoctorVisit,
    Bill,
);

/// One REST collection endpoint bound to its shared [`Collection`] state.
pub struct ResourceCollection<T, I, U> {
    client: ApiClient,
    path: &'static str,
    state: Collection<T>,
    _marker: PhantomData<fn() -> (I, U)>,
}

impl<T, I, U> Clone for ResourceCollection<T, I, U> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            path: self.path,
            state: self.state.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, I, U> ResourceCollection<T, I, U>
where
    T: DeserializeOwned + Clone + Keyed,
    I: Serialize + Validate,
    U: Serialize,
{
    fn at_path(client: ApiClient, path: &'static str) -> Self {
        Self {
            client,
            path,
            state: Collection::default(),
            _marker: PhantomData,
        }
    }

    pub fn items(&self) -> Vec<T> {
        self.state.items()
    }

    pub fn loading(&self) -> bool {
        self.state.loading()
    }

    pub fn error(&self) -> Option<String> {
        self.state.error()
    }

    async fn fetch_with(&self, query: &[(&str, String)]) {
        self.state.begin();
        match self.client.get::<Vec<T>>(self.path, query).await {
            Ok(items) => self.state.loaded(items),
            Err(err) => self.state.failed(err.message),
        }
    }

    /// Read one row straight from the server, bypassing local state.
    pub async fn get(&self, id: Uuid) -> ApiResult<T> {
        self.client.get(&format!("{}/{id}", self.path), &[]).await
    }

    pub async fn create(&self, insert: I) -> ApiResult<T> {
        if let Err(errors) = insert.validate() {
            let err = ApiError::from_validation(errors);
            self.state.record_error(err.message.clone());
            return Err(err);
        }
        match self.client.post::<T, I>(self.path, &insert).await {
            Ok(item) => {
                self.state.prepend(item.clone());
                Ok(item)
            }
            Err(err) => {
                self.state.record_error(err.message.clone());
                Err(err)
            }
        }
    }

    pub async fn update(&self, id: Uuid, patch: U) -> ApiResult<T> {
        match self
            .client
            .patch::<T, U>(&format!("{}/{id}", self.path), &patch)
            .await
        {
            Ok(item) => {
                self.state.replace(item.clone());
                Ok(item)
            }
            Err(err) => {
                self.state.record_error(err.message.clone());
                Err(err)
            }
        }
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        match self.client.delete(&format!("{}/{id}", self.path)).await {
            Ok(()) => {
                self.state.remove(id);
                Ok(())
            }
            Err(err) => {
                self.state.record_error(err.message.clone());
                Err(err)
            }
        }
    }
}

pub type Patients = ResourceCollection<Patient, PatientInsert, PatientUpdate>;
pub type Doctors = ResourceCollection<Doctor, DoctorInsert, DoctorUpdate>;
pub type Appointments = ResourceCollection<Appointment, AppointmentInsert, AppointmentUpdate>;
pub type MedicalRecords = ResourceCollection<MedicalRecord, MedicalRecordInsert, MedicalRecordUpdate>;
pub type Prescriptions = ResourceCollection<Prescription, PrescriptionInsert, PrescriptionUpdate>;
pub type IpdPatients = ResourceCollection<IpdPatient, IpdPatientInsert, IpdPatientUpdate>;
pub type Vitals = ResourceCollection<Vital, VitalInsert, VitalUpdate>;
pub type MedicineSchedules =
    ResourceCollection<MedicineSchedule, MedicineScheduleInsert, MedicineScheduleUpdate>;
pub type IvSchedules = ResourceCollection<IvSchedule, IvScheduleInsert, IvScheduleUpdate>;
pub type DoctorVisits = ResourceCollection<DoctorVisit, DoctorVisitInsert, DoctorVisitUpdate>;
pub type Bills = ResourceCollection<Bill, BillInsert, BillUpdate>;

impl Patients {
    pub fn new(client: ApiClient) -> Self {
        Self::at_path(client, "/patients")
    }

    pub async fn fetch(&self) {
        self.fetch_with(&[]).await
    }

    pub async fn search(&self, term: &str) {
        self.fetch_with(&[("search", term.to_string())]).await
    }
}

impl Doctors {
    pub fn new(client: ApiClient) -> Self {
        Self::at_path(client, "/doctors")
    }

    pub async fn fetch(&self) {
        self.fetch_with(&[]).await
    }
}

impl Appointments {
    pub fn new(client: ApiClient) -> Self {
        Self::at_path(client, "/appointments")
    }

    pub async fn fetch(&self) {
        self.fetch_with(&[]).await
    }

    pub async fn fetch_for_patient(&self, patient_id: Uuid) {
        self.fetch_with(&[("patientId", patient_id.to_string())]).await
    }

    pub async fn fetch_for_doctor(&self, doctor_id: Uuid) {
        self.fetch_with(&[("doctorId", doctor_id.to_string())]).await
    }
}

impl MedicalRecords {
    pub fn new(client: ApiClient) -> Self {
        Self::at_path(client, "/medical-records")
    }

    pub async fn fetch(&self) {
        self.fetch_with(&[]).await
    }

    pub async fn fetch_for_patient(&self, patient_id: Uuid) {
        self.fetch_with(&[("patientId", patient_id.to_string())]).await
    }
}

impl Prescriptions {
    pub fn new(client: ApiClient) -> Self {
        Self::at_path(client, "/prescriptions")
    }

    pub async fn fetch(&self) {
        self.fetch_with(&[]).await
    }

    pub async fn fetch_for_patient(&self, patient_id: Uuid) {
        self.fetch_with(&[("patientId", patient_id.to_string())]).await
    }
}

impl IpdPatients {
    pub fn new(client: ApiClient) -> Self {
        Self::at_path(client, "/ipd-patients")
    }

    pub async fn fetch(&self) {
        self.fetch_with(&[]).await
    }

    /// Only admissions still on the ward.
    pub async fn fetch_active(&self) {
        self.fetch_with(&[("activeOnly", "true".to_string())]).await
    }

    pub async fn discharge(&self, id: Uuid, at: Option<DateTime<Utc>>) -> ApiResult<IpdPatient> {
        let body = serde_json::json!({ "discharged_at": at });
        match self
            .client
            .post::<IpdPatient, _>(&format!("/ipd-patients/{id}/discharge"), &body)
            .await
        {
            Ok(admission) => {
                self.state.replace(admission.clone());
                Ok(admission)
            }
            Err(err) => {
                self.state.record_error(err.message.clone());
                Err(err)
            }
        }
    }
}

impl Vitals {
    pub fn new(client: ApiClient) -> Self {
        Self::at_path(client, "/vitals")
    }

    /// Vitals only exist within a ward admission, so every fetch is scoped.
    pub async fn fetch(&self, ipd_patient_id: Uuid) {
        self.fetch_with(&[("ipdPatientId", ipd_patient_id.to_string())])
            .await
    }

    pub async fn fetch_range(
        &self,
        ipd_patient_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) {
        self.fetch_with(&[
            ("ipdPatientId", ipd_patient_id.to_string()),
            ("startDate", start.to_rfc3339()),
            ("endDate", end.to_rfc3339()),
        ])
        .await
    }

    /// Most recent observation, straight from the server.
    pub async fn latest(&self, ipd_patient_id: Uuid) -> ApiResult<Option<Vital>> {
        let rows: Vec<Vital> = self
            .client
            .get(
                "/vitals",
                &[
                    ("ipdPatientId", ipd_patient_id.to_string()),
                    ("latest", "true".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }
}

impl MedicineSchedules {
    pub fn new(client: ApiClient) -> Self {
        Self::at_path(client, "/medicine-schedule")
    }

    pub async fn fetch(&self, ipd_patient_id: Uuid) {
        self.fetch_with(&[("ipdPatientId", ipd_patient_id.to_string())])
            .await
    }

    pub async fn fetch_by_status(&self, ipd_patient_id: Uuid, status: MedicineStatus) {
        self.fetch_with(&[
            ("ipdPatientId", ipd_patient_id.to_string()),
            ("status", status.as_str().to_string()),
        ])
        .await
    }
}

impl IvSchedules {
    pub fn new(client: ApiClient) -> Self {
        Self::at_path(client, "/iv-schedule")
    }

    pub async fn fetch(&self, ipd_patient_id: Uuid) {
        self.fetch_with(&[("ipdPatientId", ipd_patient_id.to_string())])
            .await
    }

    pub async fn fetch_by_status(&self, ipd_patient_id: Uuid, status: IvStatus) {
        self.fetch_with(&[
            ("ipdPatientId", ipd_patient_id.to_string()),
            ("status", status.as_str().to_string()),
        ])
        .await
    }
}

impl DoctorVisits {
    pub fn new(client: ApiClient) -> Self {
        Self::at_path(client, "/doctor-visits")
    }

    pub async fn fetch(&self, ipd_patient_id: Uuid) {
        self.fetch_with(&[("ipdPatientId", ipd_patient_id.to_string())])
            .await
    }
}

impl Bills {
    pub fn new(client: ApiClient) -> Self {
        Self::at_path(client, "/bills")
    }

    pub async fn fetch(&self) {
        self.fetch_with(&[]).await
    }

    pub async fn fetch_for_patient(&self, patient_id: Uuid) {
        self.fetch_with(&[("patientId", patient_id.to_string())]).await
    }

    /// Record a payment through the server's atomic payment operation and
    /// reflect the settled bill locally.
    pub async fn record_payment(&self, id: Uuid, payment: Payment) -> ApiResult<Bill> {
        if let Err(errors) = payment.validate() {
            let err = ApiError::from_validation(errors);
            self.state.record_error(err.message.clone());
            return Err(err);
        }
        match self
            .client
            .post::<Bill, Payment>(&format!("/bills/{id}/payments"), &payment)
            .await
        {
            Ok(bill) => {
                self.state.replace(bill.clone());
                Ok(bill)
            }
            Err(err) => {
                self.state.record_error(err.message.clone());
                Err(err)
            }
        }
    }
}

/// One shared collection per entity. Hand clones of this to every view so
/// they all observe the same state; constructing a second workspace would
/// recreate the original design's diverging per-component caches.
#[derive(Clone)]
pub struct Workspace {
    pub patients: Patients,
    pub doctors: Doctors,
    pub appointments: Appointments,
    pub medical_records: MedicalRecords,
    pub prescriptions: Prescriptions,
    pub ipd_patients: IpdPatients,
    pub vitals: Vitals,
    pub medicine_schedules: MedicineSchedules,
    pub iv_schedules: IvSchedules,
    pub doctor_visits: DoctorVisits,
    pub bills: Bills,
}

impl Workspace {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            patients: Patients::new(client.clone()),
            doctors: Doctors::new(client.clone()),
            appointments: Appointments::new(client.clone()),
            medical_records: MedicalRecords::new(client.clone()),
            prescriptions: Prescriptions::new(client.clone()),
            ipd_patients: IpdPatients::new(client.clone()),
            vitals: Vitals::new(client.clone()),
            medicine_schedules: MedicineSchedules::new(client.clone()),
            iv_schedules: IvSchedules::new(client.clone()),
            doctor_visits: DoctorVisits::new(client.clone()),
            bills: Bills::new(client.clone()),
        }
    }
}
