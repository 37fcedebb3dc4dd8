//! Resource access layer.
//!
//! One store per entity, all sharing the connection pool. Every operation
//! returns `Result<_, StoreError>`; underlying sqlx failures never escape
//! raw. Listings have a documented, stable ordering. No caching happens at
//! this layer.

pub mod appointments;
pub mod billing;
pub mod doctors;
pub mod ipd;
pub mod patients;
pub mod profiles;
pub mod records;
pub mod ward;

use sqlx::SqlitePool;

use crate::db::Database;
use crate::error::StoreError;

pub use appointments::{AppointmentFilter, AppointmentStore};
pub use billing::{BillFilter, BillStore};
pub use doctors::DoctorStore;
pub use ipd::{IpdFilter, IpdStore};
pub use patients::{PatientFilter, PatientStore};
pub use profiles::ProfileStore;
pub use records::{MedicalRecordStore, PrescriptionStore, RecordFilter};
pub use ward::{
    DoctorVisitFilter, DoctorVisitStore, IvScheduleFilter, IvScheduleStore, MedicineScheduleFilter,
    MedicineScheduleStore, VitalStore, VitalsRange,
};

pub type StoreResult<T> = Result<T, StoreError>;

/// Handle to every entity store.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    pub fn patients(&self) -> PatientStore {
        PatientStore::new(self.pool.clone())
    }

    pub fn doctors(&self) -> DoctorStore {
        DoctorStore::new(self.pool.clone())
    }

    pub fn appointments(&self) -> AppointmentStore {
        AppointmentStore::new(self.pool.clone())
    }

    pub fn medical_records(&self) -> MedicalRecordStore {
        MedicalRecordStore::new(self.pool.clone())
    }

    pub fn prescriptions(&self) -> PrescriptionStore {
        PrescriptionStore::new(self.pool.clone())
    }

    pub fn ipd_patients(&self) -> IpdStore {
        IpdStore::new(self.pool.clone())
    }

    pub fn vitals(&self) -> VitalStore {
        VitalStore::new(self.pool.clone())
    }

    pub fn medicine_schedule(&self) -> MedicineScheduleStore {
        MedicineScheduleStore::new(self.pool.clone())
    }

    pub fn iv_schedule(&self) -> IvScheduleStore {
        IvScheduleStore::new(self.pool.clone())
    }

    pub fn doctor_visits(&self) -> DoctorVisitStore {
        DoctorVisitStore::new(self.pool.clone())
    }

    pub fn bills(&self) -> BillStore {
        BillStore::new(self.pool.clone())
    }

    pub fn profiles(&self) -> ProfileStore {
        ProfileStore::new(self.pool.clone())
    }
}

/// SQL LIKE pattern for a case-insensitive substring search.
pub(crate) fn like_pattern(term: &str) -> String {
    format!("%{term}%")
}
