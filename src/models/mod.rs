//! Data models for the Florence hospital administration platform.
//!
//! Every persisted entity carries a server-assigned `id` and `created_at`.
//! Relationships are soft foreign-id fields; deleting a referenced row
//! leaves dependents dangling (no cascade).

pub mod appointment;
pub mod billing;
pub mod doctor;
pub mod ipd;
pub mod patient;
pub mod profile;
pub mod records;

pub use appointment::{Appointment, AppointmentInsert, AppointmentStatus, AppointmentUpdate};
pub use billing::{Bill, BillInsert, BillItem, BillItemInsert, BillStatus, BillUpdate, Payment};
pub use doctor::{Doctor, DoctorInsert, DoctorUpdate};
pub use ipd::{
    DoctorVisit, DoctorVisitInsert, DoctorVisitUpdate, IpdPatient, IpdPatientInsert,
    IpdPatientUpdate, IvSchedule, IvScheduleInsert, IvScheduleUpdate, IvStatus, MedicineSchedule,
    MedicineScheduleInsert, MedicineScheduleUpdate, MedicineStatus, Severity, Vital, VitalInsert,
    VitalUpdate, VitalsStatus,
};
pub use patient::{Patient, PatientInsert, PatientUpdate};
pub use profile::{Profile, ProfileUpdate, Role};
pub use records::{
    MedicalRecord, MedicalRecordInsert, MedicalRecordUpdate, Prescription, PrescriptionInsert,
    PrescriptionUpdate,
};
