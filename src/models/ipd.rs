//! In-patient department (IPD) ward tracking.
//!
//! An admission (`IpdPatient`) is the parent of four observation streams:
//! vitals, medicine schedule, IV schedule, and doctor visits. Those rows are
//! meaningless outside a ward admission, so every listing is scoped by
//! `ipd_patient_id`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Clinician-set admission severity, not derived from vitals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    Stable,
    Recovering,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Stable => "Stable",
            Severity::Recovering => "Recovering",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Critical" => Ok(Severity::Critical),
            "Stable" => Ok(Severity::Stable),
            "Recovering" => Ok(Severity::Recovering),
            other => Err(format!("invalid severity: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpdPatient {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub room_number: String,
    pub bed_number: String,
    pub admission_date: NaiveDate,
    pub condition: String,
    pub severity: Severity,
    pub assigned_doctor_id: Option<Uuid>,
    /// Set when the admission ends; `None` means the patient is on the ward.
    pub discharged_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IpdPatientInsert {
    pub patient_id: Uuid,
    #[validate(length(min = 1, message = "Room number is required"))]
    pub room_number: String,
    #[validate(length(min = 1, message = "Bed number is required"))]
    pub bed_number: String,
    pub admission_date: NaiveDate,
    #[validate(length(min = 1, message = "Condition is required"))]
    pub condition: String,
    pub severity: Severity,
    pub assigned_doctor_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpdPatientUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bed_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_doctor_id: Option<Option<Uuid>>,
}

// ===== Vitals =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vital {
    pub id: Uuid,
    pub ipd_patient_id: Uuid,
    pub time: DateTime<Utc>,
    pub heart_rate: f64,
    pub temperature: f64,
    /// "systolic/diastolic", e.g. "120/80".
    pub blood_pressure: String,
    pub oxygen_saturation: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VitalInsert {
    pub ipd_patient_id: Uuid,
    pub time: DateTime<Utc>,
    pub heart_rate: f64,
    pub temperature: f64,
    #[validate(length(min = 1, message = "Blood pressure is required"))]
    pub blood_pressure: String,
    pub oxygen_saturation: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VitalUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oxygen_saturation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

// ===== Medicine schedule =====

/// Administration state of one scheduled dose. Advanced manually by staff;
/// doses never expire to Missed on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MedicineStatus {
    Scheduled,
    Pending,
    Given,
    Missed,
}

impl MedicineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MedicineStatus::Scheduled => "Scheduled",
            MedicineStatus::Pending => "Pending",
            MedicineStatus::Given => "Given",
            MedicineStatus::Missed => "Missed",
        }
    }

    /// Scheduled -> {Pending, Given, Missed}; Pending -> {Given, Missed};
    /// Given and Missed are terminal.
    pub fn can_transition(self, next: MedicineStatus) -> bool {
        use MedicineStatus::*;
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Scheduled, Pending)
                | (Scheduled, Given)
                | (Scheduled, Missed)
                | (Pending, Given)
                | (Pending, Missed)
        )
    }
}

impl fmt::Display for MedicineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MedicineStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Scheduled" => Ok(MedicineStatus::Scheduled),
            "Pending" => Ok(MedicineStatus::Pending),
            "Given" => Ok(MedicineStatus::Given),
            "Missed" => Ok(MedicineStatus::Missed),
            other => Err(format!("invalid medicine status: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineSchedule {
    pub id: Uuid,
    pub ipd_patient_id: Uuid,
    pub time: DateTime<Utc>,
    pub medicine: String,
    pub dosage: String,
    pub frequency: String,
    pub status: MedicineStatus,
    pub nurse: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MedicineScheduleInsert {
    pub ipd_patient_id: Uuid,
    pub time: DateTime<Utc>,
    #[validate(length(min = 1, message = "Medicine is required"))]
    pub medicine: String,
    #[validate(length(min = 1, message = "Dosage is required"))]
    pub dosage: String,
    #[validate(length(min = 1, message = "Frequency is required"))]
    pub frequency: String,
    pub status: MedicineStatus,
    pub nurse: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicineScheduleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medicine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MedicineStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nurse: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

// ===== IV schedule =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IvStatus {
    Scheduled,
    Running,
    Completed,
    Stopped,
}

impl IvStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IvStatus::Scheduled => "Scheduled",
            IvStatus::Running => "Running",
            IvStatus::Completed => "Completed",
            IvStatus::Stopped => "Stopped",
        }
    }

    /// Scheduled -> {Running, Stopped}; Running -> {Completed, Stopped};
    /// Completed and Stopped are terminal.
    pub fn can_transition(self, next: IvStatus) -> bool {
        use IvStatus::*;
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Scheduled, Running) | (Scheduled, Stopped) | (Running, Completed) | (Running, Stopped)
        )
    }
}

impl fmt::Display for IvStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IvStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Scheduled" => Ok(IvStatus::Scheduled),
            "Running" => Ok(IvStatus::Running),
            "Completed" => Ok(IvStatus::Completed),
            "Stopped" => Ok(IvStatus::Stopped),
            other => Err(format!("invalid IV status: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IvSchedule {
    pub id: Uuid,
    pub ipd_patient_id: Uuid,
    pub time: DateTime<Utc>,
    pub fluid: String,
    pub volume: String,
    pub rate: String,
    pub status: IvStatus,
    pub nurse: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IvScheduleInsert {
    pub ipd_patient_id: Uuid,
    pub time: DateTime<Utc>,
    #[validate(length(min = 1, message = "Fluid is required"))]
    pub fluid: String,
    #[validate(length(min = 1, message = "Volume is required"))]
    pub volume: String,
    #[validate(length(min = 1, message = "Rate is required"))]
    pub rate: String,
    pub status: IvStatus,
    pub nurse: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IvScheduleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fluid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IvStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nurse: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

// ===== Doctor visits =====

/// Clinician's qualitative read of the patient at visit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VitalsStatus {
    Stable,
    Improving,
    Critical,
    Declining,
}

impl VitalsStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VitalsStatus::Stable => "Stable",
            VitalsStatus::Improving => "Improving",
            VitalsStatus::Critical => "Critical",
            VitalsStatus::Declining => "Declining",
        }
    }
}

impl fmt::Display for VitalsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VitalsStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Stable" => Ok(VitalsStatus::Stable),
            "Improving" => Ok(VitalsStatus::Improving),
            "Critical" => Ok(VitalsStatus::Critical),
            "Declining" => Ok(VitalsStatus::Declining),
            other => Err(format!("invalid vitals status: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorVisit {
    pub id: Uuid,
    pub ipd_patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub time: DateTime<Utc>,
    pub visit_type: String,
    pub notes: Option<String>,
    pub vitals_status: Option<VitalsStatus>,
    /// Free-text prescription, deliberately not linked to the Prescription
    /// entity.
    pub prescription: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DoctorVisitInsert {
    pub ipd_patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub time: DateTime<Utc>,
    #[validate(length(min = 1, message = "Visit type is required"))]
    pub visit_type: String,
    pub notes: Option<String>,
    pub vitals_status: Option<VitalsStatus>,
    pub prescription: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorVisitUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vitals_status: Option<Option<VitalsStatus>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prescription: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(MedicineStatus::Scheduled, MedicineStatus::Given, true)]
    #[test_case(MedicineStatus::Scheduled, MedicineStatus::Pending, true)]
    #[test_case(MedicineStatus::Pending, MedicineStatus::Missed, true)]
    #[test_case(MedicineStatus::Given, MedicineStatus::Pending, false)]
    #[test_case(MedicineStatus::Missed, MedicineStatus::Given, false)]
    fn medicine_transitions(from: MedicineStatus, to: MedicineStatus, allowed: bool) {
        assert_eq!(from.can_transition(to), allowed);
    }

    #[test_case(IvStatus::Scheduled, IvStatus::Running, true)]
    #[test_case(IvStatus::Scheduled, IvStatus::Completed, false)]
    #[test_case(IvStatus::Running, IvStatus::Completed, true)]
    #[test_case(IvStatus::Running, IvStatus::Stopped, true)]
    #[test_case(IvStatus::Completed, IvStatus::Running, false)]
    #[test_case(IvStatus::Stopped, IvStatus::Scheduled, false)]
    fn iv_transitions(from: IvStatus, to: IvStatus, allowed: bool) {
        assert_eq!(from.can_transition(to), allowed);
    }
}
