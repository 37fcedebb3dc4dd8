use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Appointment lifecycle state. Transitions are guarded at the store
/// boundary; re-asserting the current status is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Upcoming,
    Scheduled,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Upcoming => "Upcoming",
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::InProgress => "In Progress",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }

    /// Whether `next` is a legal successor of the current status.
    ///
    /// Upcoming -> {Scheduled, Cancelled}
    /// Scheduled -> {In Progress, Cancelled}
    /// In Progress -> {Completed, Cancelled}
    /// Completed, Cancelled are terminal.
    pub fn can_transition(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Upcoming, Scheduled)
                | (Upcoming, Cancelled)
                | (Scheduled, InProgress)
                | (Scheduled, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Upcoming" => Ok(AppointmentStatus::Upcoming),
            "Scheduled" => Ok(AppointmentStatus::Scheduled),
            "In Progress" => Ok(AppointmentStatus::InProgress),
            "Completed" => Ok(AppointmentStatus::Completed),
            "Cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("invalid appointment status: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    /// Booked slot label, e.g. "10:00 AM".
    pub time: String,
    /// Visit type, e.g. "Consultation", "Follow-up".
    #[serde(rename = "type")]
    pub kind: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppointmentInsert {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "Time slot is required"))]
    pub time: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "Appointment type is required"))]
    pub kind: String,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(AppointmentStatus::Upcoming, AppointmentStatus::Scheduled, true)]
    #[test_case(AppointmentStatus::Upcoming, AppointmentStatus::Completed, false)]
    #[test_case(AppointmentStatus::Scheduled, AppointmentStatus::InProgress, true)]
    #[test_case(AppointmentStatus::Scheduled, AppointmentStatus::Completed, false)]
    #[test_case(AppointmentStatus::InProgress, AppointmentStatus::Completed, true)]
    #[test_case(AppointmentStatus::InProgress, AppointmentStatus::Cancelled, true)]
    #[test_case(AppointmentStatus::Completed, AppointmentStatus::Scheduled, false)]
    #[test_case(AppointmentStatus::Cancelled, AppointmentStatus::Upcoming, false)]
    #[test_case(AppointmentStatus::Scheduled, AppointmentStatus::Scheduled, true)]
    fn transition_table(from: AppointmentStatus, to: AppointmentStatus, allowed: bool) {
        assert_eq!(from.can_transition(to), allowed);
    }

    #[test]
    fn wire_strings_round_trip() {
        for status in [
            AppointmentStatus::Upcoming,
            AppointmentStatus::Scheduled,
            AppointmentStatus::InProgress,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<AppointmentStatus>(), Ok(status));
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }
}
