//! Ward admission lifecycle and the scoped observation streams hanging off
//! it. Every observation listing is keyed by the admission id; rows from
//! other admissions must never bleed through.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use florence::db::Database;
use florence::error::StoreError;
use florence::models::{
    IpdPatientInsert, IpdPatientUpdate, IvScheduleInsert, IvScheduleUpdate, IvStatus,
    MedicineScheduleInsert, MedicineScheduleUpdate, MedicineStatus, Severity, VitalInsert,
};
use florence::store::{IpdFilter, IvScheduleFilter, MedicineScheduleFilter, Store, VitalsRange};

async fn store() -> Store {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    Store::new(&db)
}

fn admission(room: &str, bed: &str) -> IpdPatientInsert {
    IpdPatientInsert {
        patient_id: Uuid::new_v4(),
        room_number: room.to_string(),
        bed_number: bed.to_string(),
        admission_date: "2026-08-03".parse().unwrap(),
        condition: "Pneumonia".to_string(),
        severity: Severity::Stable,
        assigned_doctor_id: None,
    }
}

fn vital(ipd_patient_id: Uuid, at: DateTime<Utc>) -> VitalInsert {
    VitalInsert {
        ipd_patient_id,
        time: at,
        heart_rate: 78.0,
        temperature: 37.2,
        blood_pressure: "120/80".to_string(),
        oxygen_saturation: 97.0,
        notes: None,
    }
}

#[tokio::test]
async fn admission_form_requires_every_field() {
    let store = store().await;
    let err = store
        .ipd_patients()
        .create(IpdPatientInsert {
            room_number: String::new(),
            bed_number: String::new(),
            ..admission("301", "B")
        })
        .await
        .unwrap_err();
    let StoreError::Validation(message) = err else {
        panic!("expected a validation failure");
    };
    assert!(message.contains("Room number is required"));
    assert!(message.contains("Bed number is required"));
    assert!(store
        .ipd_patients()
        .list(&IpdFilter::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn vitals_fetch_is_scoped_to_one_admission() {
    let store = store().await;
    let a = store.ipd_patients().create(admission("301", "A")).await.unwrap();
    let b = store.ipd_patients().create(admission("302", "B")).await.unwrap();
    let now = Utc::now();

    store.vitals().create(vital(a.id, now - Duration::hours(2))).await.unwrap();
    store.vitals().create(vital(a.id, now - Duration::hours(1))).await.unwrap();
    store.vitals().create(vital(b.id, now)).await.unwrap();

    let mine = store.vitals().list(a.id, &VitalsRange::default()).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|v| v.ipd_patient_id == a.id));
    // Newest observation first.
    assert!(mine[0].time > mine[1].time);

    let theirs = store.vitals().list(b.id, &VitalsRange::default()).await.unwrap();
    assert_eq!(theirs.len(), 1);
}

#[tokio::test]
async fn vitals_range_and_latest_reads() {
    let store = store().await;
    let a = store.ipd_patients().create(admission("303", "A")).await.unwrap();
    let now = Utc::now();

    store.vitals().create(vital(a.id, now - Duration::hours(6))).await.unwrap();
    let newest = store.vitals().create(vital(a.id, now)).await.unwrap();

    let windowed = store
        .vitals()
        .list(
            a.id,
            &VitalsRange {
                start: Some(now - Duration::hours(1)),
                end: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(windowed.len(), 1);
    assert_eq!(windowed[0].id, newest.id);

    let latest = store.vitals().latest(a.id).await.unwrap().unwrap();
    assert_eq!(latest.id, newest.id);

    assert!(store.vitals().latest(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn medicine_dose_status_follows_the_transition_table() {
    let store = store().await;
    let a = store.ipd_patients().create(admission("304", "A")).await.unwrap();
    let dose = store
        .medicine_schedule()
        .create(MedicineScheduleInsert {
            ipd_patient_id: a.id,
            time: Utc::now(),
            medicine: "Ceftriaxone".to_string(),
            dosage: "1g".to_string(),
            frequency: "BD".to_string(),
            status: MedicineStatus::Scheduled,
            nurse: Some("Nurse Thomas".to_string()),
            notes: None,
        })
        .await
        .unwrap();

    let given = store
        .medicine_schedule()
        .update(
            dose.id,
            MedicineScheduleUpdate {
                status: Some(MedicineStatus::Given),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(given.status, MedicineStatus::Given);

    // Given is terminal.
    let err = store
        .medicine_schedule()
        .update(
            dose.id,
            MedicineScheduleUpdate {
                status: Some(MedicineStatus::Pending),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn medicine_listing_filters_by_status_within_the_admission() {
    let store = store().await;
    let a = store.ipd_patients().create(admission("305", "A")).await.unwrap();
    let dose = |status: MedicineStatus| MedicineScheduleInsert {
        ipd_patient_id: a.id,
        time: Utc::now(),
        medicine: "Paracetamol".to_string(),
        dosage: "500mg".to_string(),
        frequency: "TDS".to_string(),
        status,
        nurse: None,
        notes: None,
    };
    store.medicine_schedule().create(dose(MedicineStatus::Scheduled)).await.unwrap();
    store.medicine_schedule().create(dose(MedicineStatus::Given)).await.unwrap();

    let pending = store
        .medicine_schedule()
        .list(
            a.id,
            &MedicineScheduleFilter {
                status: Some(MedicineStatus::Scheduled),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].status, MedicineStatus::Scheduled);
}

#[tokio::test]
async fn iv_infusion_status_follows_the_transition_table() {
    let store = store().await;
    let a = store.ipd_patients().create(admission("306", "A")).await.unwrap();
    let infusion = store
        .iv_schedule()
        .create(IvScheduleInsert {
            ipd_patient_id: a.id,
            time: Utc::now(),
            fluid: "Normal saline".to_string(),
            volume: "500ml".to_string(),
            rate: "100ml/hr".to_string(),
            status: IvStatus::Scheduled,
            nurse: None,
            notes: None,
        })
        .await
        .unwrap();

    // Scheduled cannot complete without running.
    let err = store
        .iv_schedule()
        .update(
            infusion.id,
            IvScheduleUpdate {
                status: Some(IvStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    for next in [IvStatus::Running, IvStatus::Completed] {
        let updated = store
            .iv_schedule()
            .update(
                infusion.id,
                IvScheduleUpdate {
                    status: Some(next),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, next);
    }

    let listed = store
        .iv_schedule()
        .list(a.id, &IvScheduleFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn discharge_closes_the_admission_exactly_once() {
    let store = store().await;
    let a = store.ipd_patients().create(admission("307", "A")).await.unwrap();
    let b = store.ipd_patients().create(admission("308", "B")).await.unwrap();
    assert!(a.discharged_at.is_none());

    let when = Utc::now();
    let discharged = store.ipd_patients().discharge(a.id, when).await.unwrap();
    assert_eq!(discharged.discharged_at, Some(when));

    // Severity stays clinician-set after discharge.
    let updated = store
        .ipd_patients()
        .update(
            a.id,
            IpdPatientUpdate {
                severity: Some(Severity::Recovering),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.severity, Severity::Recovering);

    let active = store
        .ipd_patients()
        .list(&IpdFilter {
            active_only: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, b.id);

    let everyone = store.ipd_patients().list(&IpdFilter::default()).await.unwrap();
    assert_eq!(everyone.len(), 2);

    // Discharging twice is a conflict, not a silent overwrite.
    let err = store.ipd_patients().discharge(a.id, Utc::now()).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}
