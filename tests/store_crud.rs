//! Round-trip properties of the resource access layer against an in-memory
//! database: a created row shows up in listings, a patch changes exactly
//! the patched fields, and a deleted id is unreachable afterwards.

use chrono::NaiveDate;
use fake::faker::name::en::Name;
use fake::Fake;
use uuid::Uuid;

use florence::db::Database;
use florence::error::StoreError;
use florence::models::{
    AppointmentInsert, AppointmentStatus, AppointmentUpdate, DoctorInsert, DoctorUpdate,
    MedicalRecordInsert, PatientInsert, PatientUpdate, PrescriptionInsert, Role,
};
use florence::store::{AppointmentFilter, PatientFilter, RecordFilter, Store};

async fn store() -> Store {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    Store::new(&db)
}

fn patient_insert(name: &str) -> PatientInsert {
    PatientInsert {
        name: name.to_string(),
        age: 42,
        gender: "F".to_string(),
        contact: Some("99880 12345".to_string()),
        email: None,
        abha_id: Some("12-3456-7890-1234".to_string()),
        address: None,
        photo_url: None,
    }
}

#[tokio::test]
async fn create_then_list_includes_submitted_fields() {
    let store = store().await;
    let name: String = Name().fake();
    let insert = patient_insert(&name);

    let created = store.patients().create(insert.clone()).await.unwrap();

    let listed = store.patients().list(&PatientFilter::default()).await.unwrap();
    let row = listed.iter().find(|p| p.id == created.id).unwrap();
    assert_eq!(row.name, insert.name);
    assert_eq!(row.age, insert.age);
    assert_eq!(row.gender, insert.gender);
    assert_eq!(row.contact, insert.contact);
    assert_eq!(row.abha_id, insert.abha_id);
    assert_eq!(row.created_at, created.created_at);
}

#[tokio::test]
async fn update_patches_only_the_given_fields() {
    let store = store().await;
    let created = store
        .patients()
        .create(patient_insert("Meera Pillai"))
        .await
        .unwrap();

    let patched = store
        .patients()
        .update(
            created.id,
            PatientUpdate {
                name: Some("Meera Nair".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(patched.name, "Meera Nair");
    // Everything else is untouched.
    assert_eq!(patched.age, created.age);
    assert_eq!(patched.contact, created.contact);
    assert_eq!(patched.abha_id, created.abha_id);
    assert_eq!(patched.created_at, created.created_at);

    let fetched = store.patients().get(created.id).await.unwrap();
    assert_eq!(fetched, patched);
}

#[tokio::test]
async fn update_of_missing_id_is_not_found() {
    let store = store().await;
    let err = store
        .patients()
        .update(
            Uuid::new_v4(),
            PatientUpdate {
                name: Some("Nobody".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn delete_removes_the_row_and_is_not_found_afterwards() {
    let store = store().await;
    let created = store
        .patients()
        .create(patient_insert("Arun Joshi"))
        .await
        .unwrap();

    store.patients().delete(created.id).await.unwrap();

    let listed = store.patients().list(&PatientFilter::default()).await.unwrap();
    assert!(listed.iter().all(|p| p.id != created.id));
    assert!(matches!(
        store.patients().get(created.id).await.unwrap_err(),
        StoreError::NotFound(_)
    ));
    // A second delete reports NotFound rather than crashing.
    assert!(matches!(
        store.patients().delete(created.id).await.unwrap_err(),
        StoreError::NotFound(_)
    ));
}

#[tokio::test]
async fn patient_search_matches_name_substring() {
    let store = store().await;
    store.patients().create(patient_insert("Anand Rao")).await.unwrap();
    store.patients().create(patient_insert("Bela Shah")).await.unwrap();

    let filter = PatientFilter {
        search: Some("Anand".to_string()),
    };
    let hits = store.patients().list(&filter).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Anand Rao");
}

#[tokio::test]
async fn blank_required_field_is_rejected_before_any_insert() {
    let store = store().await;
    let err = store
        .patients()
        .create(PatientInsert {
            name: String::new(),
            ..patient_insert("ignored")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let listed = store.patients().list(&PatientFilter::default()).await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn doctor_availability_is_a_mutable_weekday_set() {
    let store = store().await;
    let created = store
        .doctors()
        .create(DoctorInsert {
            name: "Dr. Kavita Rao".to_string(),
            specialization: "Cardiology".to_string(),
            contact: None,
            email: None,
            experience: Some(12),
            availability: vec!["Monday".to_string(), "Wednesday".to_string()],
        })
        .await
        .unwrap();
    assert_eq!(created.availability, ["Monday", "Wednesday"]);

    let patched = store
        .doctors()
        .update(
            created.id,
            DoctorUpdate {
                availability: Some(vec!["Friday".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.availability, ["Friday"]);
    assert_eq!(patched.specialization, created.specialization);
}

#[tokio::test]
async fn appointments_list_in_slot_order_and_filter_by_patient() {
    let store = store().await;
    let patient_id = Uuid::new_v4();
    let doctor_id = Uuid::new_v4();
    let book = |date: &str, time: &str| AppointmentInsert {
        patient_id,
        doctor_id,
        date: date.parse::<NaiveDate>().unwrap(),
        time: time.to_string(),
        kind: "Consultation".to_string(),
        status: AppointmentStatus::Scheduled,
    };

    store.appointments().create(book("2026-08-07", "11:00 AM")).await.unwrap();
    store.appointments().create(book("2026-08-06", "09:00 AM")).await.unwrap();
    let other = store
        .appointments()
        .create(AppointmentInsert {
            patient_id: Uuid::new_v4(),
            ..book("2026-08-05", "10:00 AM")
        })
        .await
        .unwrap();

    let mine = store
        .appointments()
        .list(&AppointmentFilter {
            patient_id: Some(patient_id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|a| a.patient_id == patient_id));
    assert!(mine[0].date < mine[1].date);

    let all = store.appointments().list(&AppointmentFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].id, other.id);
}

#[tokio::test]
async fn appointment_status_change_must_follow_the_transition_table() {
    let store = store().await;
    let booked = store
        .appointments()
        .create(AppointmentInsert {
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            date: "2026-08-10".parse().unwrap(),
            time: "10:00 AM".to_string(),
            kind: "Follow-up".to_string(),
            status: AppointmentStatus::Scheduled,
        })
        .await
        .unwrap();

    // Scheduled cannot jump straight to Completed.
    let err = store
        .appointments()
        .update(
            booked.id,
            AppointmentUpdate {
                status: Some(AppointmentStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    let in_progress = store
        .appointments()
        .update(
            booked.id,
            AppointmentUpdate {
                status: Some(AppointmentStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(in_progress.status, AppointmentStatus::InProgress);

    let done = store
        .appointments()
        .update(
            booked.id,
            AppointmentUpdate {
                status: Some(AppointmentStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(done.status, AppointmentStatus::Completed);
}

#[tokio::test]
async fn medical_records_and_prescriptions_filter_by_patient() {
    let store = store().await;
    let patient_id = Uuid::new_v4();

    store
        .medical_records()
        .create(MedicalRecordInsert {
            patient_id,
            doctor_id: None,
            date: "2026-08-01".parse().unwrap(),
            condition: "Hypertension".to_string(),
            notes: Some("Monitor weekly".to_string()),
        })
        .await
        .unwrap();
    store
        .medical_records()
        .create(MedicalRecordInsert {
            patient_id: Uuid::new_v4(),
            doctor_id: None,
            date: "2026-08-02".parse().unwrap(),
            condition: "Fracture".to_string(),
            notes: None,
        })
        .await
        .unwrap();
    store
        .prescriptions()
        .create(PrescriptionInsert {
            patient_id,
            doctor_id: None,
            date: "2026-08-01".parse().unwrap(),
            medication: "Amlodipine".to_string(),
            dosage: "5mg".to_string(),
        })
        .await
        .unwrap();

    let filter = RecordFilter {
        patient_id: Some(patient_id),
        ..Default::default()
    };
    let records = store.medical_records().list(&filter).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].condition, "Hypertension");

    let scripts = store.prescriptions().list(&filter).await.unwrap();
    assert_eq!(scripts.len(), 1);
    assert_eq!(scripts[0].medication, "Amlodipine");
}

#[tokio::test]
async fn profile_is_created_with_the_default_role_on_first_sight() {
    let store = store().await;
    let user_id = Uuid::new_v4();

    let profile = store
        .profiles()
        .ensure(user_id, "asha@clinic.test", Some("Asha Verma"))
        .await
        .unwrap();
    assert_eq!(profile.id, user_id);
    assert_eq!(profile.role, Role::Doctor);
    assert_eq!(profile.full_name.as_deref(), Some("Asha Verma"));

    // A second ensure returns the stored row untouched.
    let again = store
        .profiles()
        .ensure(user_id, "asha@clinic.test", Some("Renamed"))
        .await
        .unwrap();
    assert_eq!(again, profile);
}
