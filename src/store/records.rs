//! Medical record and prescription stores. The two follow the same shape:
//! patient-scoped history rows, newest date first.

use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, SqlitePool};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use super::{like_pattern, StoreResult};
use crate::error::StoreError;
use crate::models::{
    MedicalRecord, MedicalRecordInsert, MedicalRecordUpdate, Prescription, PrescriptionInsert,
    PrescriptionUpdate,
};

#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
}

pub struct MedicalRecordStore {
    pool: SqlitePool,
}

impl MedicalRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Newest record date first, then creation time, id as tiebreaker.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &RecordFilter) -> StoreResult<Vec<MedicalRecord>> {
        let mut qb = QueryBuilder::new("SELECT * FROM medical_records WHERE 1 = 1");
        if let Some(patient_id) = filter.patient_id {
            qb.push(" AND patient_id = ").push_bind(patient_id);
        }
        if let Some(doctor_id) = filter.doctor_id {
            qb.push(" AND doctor_id = ").push_bind(doctor_id);
        }
        if let Some(start) = filter.start_date {
            qb.push(" AND date >= ").push_bind(start);
        }
        if let Some(end) = filter.end_date {
            qb.push(" AND date <= ").push_bind(end);
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            qb.push(" AND condition LIKE ").push_bind(like_pattern(search));
        }
        qb.push(" ORDER BY date DESC, created_at DESC, id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_record).collect()
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: Uuid) -> StoreResult<MedicalRecord> {
        let row = sqlx::query("SELECT * FROM medical_records WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("medical record"))?;
        row_to_record(&row)
    }

    #[instrument(skip(self, insert), fields(patient_id = %insert.patient_id))]
    pub async fn create(&self, insert: MedicalRecordInsert) -> StoreResult<MedicalRecord> {
        insert.validate().map_err(StoreError::from_validation)?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO medical_records (id, patient_id, doctor_id, date, condition, notes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(insert.patient_id)
        .bind(insert.doctor_id)
        .bind(insert.date)
        .bind(&insert.condition)
        .bind(&insert.notes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: Uuid, patch: MedicalRecordUpdate) -> StoreResult<MedicalRecord> {
        let mut qb = QueryBuilder::new("UPDATE medical_records SET ");
        let mut set = qb.separated(", ");
        let mut changed = false;
        if let Some(patient_id) = patch.patient_id {
            set.push("patient_id = ").push_bind_unseparated(patient_id);
            changed = true;
        }
        if let Some(doctor_id) = patch.doctor_id {
            set.push("doctor_id = ").push_bind_unseparated(doctor_id);
            changed = true;
        }
        if let Some(date) = patch.date {
            set.push("date = ").push_bind_unseparated(date);
            changed = true;
        }
        if let Some(condition) = &patch.condition {
            set.push("condition = ").push_bind_unseparated(condition.clone());
            changed = true;
        }
        if let Some(notes) = &patch.notes {
            set.push("notes = ").push_bind_unseparated(notes.clone());
            changed = true;
        }
        if !changed {
            return self.get(id).await;
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("medical record"));
        }
        self.get(id).await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM medical_records WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("medical record"));
        }
        Ok(())
    }
}

fn row_to_record(row: &SqliteRow) -> StoreResult<MedicalRecord> {
    Ok(MedicalRecord {
        id: row.try_get("id")?,
        patient_id: row.try_get("patient_id")?,
        doctor_id: row.try_get("doctor_id")?,
        date: row.try_get("date")?,
        condition: row.try_get("condition")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

pub struct PrescriptionStore {
    pool: SqlitePool,
}

impl PrescriptionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Newest prescription date first, then creation time, id as tiebreaker.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &RecordFilter) -> StoreResult<Vec<Prescription>> {
        let mut qb = QueryBuilder::new("SELECT * FROM prescriptions WHERE 1 = 1");
        if let Some(patient_id) = filter.patient_id {
            qb.push(" AND patient_id = ").push_bind(patient_id);
        }
        if let Some(doctor_id) = filter.doctor_id {
            qb.push(" AND doctor_id = ").push_bind(doctor_id);
        }
        if let Some(start) = filter.start_date {
            qb.push(" AND date >= ").push_bind(start);
        }
        if let Some(end) = filter.end_date {
            qb.push(" AND date <= ").push_bind(end);
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            qb.push(" AND medication LIKE ").push_bind(like_pattern(search));
        }
        qb.push(" ORDER BY date DESC, created_at DESC, id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_prescription).collect()
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: Uuid) -> StoreResult<Prescription> {
        let row = sqlx::query("SELECT * FROM prescriptions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("prescription"))?;
        row_to_prescription(&row)
    }

    #[instrument(skip(self, insert), fields(patient_id = %insert.patient_id))]
    pub async fn create(&self, insert: PrescriptionInsert) -> StoreResult<Prescription> {
        insert.validate().map_err(StoreError::from_validation)?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO prescriptions (id, patient_id, doctor_id, date, medication, dosage, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(insert.patient_id)
        .bind(insert.doctor_id)
        .bind(insert.date)
        .bind(&insert.medication)
        .bind(&insert.dosage)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: Uuid, patch: PrescriptionUpdate) -> StoreResult<Prescription> {
        let mut qb = QueryBuilder::new("UPDATE prescriptions SET ");
        let mut set = qb.separated(", ");
        let mut changed = false;
        if let Some(patient_id) = patch.patient_id {
            set.push("patient_id = ").push_bind_unseparated(patient_id);
            changed = true;
        }
        if let Some(doctor_id) = patch.doctor_id {
            set.push("doctor_id = ").push_bind_unseparated(doctor_id);
            changed = true;
        }
        if let Some(date) = patch.date {
            set.push("date = ").push_bind_unseparated(date);
            changed = true;
        }
        if let Some(medication) = &patch.medication {
            set.push("medication = ").push_bind_unseparated(medication.clone());
            changed = true;
        }
        if let Some(dosage) = &patch.dosage {
            set.push("dosage = ").push_bind_unseparated(dosage.clone());
            changed = true;
        }
        if !changed {
            return self.get(id).await;
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("prescription"));
        }
        self.get(id).await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM prescriptions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("prescription"));
        }
        Ok(())
    }
}

fn row_to_prescription(row: &SqliteRow) -> StoreResult<Prescription> {
    Ok(Prescription {
        id: row.try_get("id")?,
        patient_id: row.try_get("patient_id")?,
        doctor_id: row.try_get("doctor_id")?,
        date: row.try_get("date")?,
        medication: row.try_get("medication")?,
        dosage: row.try_get("dosage")?,
        created_at: row.try_get("created_at")?,
    })
}
