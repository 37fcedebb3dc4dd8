use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, SqlitePool};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{like_pattern, StoreResult};
use crate::error::StoreError;
use crate::models::{IpdPatient, IpdPatientInsert, IpdPatientUpdate, Severity};

#[derive(Debug, Clone, Default)]
pub struct IpdFilter {
    pub doctor_id: Option<Uuid>,
    pub severity: Option<Severity>,
    pub room_number: Option<String>,
    /// Case-insensitive substring over room, bed, and condition.
    pub search: Option<String>,
    /// Only admissions that have not been discharged.
    pub active_only: bool,
}

pub struct IpdStore {
    pool: SqlitePool,
}

impl IpdStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Most recent admissions first, id as tiebreaker.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &IpdFilter) -> StoreResult<Vec<IpdPatient>> {
        let mut qb = QueryBuilder::new("SELECT * FROM ipd_patients WHERE 1 = 1");
        if let Some(doctor_id) = filter.doctor_id {
            qb.push(" AND assigned_doctor_id = ").push_bind(doctor_id);
        }
        if let Some(severity) = filter.severity {
            qb.push(" AND severity = ").push_bind(severity.as_str());
        }
        if let Some(room) = &filter.room_number {
            qb.push(" AND room_number = ").push_bind(room.clone());
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = like_pattern(search);
            qb.push(" AND (room_number LIKE ")
                .push_bind(pattern.clone())
                .push(" OR bed_number LIKE ")
                .push_bind(pattern.clone())
                .push(" OR condition LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if filter.active_only {
            qb.push(" AND discharged_at IS NULL");
        }
        qb.push(" ORDER BY admission_date DESC, created_at DESC, id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_admission).collect()
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: Uuid) -> StoreResult<IpdPatient> {
        let row = sqlx::query("SELECT * FROM ipd_patients WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("IPD admission"))?;
        row_to_admission(&row)
    }

    #[instrument(skip(self, insert), fields(patient_id = %insert.patient_id, room = %insert.room_number))]
    pub async fn create(&self, insert: IpdPatientInsert) -> StoreResult<IpdPatient> {
        insert.validate().map_err(StoreError::from_validation)?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO ipd_patients (id, patient_id, room_number, bed_number, admission_date,
                                       condition, severity, assigned_doctor_id, discharged_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL, ?)",
        )
        .bind(id)
        .bind(insert.patient_id)
        .bind(&insert.room_number)
        .bind(&insert.bed_number)
        .bind(insert.admission_date)
        .bind(&insert.condition)
        .bind(insert.severity.as_str())
        .bind(insert.assigned_doctor_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(admission_id = %id, "patient admitted");
        self.get(id).await
    }

    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: Uuid, patch: IpdPatientUpdate) -> StoreResult<IpdPatient> {
        let mut qb = QueryBuilder::new("UPDATE ipd_patients SET ");
        let mut set = qb.separated(", ");
        let mut changed = false;
        if let Some(room) = &patch.room_number {
            set.push("room_number = ").push_bind_unseparated(room.clone());
            changed = true;
        }
        if let Some(bed) = &patch.bed_number {
            set.push("bed_number = ").push_bind_unseparated(bed.clone());
            changed = true;
        }
        if let Some(date) = patch.admission_date {
            set.push("admission_date = ").push_bind_unseparated(date);
            changed = true;
        }
        if let Some(condition) = &patch.condition {
            set.push("condition = ").push_bind_unseparated(condition.clone());
            changed = true;
        }
        if let Some(severity) = patch.severity {
            set.push("severity = ").push_bind_unseparated(severity.as_str());
            changed = true;
        }
        if let Some(doctor_id) = patch.assigned_doctor_id {
            set.push("assigned_doctor_id = ").push_bind_unseparated(doctor_id);
            changed = true;
        }
        if !changed {
            return self.get(id).await;
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("IPD admission"));
        }
        self.get(id).await
    }

    /// Close the admission. Discharging twice is a Conflict.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn discharge(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<IpdPatient> {
        let result =
            sqlx::query("UPDATE ipd_patients SET discharged_at = ? WHERE id = ? AND discharged_at IS NULL")
                .bind(at)
                .bind(id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            // Either the admission is unknown or it is already closed.
            let current = self.get(id).await?;
            return Err(StoreError::Conflict(format!(
                "admission was already discharged at {}",
                current
                    .discharged_at
                    .map(|d| d.to_rfc3339())
                    .unwrap_or_default()
            )));
        }
        info!(admission_id = %id, "patient discharged");
        self.get(id).await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM ipd_patients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("IPD admission"));
        }
        Ok(())
    }
}

fn row_to_admission(row: &SqliteRow) -> StoreResult<IpdPatient> {
    let severity: String = row.try_get("severity")?;
    Ok(IpdPatient {
        id: row.try_get("id")?,
        patient_id: row.try_get("patient_id")?,
        room_number: row.try_get("room_number")?,
        bed_number: row.try_get("bed_number")?,
        admission_date: row.try_get("admission_date")?,
        condition: row.try_get("condition")?,
        severity: severity.parse().map_err(StoreError::corrupt)?,
        assigned_doctor_id: row.try_get("assigned_doctor_id")?,
        discharged_at: row.try_get("discharged_at")?,
        created_at: row.try_get("created_at")?,
    })
}
