use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, SqlitePool};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use super::StoreResult;
use crate::error::StoreError;
use crate::models::{Appointment, AppointmentInsert, AppointmentStatus, AppointmentUpdate};

#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
}

pub struct AppointmentStore {
    pool: SqlitePool,
}

impl AppointmentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Chronological by date then slot label, id as tiebreaker.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &AppointmentFilter) -> StoreResult<Vec<Appointment>> {
        let mut qb = QueryBuilder::new("SELECT * FROM appointments WHERE 1 = 1");
        if let Some(patient_id) = filter.patient_id {
            qb.push(" AND patient_id = ").push_bind(patient_id);
        }
        if let Some(doctor_id) = filter.doctor_id {
            qb.push(" AND doctor_id = ").push_bind(doctor_id);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        qb.push(" ORDER BY date, time, id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_appointment).collect()
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: Uuid) -> StoreResult<Appointment> {
        let row = sqlx::query("SELECT * FROM appointments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("appointment"))?;
        row_to_appointment(&row)
    }

    #[instrument(skip(self, insert), fields(patient_id = %insert.patient_id, doctor_id = %insert.doctor_id))]
    pub async fn create(&self, insert: AppointmentInsert) -> StoreResult<Appointment> {
        insert.validate().map_err(StoreError::from_validation)?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO appointments (id, patient_id, doctor_id, date, time, type, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(insert.patient_id)
        .bind(insert.doctor_id)
        .bind(insert.date)
        .bind(&insert.time)
        .bind(&insert.kind)
        .bind(insert.status.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    /// Partial patch. A status change must follow the transition table or
    /// the call fails with Conflict.
    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: Uuid, patch: AppointmentUpdate) -> StoreResult<Appointment> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT * FROM appointments WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound("appointment"))?;
        let current = row_to_appointment(&row)?;

        if let Some(next) = patch.status {
            if !current.status.can_transition(next) {
                return Err(StoreError::Conflict(format!(
                    "appointment cannot move from {} to {}",
                    current.status, next
                )));
            }
        }

        let mut qb = QueryBuilder::new("UPDATE appointments SET ");
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
        if let Some(time) = &patch.time {
            set.push("time = ").push_bind_unseparated(time.clone());
            changed = true;
        }
        if let Some(kind) = &patch.kind {
            set.push("type = ").push_bind_unseparated(kind.clone());
            changed = true;
        }
        if let Some(status) = patch.status {
            set.push("status = ").push_bind_unseparated(status.as_str());
            changed = true;
        }
        if changed {
            qb.push(" WHERE id = ").push_bind(id);
            qb.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;

        self.get(id).await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("appointment"));
        }
        Ok(())
    }
}

fn row_to_appointment(row: &SqliteRow) -> StoreResult<Appointment> {
    let status: String = row.try_get("status")?;
    Ok(Appointment {
        id: row.try_get("id")?,
        patient_id: row.try_get("patient_id")?,
        doctor_id: row.try_get("doctor_id")?,
        date: row.try_get("date")?,
        time: row.try_get("time")?,
        kind: row.try_get("type")?,
        status: status.parse().map_err(StoreError::corrupt)?,
        created_at: row.try_get("created_at")?,
    })
}
