use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, SqlitePool};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use super::StoreResult;
use crate::error::StoreError;
use crate::models::{Doctor, DoctorInsert, DoctorUpdate};

pub struct DoctorStore {
    pool: SqlitePool,
}

impl DoctorStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Newest first, id as tiebreaker.
    #[instrument(skip(self))]
    pub async fn list(&self) -> StoreResult<Vec<Doctor>> {
        let rows = sqlx::query("SELECT * FROM doctors ORDER BY created_at DESC, id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_doctor).collect()
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: Uuid) -> StoreResult<Doctor> {
        let row = sqlx::query("SELECT * FROM doctors WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("doctor"))?;
        row_to_doctor(&row)
    }

    #[instrument(skip(self, insert), fields(name = %insert.name))]
    pub async fn create(&self, insert: DoctorInsert) -> StoreResult<Doctor> {
        insert.validate().map_err(StoreError::from_validation)?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        let availability = encode_availability(&insert.availability)?;
        sqlx::query(
            "INSERT INTO doctors (id, name, specialization, contact, email, experience, availability, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&insert.name)
        .bind(&insert.specialization)
        .bind(&insert.contact)
        .bind(&insert.email)
        .bind(insert.experience)
        .bind(availability)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: Uuid, patch: DoctorUpdate) -> StoreResult<Doctor> {
        let mut qb = QueryBuilder::new("UPDATE doctors SET ");
        let mut set = qb.separated(", ");
        let mut changed = false;
        if let Some(name) = &patch.name {
            set.push("name = ").push_bind_unseparated(name.clone());
            changed = true;
        }
        if let Some(specialization) = &patch.specialization {
            set.push("specialization = ")
                .push_bind_unseparated(specialization.clone());
            changed = true;
        }
        if let Some(contact) = &patch.contact {
            set.push("contact = ").push_bind_unseparated(contact.clone());
            changed = true;
        }
        if let Some(email) = &patch.email {
            set.push("email = ").push_bind_unseparated(email.clone());
            changed = true;
        }
        if let Some(experience) = patch.experience {
            set.push("experience = ").push_bind_unseparated(experience);
            changed = true;
        }
        if let Some(availability) = &patch.availability {
            set.push("availability = ")
                .push_bind_unseparated(encode_availability(availability)?);
            changed = true;
        }
        if !changed {
            return self.get(id).await;
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("doctor"));
        }
        self.get(id).await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM doctors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("doctor"));
        }
        Ok(())
    }
}

fn encode_availability(days: &[String]) -> StoreResult<String> {
    serde_json::to_string(days).map_err(|e| StoreError::corrupt(e.to_string()))
}

fn row_to_doctor(row: &SqliteRow) -> StoreResult<Doctor> {
    let availability: String = row.try_get("availability")?;
    Ok(Doctor {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        specialization: row.try_get("specialization")?,
        contact: row.try_get("contact")?,
        email: row.try_get("email")?,
        experience: row.try_get("experience")?,
        availability: serde_json::from_str(&availability)
            .map_err(|e| StoreError::corrupt(e.to_string()))?,
        created_at: row.try_get("created_at")?,
    })
}
