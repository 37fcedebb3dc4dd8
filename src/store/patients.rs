use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, SqlitePool};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use super::{like_pattern, StoreResult};
use crate::error::StoreError;
use crate::models::{Patient, PatientInsert, PatientUpdate};

/// Sparse equality/search filter for patient listings.
#[derive(Debug, Clone, Default)]
pub struct PatientFilter {
    /// Case-insensitive substring over name, contact, and ABHA id.
    pub search: Option<String>,
}

pub struct PatientStore {
    pool: SqlitePool,
}

impl PatientStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Newest registrations first; id breaks ties so the order is stable.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &PatientFilter) -> StoreResult<Vec<Patient>> {
        let mut qb = QueryBuilder::new("SELECT * FROM patients");
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = like_pattern(search);
            qb.push(" WHERE (name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR contact LIKE ")
                .push_bind(pattern.clone())
                .push(" OR abha_id LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        qb.push(" ORDER BY created_at DESC, id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_patient).collect()
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: Uuid) -> StoreResult<Patient> {
        let row = sqlx::query("SELECT * FROM patients WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("patient"))?;
        row_to_patient(&row)
    }

    #[instrument(skip(self, insert), fields(name = %insert.name))]
    pub async fn create(&self, insert: PatientInsert) -> StoreResult<Patient> {
        insert.validate().map_err(StoreError::from_validation)?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO patients (id, name, age, gender, contact, email, abha_id, address, photo_url, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&insert.name)
        .bind(insert.age)
        .bind(&insert.gender)
        .bind(&insert.contact)
        .bind(&insert.email)
        .bind(&insert.abha_id)
        .bind(&insert.address)
        .bind(&insert.photo_url)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: Uuid, patch: PatientUpdate) -> StoreResult<Patient> {
        let mut qb = QueryBuilder::new("UPDATE patients SET ");
        let mut set = qb.separated(", ");
        let mut changed = false;
        if let Some(name) = &patch.name {
            set.push("name = ").push_bind_unseparated(name.clone());
            changed = true;
        }
        if let Some(age) = patch.age {
            set.push("age = ").push_bind_unseparated(age);
            changed = true;
        }
        if let Some(gender) = &patch.gender {
            set.push("gender = ").push_bind_unseparated(gender.clone());
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
        if let Some(abha_id) = &patch.abha_id {
            set.push("abha_id = ").push_bind_unseparated(abha_id.clone());
            changed = true;
        }
        if let Some(address) = &patch.address {
            set.push("address = ").push_bind_unseparated(address.clone());
            changed = true;
        }
        if let Some(photo_url) = &patch.photo_url {
            set.push("photo_url = ").push_bind_unseparated(photo_url.clone());
            changed = true;
        }
        if !changed {
            return self.get(id).await;
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("patient"));
        }
        self.get(id).await
    }

    /// Hard delete. Dependent rows keep their patient_id and dangle.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM patients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("patient"));
        }
        Ok(())
    }
}

fn row_to_patient(row: &SqliteRow) -> StoreResult<Patient> {
    Ok(Patient {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        age: row.try_get("age")?,
        gender: row.try_get("gender")?,
        contact: row.try_get("contact")?,
        email: row.try_get("email")?,
        abha_id: row.try_get("abha_id")?,
        address: row.try_get("address")?,
        photo_url: row.try_get("photo_url")?,
        created_at: row.try_get("created_at")?,
    })
}
