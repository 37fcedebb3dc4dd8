use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, SqlitePool};
use tracing::{info, instrument};
use uuid::Uuid;

use super::StoreResult;
use crate::error::StoreError;
use crate::models::{Profile, ProfileUpdate, Role};

pub struct ProfileStore {
    pool: SqlitePool,
}

impl ProfileStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: Uuid) -> StoreResult<Profile> {
        let row = sqlx::query("SELECT * FROM profiles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("profile"))?;
        row_to_profile(&row)
    }

    /// Fetch the profile for an identity, creating one with the default
    /// role on first login.
    #[instrument(skip(self), fields(id = %id, email = %email))]
    pub async fn ensure(&self, id: Uuid, email: &str, full_name: Option<&str>) -> StoreResult<Profile> {
        match self.get(id).await {
            Ok(profile) => Ok(profile),
            Err(StoreError::NotFound(_)) => {
                let now = Utc::now();
                sqlx::query(
                    "INSERT INTO profiles (id, email, full_name, role, phone, department, doctor_id, created_at, updated_at)
                     VALUES (?, ?, ?, ?, NULL, NULL, NULL, ?, ?)",
                )
                .bind(id)
                .bind(email)
                .bind(full_name)
                .bind(Role::default().as_str())
                .bind(now)
                .bind(now)
                .execute(&self.pool)
                .await?;
                info!(profile_id = %id, "profile auto-created");
                self.get(id).await
            }
            Err(err) => Err(err),
        }
    }

    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: Uuid, patch: ProfileUpdate) -> StoreResult<Profile> {
        let mut qb = QueryBuilder::new("UPDATE profiles SET ");
        let mut set = qb.separated(", ");
        if let Some(full_name) = &patch.full_name {
            set.push("full_name = ").push_bind_unseparated(full_name.clone());
        }
        if let Some(role) = patch.role {
            set.push("role = ").push_bind_unseparated(role.as_str());
        }
        if let Some(phone) = &patch.phone {
            set.push("phone = ").push_bind_unseparated(phone.clone());
        }
        if let Some(department) = &patch.department {
            set.push("department = ").push_bind_unseparated(department.clone());
        }
        if let Some(doctor_id) = patch.doctor_id {
            set.push("doctor_id = ").push_bind_unseparated(doctor_id);
        }
        set.push("updated_at = ").push_bind_unseparated(Utc::now());
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("profile"));
        }
        self.get(id).await
    }
}

fn row_to_profile(row: &SqliteRow) -> StoreResult<Profile> {
    let role: String = row.try_get("role")?;
    Ok(Profile {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        full_name: row.try_get("full_name")?,
        role: role.parse().map_err(StoreError::corrupt)?,
        phone: row.try_get("phone")?,
        department: row.try_get("department")?,
        doctor_id: row.try_get("doctor_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
