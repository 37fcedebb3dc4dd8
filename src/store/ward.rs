//! Ward observation stores: vitals, medicine schedule, IV schedule, and
//! doctor visits. Every listing requires the parent admission id; there is
//! no cross-ward listing for these resources.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, SqlitePool};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use super::StoreResult;
use crate::error::StoreError;
use crate::models::{
    DoctorVisit, DoctorVisitInsert, DoctorVisitUpdate, IvSchedule, IvScheduleInsert,
    IvScheduleUpdate, IvStatus, MedicineSchedule, MedicineScheduleInsert, MedicineScheduleUpdate,
    MedicineStatus, Vital, VitalInsert, VitalUpdate,
};

/// Optional observation-time window for vitals reads.
#[derive(Debug, Clone, Default)]
pub struct VitalsRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

// ===== Vitals =====

pub struct VitalStore {
    pool: SqlitePool,
}

impl VitalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Most recent observation first, id as tiebreaker.
    #[instrument(skip(self), fields(ipd_patient_id = %ipd_patient_id))]
    pub async fn list(
        &self,
        ipd_patient_id: Uuid,
        range: &VitalsRange,
    ) -> StoreResult<Vec<Vital>> {
        let mut qb = QueryBuilder::new("SELECT * FROM vitals WHERE ipd_patient_id = ");
        qb.push_bind(ipd_patient_id);
        if let Some(start) = range.start {
            qb.push(" AND time >= ").push_bind(start);
        }
        if let Some(end) = range.end {
            qb.push(" AND time <= ").push_bind(end);
        }
        qb.push(" ORDER BY time DESC, id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_vital).collect()
    }

    /// Most recent single observation for the admission, if any.
    #[instrument(skip(self), fields(ipd_patient_id = %ipd_patient_id))]
    pub async fn latest(&self, ipd_patient_id: Uuid) -> StoreResult<Option<Vital>> {
        let row = sqlx::query(
            "SELECT * FROM vitals WHERE ipd_patient_id = ? ORDER BY time DESC, id LIMIT 1",
        )
        .bind(ipd_patient_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_vital).transpose()
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: Uuid) -> StoreResult<Vital> {
        let row = sqlx::query("SELECT * FROM vitals WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("vital"))?;
        row_to_vital(&row)
    }

    #[instrument(skip(self, insert), fields(ipd_patient_id = %insert.ipd_patient_id))]
    pub async fn create(&self, insert: VitalInsert) -> StoreResult<Vital> {
        insert.validate().map_err(StoreError::from_validation)?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO vitals (id, ipd_patient_id, time, heart_rate, temperature,
                                 blood_pressure, oxygen_saturation, notes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(insert.ipd_patient_id)
        .bind(insert.time)
        .bind(insert.heart_rate)
        .bind(insert.temperature)
        .bind(&insert.blood_pressure)
        .bind(insert.oxygen_saturation)
        .bind(&insert.notes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: Uuid, patch: VitalUpdate) -> StoreResult<Vital> {
        let mut qb = QueryBuilder::new("UPDATE vitals SET ");
        let mut set = qb.separated(", ");
        let mut changed = false;
        if let Some(time) = patch.time {
            set.push("time = ").push_bind_unseparated(time);
            changed = true;
        }
        if let Some(heart_rate) = patch.heart_rate {
            set.push("heart_rate = ").push_bind_unseparated(heart_rate);
            changed = true;
        }
        if let Some(temperature) = patch.temperature {
            set.push("temperature = ").push_bind_unseparated(temperature);
            changed = true;
        }
        if let Some(blood_pressure) = &patch.blood_pressure {
            set.push("blood_pressure = ")
                .push_bind_unseparated(blood_pressure.clone());
            changed = true;
        }
        if let Some(oxygen_saturation) = patch.oxygen_saturation {
            set.push("oxygen_saturation = ")
                .push_bind_unseparated(oxygen_saturation);
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
            return Err(StoreError::NotFound("vital"));
        }
        self.get(id).await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM vitals WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("vital"));
        }
        Ok(())
    }
}

fn row_to_vital(row: &SqliteRow) -> StoreResult<Vital> {
    Ok(Vital {
        id: row.try_get("id")?,
        ipd_patient_id: row.try_get("ipd_patient_id")?,
        time: row.try_get("time")?,
        heart_rate: row.try_get("heart_rate")?,
        temperature: row.try_get("temperature")?,
        blood_pressure: row.try_get("blood_pressure")?,
        oxygen_saturation: row.try_get("oxygen_saturation")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

// ===== Medicine schedule =====

#[derive(Debug, Clone, Default)]
pub struct MedicineScheduleFilter {
    pub status: Option<MedicineStatus>,
    pub nurse: Option<String>,
}

pub struct MedicineScheduleStore {
    pool: SqlitePool,
}

impl MedicineScheduleStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Most recent dose time first, id as tiebreaker.
    #[instrument(skip(self), fields(ipd_patient_id = %ipd_patient_id))]
    pub async fn list(
        &self,
        ipd_patient_id: Uuid,
        filter: &MedicineScheduleFilter,
    ) -> StoreResult<Vec<MedicineSchedule>> {
        let mut qb = QueryBuilder::new("SELECT * FROM medicine_schedule WHERE ipd_patient_id = ");
        qb.push_bind(ipd_patient_id);
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(nurse) = &filter.nurse {
            qb.push(" AND nurse = ").push_bind(nurse.clone());
        }
        qb.push(" ORDER BY time DESC, id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_medicine).collect()
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: Uuid) -> StoreResult<MedicineSchedule> {
        let row = sqlx::query("SELECT * FROM medicine_schedule WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("medicine schedule entry"))?;
        row_to_medicine(&row)
    }

    #[instrument(skip(self, insert), fields(ipd_patient_id = %insert.ipd_patient_id))]
    pub async fn create(&self, insert: MedicineScheduleInsert) -> StoreResult<MedicineSchedule> {
        insert.validate().map_err(StoreError::from_validation)?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO medicine_schedule (id, ipd_patient_id, time, medicine, dosage,
                                            frequency, status, nurse, notes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(insert.ipd_patient_id)
        .bind(insert.time)
        .bind(&insert.medicine)
        .bind(&insert.dosage)
        .bind(&insert.frequency)
        .bind(insert.status.as_str())
        .bind(&insert.nurse)
        .bind(&insert.notes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    /// Partial patch; dose status must follow the transition table.
    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: Uuid, patch: MedicineScheduleUpdate) -> StoreResult<MedicineSchedule> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT * FROM medicine_schedule WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound("medicine schedule entry"))?;
        let current = row_to_medicine(&row)?;

        if let Some(next) = patch.status {
            if !current.status.can_transition(next) {
                return Err(StoreError::Conflict(format!(
                    "dose cannot move from {} to {}",
                    current.status, next
                )));
            }
        }

        let mut qb = QueryBuilder::new("UPDATE medicine_schedule SET ");
        let mut set = qb.separated(", ");
        let mut changed = false;
        if let Some(time) = patch.time {
            set.push("time = ").push_bind_unseparated(time);
            changed = true;
        }
        if let Some(medicine) = &patch.medicine {
            set.push("medicine = ").push_bind_unseparated(medicine.clone());
            changed = true;
        }
        if let Some(dosage) = &patch.dosage {
            set.push("dosage = ").push_bind_unseparated(dosage.clone());
            changed = true;
        }
        if let Some(frequency) = &patch.frequency {
            set.push("frequency = ").push_bind_unseparated(frequency.clone());
            changed = true;
        }
        if let Some(status) = patch.status {
            set.push("status = ").push_bind_unseparated(status.as_str());
            changed = true;
        }
        if let Some(nurse) = &patch.nurse {
            set.push("nurse = ").push_bind_unseparated(nurse.clone());
            changed = true;
        }
        if let Some(notes) = &patch.notes {
            set.push("notes = ").push_bind_unseparated(notes.clone());
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
        let result = sqlx::query("DELETE FROM medicine_schedule WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("medicine schedule entry"));
        }
        Ok(())
    }
}

fn row_to_medicine(row: &SqliteRow) -> StoreResult<MedicineSchedule> {
    let status: String = row.try_get("status")?;
    Ok(MedicineSchedule {
        id: row.try_get("id")?,
        ipd_patient_id: row.try_get("ipd_patient_id")?,
        time: row.try_get("time")?,
        medicine: row.try_get("medicine")?,
        dosage: row.try_get("dosage")?,
        frequency: row.try_get("frequency")?,
        status: status.parse().map_err(StoreError::corrupt)?,
        nurse: row.try_get("nurse")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

// ===== IV schedule =====

#[derive(Debug, Clone, Default)]
pub struct IvScheduleFilter {
    pub status: Option<IvStatus>,
    pub nurse: Option<String>,
}

pub struct IvScheduleStore {
    pool: SqlitePool,
}

impl IvScheduleStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Most recent infusion time first, id as tiebreaker.
    #[instrument(skip(self), fields(ipd_patient_id = %ipd_patient_id))]
    pub async fn list(
        &self,
        ipd_patient_id: Uuid,
        filter: &IvScheduleFilter,
    ) -> StoreResult<Vec<IvSchedule>> {
        let mut qb = QueryBuilder::new("SELECT * FROM iv_schedule WHERE ipd_patient_id = ");
        qb.push_bind(ipd_patient_id);
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(nurse) = &filter.nurse {
            qb.push(" AND nurse = ").push_bind(nurse.clone());
        }
        qb.push(" ORDER BY time DESC, id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_iv).collect()
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: Uuid) -> StoreResult<IvSchedule> {
        let row = sqlx::query("SELECT * FROM iv_schedule WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("IV schedule entry"))?;
        row_to_iv(&row)
    }

    #[instrument(skip(self, insert), fields(ipd_patient_id = %insert.ipd_patient_id))]
    pub async fn create(&self, insert: IvScheduleInsert) -> StoreResult<IvSchedule> {
        insert.validate().map_err(StoreError::from_validation)?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO iv_schedule (id, ipd_patient_id, time, fluid, volume, rate,
                                      status, nurse, notes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(insert.ipd_patient_id)
        .bind(insert.time)
        .bind(&insert.fluid)
        .bind(&insert.volume)
        .bind(&insert.rate)
        .bind(insert.status.as_str())
        .bind(&insert.nurse)
        .bind(&insert.notes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    /// Partial patch; infusion status must follow the transition table.
    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: Uuid, patch: IvScheduleUpdate) -> StoreResult<IvSchedule> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT * FROM iv_schedule WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound("IV schedule entry"))?;
        let current = row_to_iv(&row)?;

        if let Some(next) = patch.status {
            if !current.status.can_transition(next) {
                return Err(StoreError::Conflict(format!(
                    "infusion cannot move from {} to {}",
                    current.status, next
                )));
            }
        }

        let mut qb = QueryBuilder::new("UPDATE iv_schedule SET ");
        let mut set = qb.separated(", ");
        let mut changed = false;
        if let Some(time) = patch.time {
            set.push("time = ").push_bind_unseparated(time);
            changed = true;
        }
        if let Some(fluid) = &patch.fluid {
            set.push("fluid = ").push_bind_unseparated(fluid.clone());
            changed = true;
        }
        if let Some(volume) = &patch.volume {
            set.push("volume = ").push_bind_unseparated(volume.clone());
            changed = true;
        }
        if let Some(rate) = &patch.rate {
            set.push("rate = ").push_bind_unseparated(rate.clone());
            changed = true;
        }
        if let Some(status) = patch.status {
            set.push("status = ").push_bind_unseparated(status.as_str());
            changed = true;
        }
        if let Some(nurse) = &patch.nurse {
            set.push("nurse = ").push_bind_unseparated(nurse.clone());
            changed = true;
        }
        if let Some(notes) = &patch.notes {
            set.push("notes = ").push_bind_unseparated(notes.clone());
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
        let result = sqlx::query("DELETE FROM iv_schedule WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("IV schedule entry"));
        }
        Ok(())
    }
}

fn row_to_iv(row: &SqliteRow) -> StoreResult<IvSchedule> {
    let status: String = row.try_get("status")?;
    Ok(IvSchedule {
        id: row.try_get("id")?,
        ipd_patient_id: row.try_get("ipd_patient_id")?,
        time: row.try_get("time")?,
        fluid: row.try_get("fluid")?,
        volume: row.try_get("volume")?,
        rate: row.try_get("rate")?,
        status: status.parse().map_err(StoreError::corrupt)?,
        nurse: row.try_get("nurse")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

// ===== Doctor visits =====

#[derive(Debug, Clone, Default)]
pub struct DoctorVisitFilter {
    pub doctor_id: Option<Uuid>,
}

pub struct DoctorVisitStore {
    pool: SqlitePool,
}

impl DoctorVisitStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Most recent visit first, id as tiebreaker.
    #[instrument(skip(self), fields(ipd_patient_id = %ipd_patient_id))]
    pub async fn list(
        &self,
        ipd_patient_id: Uuid,
        filter: &DoctorVisitFilter,
    ) -> StoreResult<Vec<DoctorVisit>> {
        let mut qb = QueryBuilder::new("SELECT * FROM doctor_visits WHERE ipd_patient_id = ");
        qb.push_bind(ipd_patient_id);
        if let Some(doctor_id) = filter.doctor_id {
            qb.push(" AND doctor_id = ").push_bind(doctor_id);
        }
        qb.push(" ORDER BY time DESC, id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_visit).collect()
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: Uuid) -> StoreResult<DoctorVisit> {
        let row = sqlx::query("SELECT * FROM doctor_visits WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("doctor visit"))?;
        row_to_visit(&row)
    }

    #[instrument(skip(self, insert), fields(ipd_patient_id = %insert.ipd_patient_id))]
    pub async fn create(&self, insert: DoctorVisitInsert) -> StoreResult<DoctorVisit> {
        insert.validate().map_err(StoreError::from_validation)?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO doctor_visits (id, ipd_patient_id, doctor_id, time, visit_type,
                                        notes, vitals_status, prescription, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(insert.ipd_patient_id)
        .bind(insert.doctor_id)
        .bind(insert.time)
        .bind(&insert.visit_type)
        .bind(&insert.notes)
        .bind(insert.vitals_status.map(|v| v.as_str()))
        .bind(&insert.prescription)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: Uuid, patch: DoctorVisitUpdate) -> StoreResult<DoctorVisit> {
        let mut qb = QueryBuilder::new("UPDATE doctor_visits SET ");
        let mut set = qb.separated(", ");
        let mut changed = false;
        if let Some(doctor_id) = patch.doctor_id {
            set.push("doctor_id = ").push_bind_unseparated(doctor_id);
            changed = true;
        }
        if let Some(time) = patch.time {
            set.push("time = ").push_bind_unseparated(time);
            changed = true;
        }
        if let Some(visit_type) = &patch.visit_type {
            set.push("visit_type = ").push_bind_unseparated(visit_type.clone());
            changed = true;
        }
        if let Some(notes) = &patch.notes {
            set.push("notes = ").push_bind_unseparated(notes.clone());
            changed = true;
        }
        if let Some(vitals_status) = patch.vitals_status {
            set.push("vitals_status = ")
                .push_bind_unseparated(vitals_status.map(|v| v.as_str()));
            changed = true;
        }
        if let Some(prescription) = &patch.prescription {
            set.push("prescription = ").push_bind_unseparated(prescription.clone());
            changed = true;
        }
        if !changed {
            return self.get(id).await;
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("doctor visit"));
        }
        self.get(id).await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM doctor_visits WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("doctor visit"));
        }
        Ok(())
    }
}

fn row_to_visit(row: &SqliteRow) -> StoreResult<DoctorVisit> {
    let vitals_status: Option<String> = row.try_get("vitals_status")?;
    Ok(DoctorVisit {
        id: row.try_get("id")?,
        ipd_patient_id: row.try_get("ipd_patient_id")?,
        doctor_id: row.try_get("doctor_id")?,
        time: row.try_get("time")?,
        visit_type: row.try_get("visit_type")?,
        notes: row.try_get("notes")?,
        vitals_status: vitals_status
            .map(|s| s.parse().map_err(StoreError::corrupt))
            .transpose()?,
        prescription: row.try_get("prescription")?,
        created_at: row.try_get("created_at")?,
    })
}
