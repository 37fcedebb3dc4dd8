//! Bill store. Payments are a single atomic operation here rather than a
//! client-orchestrated read-modify-write, so two concurrent payments cannot
//! lose an update.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, SqlitePool};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::StoreResult;
use crate::error::StoreError;
use crate::models::{Bill, BillInsert, BillItem, BillStatus, BillUpdate, Payment};

#[derive(Debug, Clone, Default)]
pub struct BillFilter {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub status: Option<BillStatus>,
}

pub struct BillStore {
    pool: SqlitePool,
}

impl BillStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Newest bill first, id as tiebreaker. Line items ride along.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &BillFilter) -> StoreResult<Vec<Bill>> {
        let mut qb = QueryBuilder::new("SELECT * FROM bills WHERE 1 = 1");
        if let Some(patient_id) = filter.patient_id {
            qb.push(" AND patient_id = ").push_bind(patient_id);
        }
        if let Some(doctor_id) = filter.doctor_id {
            qb.push(" AND doctor_id = ").push_bind(doctor_id);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        qb.push(" ORDER BY created_at DESC, id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        let mut bills = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut bill = row_to_bill(row)?;
            bill.items = self.items_for(bill.id).await?;
            bills.push(bill);
        }
        Ok(bills)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: Uuid) -> StoreResult<Bill> {
        let row = sqlx::query("SELECT * FROM bills WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("bill"))?;
        let mut bill = row_to_bill(&row)?;
        bill.items = self.items_for(id).await?;
        Ok(bill)
    }

    /// Create the bill and any line items in one transaction. The bill
    /// starts Unpaid with nothing paid.
    #[instrument(skip(self, insert), fields(patient_id = %insert.patient_id))]
    pub async fn create(&self, insert: BillInsert) -> StoreResult<Bill> {
        insert.validate().map_err(StoreError::from_validation)?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO bills (id, patient_id, doctor_id, appointment_id, date, subtotal,
                                discount, total_amount, paid_amount, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(id)
        .bind(insert.patient_id)
        .bind(insert.doctor_id)
        .bind(insert.appointment_id)
        .bind(insert.date)
        .bind(insert.subtotal)
        .bind(insert.discount)
        .bind(insert.total_amount)
        .bind(BillStatus::Unpaid.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for item in &insert.items {
            sqlx::query(
                "INSERT INTO bill_items (id, bill_id, description, quantity, rate, amount, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4())
            .bind(id)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.rate)
            .bind(item.amount)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.get(id).await
    }

    /// Partial patch. paid_amount and status are not patchable; payments go
    /// through `record_payment`.
    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: Uuid, patch: BillUpdate) -> StoreResult<Bill> {
        let mut qb = QueryBuilder::new("UPDATE bills SET ");
        let mut set = qb.separated(", ");
        let mut changed = false;
        if let Some(doctor_id) = patch.doctor_id {
            set.push("doctor_id = ").push_bind_unseparated(doctor_id);
            changed = true;
        }
        if let Some(appointment_id) = patch.appointment_id {
            set.push("appointment_id = ").push_bind_unseparated(appointment_id);
            changed = true;
        }
        if let Some(date) = patch.date {
            set.push("date = ").push_bind_unseparated(date);
            changed = true;
        }
        if let Some(subtotal) = patch.subtotal {
            set.push("subtotal = ").push_bind_unseparated(subtotal);
            changed = true;
        }
        if let Some(discount) = patch.discount {
            set.push("discount = ").push_bind_unseparated(discount);
            changed = true;
        }
        if !changed {
            return self.get(id).await;
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("bill"));
        }
        self.get(id).await
    }

    /// Record a payment: accumulate paid_amount and rederive status inside
    /// one transaction. A payment against a Paid bill is a Conflict and one
    /// that exceeds the outstanding balance is a Validation failure, so a
    /// bill can never double count.
    #[instrument(skip(self, payment), fields(id = %id, amount = payment.amount))]
    pub async fn record_payment(&self, id: Uuid, payment: Payment) -> StoreResult<Bill> {
        payment.validate().map_err(StoreError::from_validation)?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT * FROM bills WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound("bill"))?;
        let bill = row_to_bill(&row)?;

        if bill.status == BillStatus::Paid {
            return Err(StoreError::Conflict("bill is already paid in full".into()));
        }
        let outstanding = bill.total_amount - bill.paid_amount;
        if payment.amount > outstanding {
            return Err(StoreError::Validation(format!(
                "payment of {} exceeds outstanding balance of {}",
                payment.amount, outstanding
            )));
        }

        let new_paid = bill.paid_amount + payment.amount;
        let new_status = BillStatus::from_amounts(new_paid, bill.total_amount);
        sqlx::query("UPDATE bills SET paid_amount = ?, status = ? WHERE id = ?")
            .bind(new_paid)
            .bind(new_status.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(bill_id = %id, paid = new_paid, status = %new_status, "payment recorded");
        self.get(id).await
    }

    /// Hard delete of the bill row only; its items dangle.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM bills WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("bill"));
        }
        Ok(())
    }

    async fn items_for(&self, bill_id: Uuid) -> StoreResult<Vec<BillItem>> {
        let rows = sqlx::query("SELECT * FROM bill_items WHERE bill_id = ? ORDER BY created_at, id")
            .bind(bill_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_item).collect()
    }
}

fn row_to_bill(row: &SqliteRow) -> StoreResult<Bill> {
    let status: String = row.try_get("status")?;
    Ok(Bill {
        id: row.try_get("id")?,
        patient_id: row.try_get("patient_id")?,
        doctor_id: row.try_get("doctor_id")?,
        appointment_id: row.try_get("appointment_id")?,
        date: row.try_get("date")?,
        subtotal: row.try_get("subtotal")?,
        discount: row.try_get("discount")?,
        total_amount: row.try_get("total_amount")?,
        paid_amount: row.try_get("paid_amount")?,
        status: status.parse().map_err(StoreError::corrupt)?,
        items: Vec::new(),
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_item(row: &SqliteRow) -> StoreResult<BillItem> {
    Ok(BillItem {
        id: row.try_get("id")?,
        bill_id: row.try_get("bill_id")?,
        description: row.try_get("description")?,
        quantity: row.try_get("quantity")?,
        rate: row.try_get("rate")?,
        amount: row.try_get("amount")?,
        created_at: row.try_get("created_at")?,
    })
}
