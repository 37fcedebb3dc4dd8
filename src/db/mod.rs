//! Database module for Florence.
//!
//! Handles the connection pool and startup schema creation. Foreign keys
//! are declared for documentation; enforcement stays off, so deleting a
//! referenced row leaves dependents dangling.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Database connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the pool and create any missing tables.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        // Foreign keys are declared for documentation only; enforcement stays
        // off (sqlx turns it on by default), so dependents dangle as specified.
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(false);
        // An in-memory SQLite database exists per connection.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Self::initialize_schema(&pool).await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn initialize_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                full_name TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                full_name TEXT,
                role TEXT NOT NULL,
                phone TEXT,
                department TEXT,
                doctor_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS patients (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                age INTEGER NOT NULL,
                gender TEXT NOT NULL,
                contact TEXT,
                email TEXT,
                abha_id TEXT,
                address TEXT,
                photo_url TEXT,
                created_at TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS doctors (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                specialization TEXT NOT NULL,
                contact TEXT,
                email TEXT,
                experience INTEGER,
                availability TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS appointments (
                id TEXT PRIMARY KEY,
                patient_id TEXT NOT NULL,
                doctor_id TEXT NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                type TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (patient_id) REFERENCES patients(id),
                FOREIGN KEY (doctor_id) REFERENCES doctors(id)
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS medical_records (
                id TEXT PRIMARY KEY,
                patient_id TEXT NOT NULL,
                doctor_id TEXT,
                date TEXT NOT NULL,
                condition TEXT NOT NULL,
                notes TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (patient_id) REFERENCES patients(id)
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS prescriptions (
                id TEXT PRIMARY KEY,
                patient_id TEXT NOT NULL,
                doctor_id TEXT,
                date TEXT NOT NULL,
                medication TEXT NOT NULL,
                dosage TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (patient_id) REFERENCES patients(id)
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS ipd_patients (
                id TEXT PRIMARY KEY,
                patient_id TEXT NOT NULL,
                room_number TEXT NOT NULL,
                bed_number TEXT NOT NULL,
                admission_date TEXT NOT NULL,
                condition TEXT NOT NULL,
                severity TEXT NOT NULL,
                assigned_doctor_id TEXT,
                discharged_at TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (patient_id) REFERENCES patients(id)
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS vitals (
                id TEXT PRIMARY KEY,
                ipd_patient_id TEXT NOT NULL,
                time TEXT NOT NULL,
                heart_rate REAL NOT NULL,
                temperature REAL NOT NULL,
                blood_pressure TEXT NOT NULL,
                oxygen_saturation REAL NOT NULL,
                notes TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (ipd_patient_id) REFERENCES ipd_patients(id)
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS medicine_schedule (
                id TEXT PRIMARY KEY,
                ipd_patient_id TEXT NOT NULL,
                time TEXT NOT NULL,
                medicine TEXT NOT NULL,
                dosage TEXT NOT NULL,
                frequency TEXT NOT NULL,
                status TEXT NOT NULL,
                nurse TEXT,
                notes TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (ipd_patient_id) REFERENCES ipd_patients(id)
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS iv_schedule (
                id TEXT PRIMARY KEY,
                ipd_patient_id TEXT NOT NULL,
                time TEXT NOT NULL,
                fluid TEXT NOT NULL,
                volume TEXT NOT NULL,
                rate TEXT NOT NULL,
                status TEXT NOT NULL,
                nurse TEXT,
                notes TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (ipd_patient_id) REFERENCES ipd_patients(id)
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS doctor_visits (
                id TEXT PRIMARY KEY,
                ipd_patient_id TEXT NOT NULL,
                doctor_id TEXT,
                time TEXT NOT NULL,
                visit_type TEXT NOT NULL,
                notes TEXT,
                vitals_status TEXT,
                prescription TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (ipd_patient_id) REFERENCES ipd_patients(id)
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS bills (
                id TEXT PRIMARY KEY,
                patient_id TEXT NOT NULL,
                doctor_id TEXT,
                appointment_id TEXT,
                date TEXT NOT NULL,
                subtotal REAL NOT NULL,
                discount REAL NOT NULL,
                total_amount REAL NOT NULL,
                paid_amount REAL NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (patient_id) REFERENCES patients(id)
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS bill_items (
                id TEXT PRIMARY KEY,
                bill_id TEXT NOT NULL,
                description TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                rate REAL NOT NULL,
                amount REAL NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (bill_id) REFERENCES bills(id)
            )",
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
