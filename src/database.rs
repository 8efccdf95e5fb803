use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use thiserror::Error;

use crate::areas::RegionIndex;
use crate::forecast::types::ForecastEntry;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database operation failed: {0}")]
    Sqlx(#[from] sqlx::Error),
}

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating the file if needed) the SQLite database at `url`.
    pub async fn connect(url: &str) -> Result<Self, DatabaseError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn init_tables(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS areas (
                office_code TEXT PRIMARY KEY,
                office_name TEXT NOT NULL,
                region TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Append-only; duplicate rows for repeated fetches are expected.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS forecasts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                office_code TEXT NOT NULL,
                publishing_office TEXT NOT NULL,
                report_datetime TEXT NOT NULL,
                area_name TEXT,
                weather TEXT NOT NULL,
                created_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_forecasts_office_code ON forecasts(office_code)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert every office of the index, leaving rows that already exist untouched.
    pub async fn seed_areas(&self, index: &RegionIndex) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for (region, code, name) in index.iter_offices() {
            let result = sqlx::query(
                "INSERT OR IGNORE INTO areas (office_code, office_name, region) VALUES ($1, $2, $3)",
            )
            .bind(code)
            .bind(name)
            .bind(region)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    pub async fn office_name(&self, office_code: &str) -> Result<Option<String>, DatabaseError> {
        let name = sqlx::query_scalar("SELECT office_name FROM areas WHERE office_code = $1")
            .bind(office_code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(name)
    }

    /// Append `entries` in one transaction, stamping `created_at` with the
    /// insertion time. Returns the number of rows written.
    pub async fn insert_forecasts(&self, entries: &[ForecastEntry]) -> Result<u64, DatabaseError> {
        let now = chrono::Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for entry in entries {
            let result = sqlx::query(
                r#"
                INSERT INTO forecasts (
                    office_code, publishing_office, report_datetime,
                    area_name, weather, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(&entry.office_code)
            .bind(&entry.publishing_office)
            .bind(&entry.report_datetime)
            .bind(&entry.area_name)
            .bind(&entry.weather)
            .bind(entry.created_at.unwrap_or(now))
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Everything stored for an office, newest `report_datetime` first.
    /// The ordering is a plain string comparison.
    pub async fn forecasts_for_office(
        &self,
        office_code: &str,
    ) -> Result<Vec<ForecastEntry>, DatabaseError> {
        let results = sqlx::query_as::<_, ForecastEntry>(
            r#"
            SELECT office_code, publishing_office, report_datetime, area_name, weather, created_at
            FROM forecasts
            WHERE office_code = $1
            ORDER BY report_datetime DESC, id ASC
            "#,
        )
        .bind(office_code)
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }

    pub async fn count_forecasts(&self, office_code: &str) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM forecasts WHERE office_code = $1")
            .bind(office_code)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
pub(crate) async fn memory_database() -> Database {
    // A single connection, otherwise every pooled connection sees its own empty database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let database = Database::new(pool);
    database.init_tables().await.unwrap();
    database
}
