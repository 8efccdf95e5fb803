pub mod jma;
#[cfg(test)]
pub mod mock;
pub mod normalize;
pub mod types;

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::ForecastMode;
use crate::database::{Database, DatabaseError};
use jma::{JmaClient, JmaError};
use normalize::normalize;
use types::ForecastEntry;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error(transparent)]
    Remote(#[from] JmaError),
    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}

/// What one fetch produced, plus the row count for the office taken while
/// the write lock was still held.
#[derive(Debug, Clone)]
pub struct ForecastFetch {
    pub entries: Vec<ForecastEntry>,
    pub stored_rows: i64,
}

/// Write-through cache in front of the JMA endpoint.
///
/// Every call fetches. A failed fetch persists nothing. A successful one is
/// appended to `forecasts` before anything is returned.
pub struct ForecastService {
    client: JmaClient,
    database: Arc<Database>,
    mode: ForecastMode,
    write_lock: Mutex<()>,
}

impl ForecastService {
    pub fn new(client: JmaClient, database: Arc<Database>, mode: ForecastMode) -> Self {
        Self {
            client,
            database,
            mode,
            write_lock: Mutex::new(()),
        }
    }

    pub fn mode(&self) -> ForecastMode {
        self.mode
    }

    pub async fn get_forecast(&self, office_code: &str) -> Result<ForecastFetch, ForecastError> {
        let reports = self.client.get_forecast(office_code).await?;
        let now = chrono::Utc::now();
        let mut fresh = normalize(office_code, &reports);
        for entry in &mut fresh {
            entry.created_at = Some(now);
        }

        // Held across the insert, the read-back and the count so concurrent
        // requests never interleave their batches.
        let _guard = self.write_lock.lock().await;
        let inserted = self.database.insert_forecasts(&fresh).await?;
        tracing::debug!("Stored {} forecast rows for office {}", inserted, office_code);

        let entries = match self.mode {
            ForecastMode::Live => fresh,
            ForecastMode::History => self.database.forecasts_for_office(office_code).await?,
        };
        let stored_rows = self.database.count_forecasts(office_code).await?;

        Ok(ForecastFetch {
            entries,
            stored_rows,
        })
    }

    /// Stored rows only; no remote call.
    pub async fn history(&self, office_code: &str) -> Result<Vec<ForecastEntry>, ForecastError> {
        Ok(self.database.forecasts_for_office(office_code).await?)
    }
}
