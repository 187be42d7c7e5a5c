//! SQLite ledger adapter.
//!
//! Append-only record of conversion attempts. One connection per operation:
//! construction never fails, an init failure stays non-fatal, and each
//! append is free to fail (and be logged by the caller) on its own.

use std::path::PathBuf;

use async_trait::async_trait;
use rusqlite::params;
use tokio_rusqlite::Connection;

use dvb_core::{domain::NewConversionRecord, ports::Ledger, Error, Result};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS conversions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    original_link TEXT NOT NULL,
    remote_file_reference TEXT,
    status TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
";

pub struct SqliteLedger {
    db_path: PathBuf,
}

impl SqliteLedger {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    async fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .await
            .map_err(|e| Error::Storage(e.to_string()))
    }
}

#[async_trait]
impl Ledger for SqliteLedger {
    async fn init(&self) -> Result<()> {
        let conn = self.connect().await?;
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(|e| Error::Storage(e.to_string()))?;

        tracing::info!("database {} initialized", self.db_path.display());
        Ok(())
    }

    async fn append(&self, record: NewConversionRecord) -> Result<()> {
        let conn = self.connect().await?;
        conn.call(move |conn| {
            conn.execute(
                "INSERT INTO conversions (user_id, original_link, remote_file_reference, status)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.user_id,
                    record.original_link,
                    record.remote_file_reference,
                    record.status.as_str(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| Error::Storage(e.to_string()))?;
        Ok(())
    }
}
