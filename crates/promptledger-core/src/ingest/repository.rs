//! `SQLite` ledger of ingested notifications.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use promptledger_extract::{BankAccount, PaymentNotification, Transaction};
use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::debug;

use super::model::IngestionRecord;
use super::store::{DedupStore, RecordOutcome, StoreResult};
use crate::message::MessageId;
use crate::{Error, Result};

/// Repository for ingestion records.
///
/// The `UNIQUE` constraint on `message_id` doubles as the dedup index.
#[derive(Debug, Clone)]
pub struct SqliteIngestionRepository {
    pool: SqlitePool,
}

impl SqliteIngestionRepository {
    /// Create a new repository with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Create an in-memory repository for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        // A single connection that never expires; dropping it drops the database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS ingestion_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                message_id TEXT NOT NULL UNIQUE,
                source_message_id TEXT,
                recipient TEXT NOT NULL,
                method TEXT NOT NULL,
                amount TEXT NOT NULL,
                from_bank TEXT NOT NULL,
                from_account TEXT NOT NULL,
                to_account TEXT NOT NULL,
                datetime TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get the record stored for a message.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is malformed.
    pub async fn get(&self, id: &MessageId) -> Result<Option<IngestionRecord>> {
        let row = sqlx::query(
            r"
            SELECT message_id, source_message_id, recipient, method, amount,
                   from_bank, from_account, to_account, datetime, created_at
            FROM ingestion_records
            WHERE message_id = ?
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    /// Count stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ingestion_records")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.unsigned_abs())
    }

    /// Returns the database clock, used as a connectivity probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub async fn server_time(&self) -> Result<String> {
        let now: String = sqlx::query_scalar("SELECT datetime('now')")
            .fetch_one(&self.pool)
            .await?;

        Ok(now)
    }
}

#[async_trait]
impl DedupStore for SqliteIngestionRepository {
    async fn exists(&self, id: &MessageId) -> StoreResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM ingestion_records WHERE message_id = ?")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Ok(found.is_some())
    }

    async fn record_if_absent(&self, record: &IngestionRecord) -> StoreResult<RecordOutcome> {
        let transaction = &record.notification.transaction;

        let result = sqlx::query(
            r"
            INSERT INTO ingestion_records (
                message_id, source_message_id, recipient, method, amount,
                from_bank, from_account, to_account, datetime, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(message_id) DO NOTHING
            ",
        )
        .bind(record.message_id.as_str())
        .bind(record.source_message_id.as_deref())
        .bind(&record.notification.recipient)
        .bind(&transaction.method)
        .bind(transaction.amount.to_string())
        .bind(&transaction.from.bank)
        .bind(&transaction.from.account)
        .bind(&transaction.to_account)
        .bind(&transaction.date_time)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            debug!(message_id = %record.message_id, "Record already present");
            Ok(RecordOutcome::AlreadyExists)
        } else {
            Ok(RecordOutcome::Inserted)
        }
    }
}

fn row_to_record(row: &SqliteRow) -> Result<IngestionRecord> {
    let amount: String = row.get("amount");
    let amount = Decimal::from_str_exact(&amount)
        .map_err(|e| Error::Database(sqlx::Error::Decode(Box::new(e))))?;

    let created_at: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| Error::Database(sqlx::Error::Decode(Box::new(e))))?
        .with_timezone(&Utc);

    Ok(IngestionRecord {
        message_id: MessageId::new(row.get::<String, _>("message_id")),
        source_message_id: row.get("source_message_id"),
        notification: PaymentNotification {
            recipient: row.get("recipient"),
            transaction: Transaction {
                method: row.get("method"),
                from: BankAccount::new(
                    row.get::<String, _>("from_bank"),
                    row.get::<String, _>("from_account"),
                ),
                amount,
                to_account: row.get("to_account"),
                date_time: row.get("datetime"),
            },
        },
        created_at,
    })
}
