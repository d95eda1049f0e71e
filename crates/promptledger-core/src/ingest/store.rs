//! Dedup store port.

use async_trait::async_trait;

use super::model::IngestionRecord;
use crate::message::MessageId;

/// Errors raised by a dedup store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached or rejected the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Unavailable(e.to_string())
    }
}

/// Result type for dedup store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result of an insert-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The record was written.
    Inserted,
    /// A record for the same message already existed; nothing was written.
    AlreadyExists,
}

/// Records keyed by message identifier, with an atomic insert-if-absent.
///
/// `exists` is a cheap pre-check. Uniqueness is guaranteed by
/// `record_if_absent` alone: concurrent callers racing on one identifier
/// see exactly one [`RecordOutcome::Inserted`].
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Returns whether a record exists for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend fails.
    async fn exists(&self, id: &MessageId) -> StoreResult<bool>;

    /// Writes `record` unless one with the same message identifier exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend fails.
    async fn record_if_absent(&self, record: &IngestionRecord) -> StoreResult<RecordOutcome>;
}
