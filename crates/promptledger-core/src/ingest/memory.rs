//! In-memory dedup store.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::model::IngestionRecord;
use super::store::{DedupStore, RecordOutcome, StoreResult};
use crate::message::MessageId;

/// A thread-safe in-memory dedup store.
///
/// Clones share the same records. Used by tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDedupStore {
    records: Arc<RwLock<HashMap<MessageId, IngestionRecord>>>,
}

impl InMemoryDedupStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record stored for `id`.
    pub async fn get(&self, id: &MessageId) -> Option<IngestionRecord> {
        self.records.read().await.get(id).cloned()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl DedupStore for InMemoryDedupStore {
    async fn exists(&self, id: &MessageId) -> StoreResult<bool> {
        Ok(self.records.read().await.contains_key(id))
    }

    async fn record_if_absent(&self, record: &IngestionRecord) -> StoreResult<RecordOutcome> {
        let mut records = self.records.write().await;
        match records.entry(record.message_id.clone()) {
            Entry::Occupied(_) => Ok(RecordOutcome::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(RecordOutcome::Inserted)
            }
        }
    }
}
