//! Ingestion records and the stores that deduplicate them.

mod memory;
mod model;
mod repository;
mod store;

pub use memory::InMemoryDedupStore;
pub use model::IngestionRecord;
pub use repository::SqliteIngestionRepository;
pub use store::{DedupStore, RecordOutcome, StoreError, StoreResult};
