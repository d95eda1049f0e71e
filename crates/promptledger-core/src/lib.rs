//! # promptledger-core
//!
//! Core ingestion logic for `PromptLedger`.
//!
//! This crate provides:
//! - Domain models for fetched messages and ingestion records
//! - Deduplicating storage (`SQLite` ledger and an in-memory store)
//! - The [`Mailbox`] port and its Microsoft Graph adapter
//! - Refresh token storage in the system keyring
//! - The [`IngestionPipeline`] and the [`Scheduler`] that drives it

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod credentials;
mod error;
pub mod ingest;
mod message;
pub mod pipeline;
pub mod scheduler;
pub mod service;

pub use credentials::{CredentialError, CredentialResult, KeyringTokenStore};
pub use error::{Error, Result};
pub use ingest::{
    DedupStore, InMemoryDedupStore, IngestionRecord, RecordOutcome, SqliteIngestionRepository,
    StoreError, StoreResult,
};
pub use message::{MessageId, RawMessage};
pub use pipeline::{CycleReport, IngestionPipeline, MessageOutcome, PipelineConfig};
pub use scheduler::Scheduler;
pub use service::{GraphMailbox, Mailbox, MailboxError};
