//! Error types for the core library.

use thiserror::Error;

use crate::ingest::StoreError;
use crate::message::MessageId;
use crate::service::MailboxError;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Listing unread messages failed; the cycle is abandoned.
    #[error("Failed to fetch messages: {0}")]
    Fetch(#[source] MailboxError),

    /// A candidate message could not be parsed.
    #[error("Extraction error: {0}")]
    Extraction(#[from] promptledger_extract::ExtractionError),

    /// The dedup store could not be reached.
    #[error("Dedup store error: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// A recorded message could not be marked as read.
    #[error("Failed to mark message {id} as read: {source}")]
    Acknowledge {
        /// Message that stays unread.
        id: MessageId,
        /// Underlying mailbox failure.
        #[source]
        source: MailboxError,
    },

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
