//! Mailbox port used by the ingestion pipeline.

use async_trait::async_trait;

use crate::message::{MessageId, RawMessage};

/// Errors that can occur during mailbox operations.
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    /// The mail service could not be reached.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Credentials were rejected or could not be obtained.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The mail service rejected the operation.
    #[error("Operation failed: {0}")]
    Operation(String),
}

/// A mailbox holding bank notifications.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Lists up to `limit` unread messages, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailbox cannot be listed.
    async fn list_unread(&self, limit: u32) -> Result<Vec<RawMessage>, MailboxError>;

    /// Marks a message as read.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be set.
    async fn mark_read(&self, id: &MessageId) -> Result<(), MailboxError>;
}
