//! Persisted form of a parsed notification.

use chrono::{DateTime, Utc};
use promptledger_extract::PaymentNotification;

use crate::message::{MessageId, RawMessage};

/// A payment notification together with the message it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionRecord {
    /// Mailbox identifier; at most one record exists per value.
    pub message_id: MessageId,
    /// `Message-ID` of the source email.
    pub source_message_id: Option<String>,
    /// Parsed notification.
    pub notification: PaymentNotification,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl IngestionRecord {
    /// Creates a record for `notification`, parsed from `message`.
    #[must_use]
    pub fn new(message: &RawMessage, notification: PaymentNotification) -> Self {
        Self {
            message_id: message.id.clone(),
            source_message_id: message.internet_message_id.clone(),
            notification,
            created_at: Utc::now(),
        }
    }
}
