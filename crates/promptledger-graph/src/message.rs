//! Graph mail message resources.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Fields requested with `$select` when listing messages.
pub const MESSAGE_FIELDS: &[&str] = &[
    "subject",
    "receivedDateTime",
    "bodyPreview",
    "from",
    "body",
    "internetMessageId",
    "id",
];

/// A message resource as returned by `/me/messages`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMessage {
    /// Graph identifier of the message.
    pub id: String,
    /// Subject line.
    #[serde(default)]
    pub subject: Option<String>,
    /// When the message arrived.
    #[serde(default)]
    pub received_date_time: Option<DateTime<Utc>>,
    /// First characters of the body, as plain text.
    #[serde(default)]
    pub body_preview: Option<String>,
    /// Sender.
    #[serde(default)]
    pub from: Option<Recipient>,
    /// Full body.
    #[serde(default)]
    pub body: Option<ItemBody>,
    /// RFC 5322 `Message-ID`.
    #[serde(default)]
    pub internet_message_id: Option<String>,
}

impl GraphMessage {
    /// Display name of the sender, falling back to the address.
    #[must_use]
    pub fn sender_name(&self) -> String {
        let Some(address) = self.from.as_ref().map(|f| &f.email_address) else {
            return String::new();
        };

        address
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(address.address.as_deref())
            .unwrap_or_default()
            .to_string()
    }
}

/// Message body with its content type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    /// `text` or `html`.
    #[serde(default)]
    pub content_type: BodyContentType,
    /// Body content.
    #[serde(default)]
    pub content: Option<String>,
}

/// Graph body content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyContentType {
    /// Plain text.
    #[default]
    Text,
    /// HTML.
    Html,
}

/// A sender or recipient.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    /// Mailbox address.
    pub email_address: EmailAddress,
}

/// Name and address of a mailbox.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailAddress {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// SMTP address.
    #[serde(default)]
    pub address: Option<String>,
}

/// A page of a collection response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Collection<T> {
    pub value: Vec<T>,
}

/// Error body of a failed Graph request.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}
