//! Messages as fetched from the mailbox.

use chrono::{DateTime, Utc};
use promptledger_extract::{BodyType, normalize};

/// Mailbox-assigned identifier of a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub String);

impl MessageId {
    /// Create a new message ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Snapshot of one unread message, owned by a single poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Mailbox identifier, the dedup key.
    pub id: MessageId,
    /// RFC 5322 `Message-ID`, when the mailbox reports one.
    pub internet_message_id: Option<String>,
    /// Subject line.
    pub subject: String,
    /// Body content.
    pub body: Option<String>,
    /// Whether the body is plain text or markup.
    pub body_type: BodyType,
    /// When the message arrived.
    pub received_at: Option<DateTime<Utc>>,
    /// Sender display name.
    pub sender_name: String,
}

impl RawMessage {
    /// Creates a message with a subject and no body.
    #[must_use]
    pub fn new(id: impl Into<MessageId>, subject: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            internet_message_id: None,
            subject: subject.into(),
            body: None,
            body_type: BodyType::Text,
            received_at: None,
            sender_name: String::new(),
        }
    }

    /// Sets the body and its content type.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>, body_type: BodyType) -> Self {
        self.body = Some(body.into());
        self.body_type = body_type;
        self
    }

    /// Sets the `Message-ID`.
    #[must_use]
    pub fn with_internet_message_id(mut self, id: impl Into<String>) -> Self {
        self.internet_message_id = Some(id.into());
        self
    }

    /// Body reduced to plain text, ready for extraction.
    #[must_use]
    pub fn plain_text(&self) -> String {
        normalize(self.body.as_deref(), self.body_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_display() {
        let id = MessageId::from("AAMkAGI2");
        assert_eq!(id.to_string(), "AAMkAGI2");
        assert_eq!(id.as_str(), "AAMkAGI2");
    }

    #[test]
    fn test_plain_text_strips_html() {
        let msg = RawMessage::new("m1", "subject").with_body("<p>A</p><b>B</b>", BodyType::Html);
        assert_eq!(msg.plain_text(), "AB");
    }

    #[test]
    fn test_plain_text_keeps_text_body() {
        let msg = RawMessage::new("m1", "subject").with_body("<not markup>", BodyType::Text);
        assert_eq!(msg.plain_text(), "<not markup>");
    }

    #[test]
    fn test_plain_text_without_body() {
        assert_eq!(RawMessage::new("m1", "subject").plain_text(), "");
    }
}
