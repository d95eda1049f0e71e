//! Microsoft Graph backed mailbox.

use async_trait::async_trait;
use promptledger_extract::BodyType;
use promptledger_graph::{BodyContentType, GraphClient, GraphMessage};
use tracing::debug;

use super::mailbox::{Mailbox, MailboxError};
use crate::message::{MessageId, RawMessage};

/// Mailbox of the signed-in Graph user.
///
/// Every call opens a new session, so each request carries a current token.
#[derive(Debug, Clone)]
pub struct GraphMailbox {
    client: GraphClient,
}

impl GraphMailbox {
    /// Wraps a Graph client.
    #[must_use]
    pub const fn new(client: GraphClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Mailbox for GraphMailbox {
    async fn list_unread(&self, limit: u32) -> Result<Vec<RawMessage>, MailboxError> {
        let session = self.client.session().await.map_err(map_graph_error)?;
        let messages = session.list_unread(limit).await.map_err(map_graph_error)?;
        debug!("Fetched {} unread messages from Graph", messages.len());
        Ok(messages.into_iter().map(RawMessage::from).collect())
    }

    async fn mark_read(&self, id: &MessageId) -> Result<(), MailboxError> {
        let session = self.client.session().await.map_err(map_graph_error)?;
        session
            .mark_read(id.as_str())
            .await
            .map_err(map_graph_error)
    }
}

impl From<GraphMessage> for RawMessage {
    fn from(message: GraphMessage) -> Self {
        let sender_name = message.sender_name();
        let (body, body_type) = match message.body {
            Some(body) => {
                let body_type = match body.content_type {
                    BodyContentType::Html => BodyType::Html,
                    BodyContentType::Text => BodyType::Text,
                };
                (body.content, body_type)
            }
            None => (None, BodyType::Text),
        };

        Self {
            id: MessageId::new(message.id),
            internet_message_id: message.internet_message_id,
            subject: message.subject.unwrap_or_default(),
            body,
            body_type,
            received_at: message.received_date_time,
            sender_name,
        }
    }
}

fn map_graph_error(e: promptledger_graph::Error) -> MailboxError {
    use promptledger_graph::Error;

    if e.is_auth() {
        return MailboxError::Authentication(e.to_string());
    }
    match e {
        Error::Http(ref inner) if inner.is_connect() || inner.is_timeout() => {
            MailboxError::Connection(e.to_string())
        }
        other => MailboxError::Operation(other.to_string()),
    }
}
