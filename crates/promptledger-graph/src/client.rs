//! Microsoft Graph mail client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::auth::TokenProvider;
use crate::error::{Error, Result};
use crate::http::{DEFAULT_TIMEOUT, build_client};
use crate::message::{Collection, ErrorBody, GraphMessage, MESSAGE_FIELDS};

/// Graph v1.0 endpoint.
pub const DEFAULT_BASE_URL: &str = "https://graph.microsoft.com/v1.0/";

/// Long-lived Graph client; hands out short-lived [`GraphSession`]s.
#[derive(Clone)]
pub struct GraphClient {
    http_client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenProvider>,
}

impl GraphClient {
    /// Creates a client for the public Graph endpoint.
    ///
    /// Requests give up after [`DEFAULT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        Ok(Self {
            http_client: build_client(DEFAULT_TIMEOUT)?,
            base_url: Url::parse(DEFAULT_BASE_URL)?,
            tokens,
        })
    }

    /// Replaces the per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `timeout` is zero.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http_client = build_client(timeout)?;
        Ok(self)
    }

    /// Points the client at another Graph endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self> {
        let mut raw = base_url.as_ref().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        self.base_url = Url::parse(&raw)?;
        Ok(self)
    }

    /// Returns the endpoint this client talks to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Opens a session with a freshly obtained access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token provider fails.
    pub async fn session(&self) -> Result<GraphSession> {
        let access_token = self.tokens.access_token().await?;
        Ok(GraphSession {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            access_token,
        })
    }
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Authenticated view of the signed-in user's mailbox.
pub struct GraphSession {
    http_client: Client,
    base_url: Url,
    access_token: String,
}

impl GraphSession {
    /// Lists up to `top` unread messages, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Graph rejects it.
    pub async fn list_unread(&self, top: u32) -> Result<Vec<GraphMessage>> {
        let url = self.messages_url()?;
        let top = top.to_string();
        let select = MESSAGE_FIELDS.join(",");

        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("$filter", "isRead eq false"),
                ("$orderby", "receivedDateTime desc"),
                ("$top", top.as_str()),
                ("$select", select.as_str()),
            ])
            .send()
            .await?;

        let page: Collection<GraphMessage> = check(response).await?.json().await?;
        debug!("Listed {} unread messages", page.value.len());
        Ok(page.value)
    }

    /// Marks a message as read.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Graph rejects it.
    pub async fn mark_read(&self, id: &str) -> Result<()> {
        let mut url = self.messages_url()?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidConfig(format!("{} cannot be a base", self.base_url)))?
            .push(id);

        let response = self
            .http_client
            .patch(url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "isRead": true }))
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    fn messages_url(&self) -> Result<Url> {
        Ok(self.base_url.join("me/messages")?)
    }
}

/// Turns a non-success response into `Error::Api`.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let (code, message) = serde_json::from_str::<ErrorBody>(&text).map_or_else(
        |_| (status.canonical_reason().unwrap_or("unknown").to_string(), text),
        |body| (body.error.code, body.error.message),
    );

    Err(Error::Api {
        status: status.as_u16(),
        code,
        message,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;
    use crate::http::testing::silent_server;
    use mockito::Matcher;

    fn client_for(server: &mockito::Server) -> GraphClient {
        GraphClient::new(Arc::new(StaticTokenProvider::new("tok")))
            .unwrap()
            .with_base_url(server.url())
            .unwrap()
    }

    #[test]
    fn test_default_base_url() {
        let client = GraphClient::new(Arc::new(StaticTokenProvider::new("tok"))).unwrap();
        assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn test_list_unread_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/me/messages")
            .match_header("authorization", "Bearer tok")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("$filter".into(), "isRead eq false".into()),
                Matcher::UrlEncoded("$orderby".into(), "receivedDateTime desc".into()),
                Matcher::UrlEncoded("$top".into(), "10".into()),
                Matcher::UrlEncoded(
                    "$select".into(),
                    "subject,receivedDateTime,bodyPreview,from,body,internetMessageId,id".into(),
                ),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"value":[
                    {"id":"m2","subject":"second","body":{"contentType":"text","content":"b"}},
                    {"id":"m1","subject":"first"}
                ]}"#,
            )
            .create_async()
            .await;

        let session = client_for(&server).session().await.unwrap();
        let messages = session.list_unread(10).await.unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, "m2");
        assert_eq!(messages[1].subject.as_deref(), Some("first"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_mark_read_patches_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/me/messages/AAMk-1=")
            .match_header("authorization", "Bearer tok")
            .match_body(Matcher::Json(json!({ "isRead": true })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"AAMk-1=","isRead":true}"#)
            .create_async()
            .await;

        let session = client_for(&server).session().await.unwrap();
        session.mark_read("AAMk-1=").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_mapped() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/me/messages")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"error":{"code":"InvalidAuthenticationToken","message":"Access token has expired."}}"#,
            )
            .create_async()
            .await;

        let session = client_for(&server).session().await.unwrap();
        let err = session.list_unread(10).await.unwrap_err();
        assert!(err.is_auth());
        match err {
            Error::Api { status, code, .. } => {
                assert_eq!(status, 401);
                assert_eq!(code, "InvalidAuthenticationToken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("PATCH", "/me/messages/x")
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let session = client_for(&server).session().await.unwrap();
        let err = session.mark_read("x").await.unwrap_err();
        match err {
            Error::Api {
                status, message, ..
            } => {
                assert_eq!(status, 503);
                assert_eq!(message, "upstream unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unanswered_request_times_out() {
        let client = GraphClient::new(Arc::new(StaticTokenProvider::new("tok")))
            .unwrap()
            .with_base_url(silent_server().await)
            .unwrap()
            .with_timeout(Duration::from_millis(200))
            .unwrap();

        let session = client.session().await.unwrap();
        let result = tokio::time::timeout(Duration::from_secs(10), session.list_unread(10)).await;

        match result.unwrap() {
            Err(Error::Http(e)) => assert!(e.is_timeout()),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = GraphClient::new(Arc::new(StaticTokenProvider::new("tok")))
            .unwrap()
            .with_timeout(Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
