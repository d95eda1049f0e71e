//! Access token providers.
//!
//! A [`GraphClient`](crate::GraphClient) never owns a token itself; it asks
//! its [`TokenProvider`] for one every time it opens a session.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::flow::OAuthClient;
use crate::token::Token;

/// Source of bearer tokens for Graph requests.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns an access token valid for at least the next request.
    ///
    /// # Errors
    ///
    /// Returns an error if no valid token can be obtained.
    async fn access_token(&self) -> Result<String>;
}

/// Persistent storage for the long-lived refresh token.
pub trait TokenStore: Send + Sync {
    /// Loads the stored refresh token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load(&self) -> Result<Option<String>>;

    /// Replaces the stored refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn save(&self, refresh_token: &str) -> Result<()>;
}

/// Provider returning a fixed, externally managed access token.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Creates a provider for the given access token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        if self.token.is_empty() {
            return Err(Error::InvalidConfig("empty access token".into()));
        }
        Ok(self.token.clone())
    }
}

/// Provider that refreshes its access token with a refresh token grant.
///
/// The current token sits behind a mutex, so concurrent callers wait for a
/// single refresh instead of racing each other with the same refresh token.
pub struct RefreshTokenProvider {
    oauth: OAuthClient,
    token: Mutex<Token>,
    store: Option<Arc<dyn TokenStore>>,
}

impl RefreshTokenProvider {
    /// Creates a provider starting from `token`.
    ///
    /// Pass [`Token::refresh_only`] when only a refresh token is known.
    #[must_use]
    pub fn new(oauth: OAuthClient, token: Token) -> Self {
        Self {
            oauth,
            token: Mutex::new(token),
            store: None,
        }
    }

    /// Persists rotated refresh tokens to `store`.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    fn persist(&self, previous: Option<&str>, current: Option<&str>) {
        let (Some(store), Some(current)) = (&self.store, current) else {
            return;
        };
        if previous == Some(current) {
            return;
        }

        match store.save(current) {
            Ok(()) => debug!("Stored rotated refresh token"),
            Err(e) => warn!("Failed to store rotated refresh token: {e}"),
        }
    }
}

impl std::fmt::Debug for RefreshTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenProvider")
            .field("client_id", &self.oauth.client_id)
            .field("tenant", &self.oauth.authority.tenant)
            .field("has_store", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenProvider for RefreshTokenProvider {
    async fn access_token(&self) -> Result<String> {
        let mut token = self.token.lock().await;
        if token.is_usable() {
            return Ok(token.access_token.clone());
        }

        info!("Access token expired, refreshing");
        let refreshed = self.oauth.refresh_token(&token).await?;
        self.persist(
            token.refresh_token.as_deref(),
            refreshed.refresh_token.as_deref(),
        );

        *token = refreshed;
        Ok(token.access_token.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::authority::Authority;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct MemoryStore {
        saved: StdMutex<Vec<String>>,
    }

    impl TokenStore for MemoryStore {
        fn load(&self) -> Result<Option<String>> {
            Ok(self.saved.lock().unwrap().last().cloned())
        }

        fn save(&self, refresh_token: &str) -> Result<()> {
            self.saved.lock().unwrap().push(refresh_token.to_string());
            Ok(())
        }
    }

    fn oauth_for(server: &mockito::Server) -> OAuthClient {
        let authority = Authority::with_login_host(server.url(), "consumers").unwrap();
        OAuthClient::new("client-123", authority).unwrap()
    }

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticTokenProvider::new("abc");
        assert_eq!(provider.access_token().await.unwrap(), "abc");
        assert!(StaticTokenProvider::new("").access_token().await.is_err());
    }

    #[tokio::test]
    async fn test_refresh_once_then_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/consumers/oauth2/v2.0/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"token_type":"Bearer","expires_in":3600,"access_token":"at-1","refresh_token":"rt-2"}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let store = Arc::new(MemoryStore::default());
        let provider = RefreshTokenProvider::new(oauth_for(&server), Token::refresh_only("rt-1"))
            .with_store(store.clone());

        assert_eq!(provider.access_token().await.unwrap(), "at-1");
        assert_eq!(provider.access_token().await.unwrap(), "at-1");

        mock.assert_async().await;
        assert_eq!(store.load().unwrap().as_deref(), Some("rt-2"));
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/consumers/oauth2/v2.0/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"token_type":"Bearer","expires_in":3600,"access_token":"shared"}"#)
            .expect(1)
            .create_async()
            .await;

        let provider = Arc::new(RefreshTokenProvider::new(
            oauth_for(&server),
            Token::refresh_only("rt"),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let provider = Arc::clone(&provider);
                tokio::spawn(async move { provider.access_token().await.unwrap() })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), "shared");
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unchanged_refresh_token_not_stored() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/consumers/oauth2/v2.0/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"token_type":"Bearer","expires_in":3600,"access_token":"at"}"#)
            .create_async()
            .await;

        let store = Arc::new(MemoryStore::default());
        let provider = RefreshTokenProvider::new(oauth_for(&server), Token::refresh_only("rt"))
            .with_store(store.clone());

        provider.access_token().await.unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
