//! `OAuth2` grants against the Microsoft identity platform.

mod device;

pub use device::{DeviceAuthorization, DeviceCodeFlow};

use crate::authority::Authority;
use crate::error::Result;
use crate::http::{DEFAULT_TIMEOUT, build_client};
use crate::token::{ErrorResponse, Token, TokenResponse};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

/// Public client registration used for token requests.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    /// Application (client) ID.
    pub client_id: String,
    /// Authority issuing the tokens.
    pub authority: Authority,
    /// Scopes requested with every grant.
    pub scopes: Vec<String>,
    /// HTTP client.
    http_client: Client,
}

impl OAuthClient {
    /// Creates a new OAuth client whose requests give up after [`DEFAULT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(client_id: impl Into<String>, authority: Authority) -> Result<Self> {
        Ok(Self {
            client_id: client_id.into(),
            authority,
            scopes: Vec::new(),
            http_client: build_client(DEFAULT_TIMEOUT)?,
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

    /// Sets the requested scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Space-separated scope string.
    fn scope(&self) -> String {
        self.scopes.join(" ")
    }

    /// Refreshes an access token using a refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh fails or if the token has no refresh token.
    pub async fn refresh_token(&self, token: &Token) -> Result<Token> {
        let refresh_token = token.refresh_token()?;
        let scope = self.scope();

        let mut params = HashMap::new();
        params.insert("grant_type", "refresh_token");
        params.insert("refresh_token", refresh_token);
        params.insert("client_id", &self.client_id);
        if !scope.is_empty() {
            params.insert("scope", &scope);
        }

        let response = self
            .http_client
            .post(self.authority.token_url.clone())
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let error: ErrorResponse = response.json().await?;
            return Err(error.into_error());
        }

        let token_response: TokenResponse = response.json().await?;
        let mut new_token = Token::from_response(token_response)?;

        // Preserve refresh token if not returned
        if new_token.refresh_token.is_none() {
            new_token.refresh_token.clone_from(&token.refresh_token);
        }

        Ok(new_token)
    }
}
