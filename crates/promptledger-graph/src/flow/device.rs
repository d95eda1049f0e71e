//! Device Authorization Flow implementation (RFC 8628).
//!
//! Used once, when the service starts without any refresh token.

use super::OAuthClient;
use crate::error::{Error, Result};
use crate::token::{ErrorResponse, Token, TokenResponse};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Device authorization response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceAuthorization {
    /// Device code for polling.
    pub device_code: String,
    /// User code to display to the user.
    pub user_code: String,
    /// Verification URI where user should go.
    pub verification_uri: String,
    /// Expiration time in seconds.
    pub expires_in: u32,
    /// Polling interval in seconds.
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Human-readable instructions from the identity platform.
    #[serde(default)]
    pub message: Option<String>,
}

const fn default_interval() -> u32 {
    5
}

/// Device code grant for a headless first login.
#[derive(Debug)]
pub struct DeviceCodeFlow {
    client: OAuthClient,
}

impl DeviceCodeFlow {
    /// Creates a new device flow.
    #[must_use]
    pub const fn new(client: OAuthClient) -> Self {
        Self { client }
    }

    /// Requests a device code and user code.
    ///
    /// # Errors
    ///
    /// Returns an error if the authorization request fails.
    pub async fn request_device_authorization(&self) -> Result<DeviceAuthorization> {
        let scope = self.client.scope();

        let mut params = HashMap::new();
        params.insert("client_id", self.client.client_id.as_str());
        if !scope.is_empty() {
            params.insert("scope", &scope);
        }

        let response = self
            .client
            .http_client
            .post(self.client.authority.device_code_url.clone())
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let error: ErrorResponse = response.json().await?;
            return Err(error.into_error());
        }

        response.json().await.map_err(Into::into)
    }

    /// Polls the token endpoint once, after waiting `interval`.
    ///
    /// # Errors
    ///
    /// Returns `Error::OAuth` with `authorization_pending` or `slow_down` while
    /// the user has not finished; `Error::AccessDenied` or `Error::TokenExpired`
    /// end the flow.
    pub async fn poll_for_token(&self, device_code: &str, interval: Duration) -> Result<Token> {
        tokio::time::sleep(interval).await;

        let mut params = HashMap::new();
        params.insert("grant_type", "urn:ietf:params:oauth:grant-type:device_code");
        params.insert("device_code", device_code);
        params.insert("client_id", &self.client.client_id);

        let response = self
            .client
            .http_client
            .post(self.client.authority.token_url.clone())
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let error: ErrorResponse = response.json().await?;

            return match error.error.as_str() {
                "authorization_pending" | "slow_down" => Err(error.into_error()),
                "access_denied" | "authorization_declined" => Err(Error::AccessDenied),
                "expired_token" => Err(Error::TokenExpired),
                _ => Err(error.into_error()),
            };
        }

        let token_response: TokenResponse = response.json().await?;
        Token::from_response(token_response)
    }

    /// Polls until the user completes the authorization started by `auth`.
    ///
    /// Gives up once the device code's lifetime has elapsed.
    ///
    /// # Errors
    ///
    /// Returns an error if authorization fails or times out.
    pub async fn wait_for_token(&self, auth: &DeviceAuthorization) -> Result<Token> {
        let mut interval = Duration::from_secs(u64::from(auth.interval.max(1)));
        let deadline =
            tokio::time::Instant::now() + Duration::from_secs(u64::from(auth.expires_in));

        loop {
            if tokio::time::Instant::now() + interval > deadline {
                return Err(Error::Timeout(auth.expires_in.into()));
            }

            match self.poll_for_token(&auth.device_code, interval).await {
                Ok(token) => return Ok(token),
                Err(Error::OAuth { ref error, .. }) if error == "authorization_pending" => {
                    debug!("Device authorization pending");
                }
                Err(Error::OAuth { ref error, .. }) if error == "slow_down" => {
                    // Increase interval by 5 seconds as per RFC
                    interval += Duration::from_secs(5);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
