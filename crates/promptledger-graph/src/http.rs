//! HTTP client settings shared by Graph and token requests.

use std::time::Duration;

use reqwest::Client;

use crate::error::{Error, Result};

/// Upper bound on a whole request, response body included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on establishing a connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds a client whose requests fail after `timeout`.
///
/// # Errors
///
/// Returns `Error::InvalidConfig` for a zero timeout, or the builder's error.
pub fn build_client(timeout: Duration) -> Result<Client> {
    if timeout.is_zero() {
        return Err(Error::InvalidConfig("request timeout must be greater than zero".into()));
    }

    Ok(Client::builder()
        .connect_timeout(timeout.min(CONNECT_TIMEOUT))
        .timeout(timeout)
        .build()?)
}
