//! Refresh token storage in the system keyring.
//!
//! Uses the platform's native credential storage:
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - macOS: Keychain
//! - Windows: Credential Manager

use keyring::Entry;
use promptledger_graph::TokenStore;
use tracing::debug;

/// Service name used for keyring entries.
const SERVICE_NAME: &str = "promptledger";

/// Credential type identifier for Graph refresh tokens.
const REFRESH_TOKEN_CREDENTIAL: &str = "graph_refresh_token";

/// Error type for credential operations.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Failed to access keyring.
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// An account name is required for credential operations.
    #[error("Account name is required for credential storage")]
    MissingAccount,
}

/// Result type for credential operations.
pub type CredentialResult<T> = std::result::Result<T, CredentialError>;

/// Generates the keyring entry for an account's refresh token.
fn refresh_token_entry(account: &str) -> CredentialResult<Entry> {
    if account.trim().is_empty() {
        return Err(CredentialError::MissingAccount);
    }
    let key = format!("{SERVICE_NAME}_{REFRESH_TOKEN_CREDENTIAL}_{account}");
    Ok(Entry::new(SERVICE_NAME, &key)?)
}

/// Stores a refresh token in the system keyring.
///
/// # Errors
///
/// Returns an error if the account name is empty or the keyring operation fails.
pub fn store_refresh_token(account: &str, refresh_token: &str) -> CredentialResult<()> {
    refresh_token_entry(account)?.set_password(refresh_token)?;
    debug!("Stored refresh token for {account}");
    Ok(())
}

/// Retrieves a refresh token from the system keyring.
///
/// # Errors
///
/// Returns an error if the account name is empty or the keyring operation fails.
pub fn get_refresh_token(account: &str) -> CredentialResult<Option<String>> {
    match refresh_token_entry(account)?.get_password() {
        Ok(token) => Ok(Some(token)),
        Err(keyring::Error::NoEntry) => {
            debug!("No refresh token found for {account}");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// [`TokenStore`] backed by the system keyring.
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    account: String,
}

impl KeyringTokenStore {
    /// Creates a store for the given account name.
    ///
    /// # Errors
    ///
    /// Returns an error if the account name is empty.
    pub fn new(account: impl Into<String>) -> CredentialResult<Self> {
        let account = account.into();
        if account.trim().is_empty() {
            return Err(CredentialError::MissingAccount);
        }
        Ok(Self { account })
    }

    /// Account name the token is stored under.
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> promptledger_graph::Result<Option<String>> {
        get_refresh_token(&self.account)
            .map_err(|e| promptledger_graph::Error::TokenStore(e.to_string()))
    }

    fn save(&self, refresh_token: &str) -> promptledger_graph::Result<()> {
        store_refresh_token(&self.account, refresh_token)
            .map_err(|e| promptledger_graph::Error::TokenStore(e.to_string()))
    }
}
