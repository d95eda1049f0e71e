//! Service configuration, read from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail, ensure};
use envconfig::Envconfig;

/// Largest `$top` Graph accepts on a message listing.
const MAX_FETCH_LIMIT: u32 = 1000;

/// Where rotated refresh tokens are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStoreKind {
    /// System keyring.
    Keyring,
    /// Nowhere; a restart needs `GRAPH_REFRESH_TOKEN` or a new device login.
    None,
}

impl FromStr for TokenStoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyring" => Ok(Self::Keyring),
            "none" | "" => Ok(Self::None),
            other => Err(format!("unknown token store: {other}")),
        }
    }
}

#[derive(Envconfig)]
pub struct Config {
    /// Application (client) ID registered with the Microsoft identity platform.
    #[envconfig(from = "CLIENT_ID")]
    pub client_id: Option<String>,

    #[envconfig(from = "TENANT", default = "consumers")]
    pub tenant: String,

    /// Comma separated.
    #[envconfig(from = "SCOPES", default = "offline_access,Mail.ReadWrite")]
    pub scopes: String,

    #[envconfig(from = "GRAPH_BASE_URL", default = "https://graph.microsoft.com/v1.0/")]
    pub graph_base_url: String,

    /// Externally managed access token; disables refreshing.
    #[envconfig(from = "GRAPH_ACCESS_TOKEN")]
    pub graph_access_token: Option<String>,

    #[envconfig(from = "GRAPH_REFRESH_TOKEN")]
    pub graph_refresh_token: Option<String>,

    #[envconfig(from = "TOKEN_STORE", default = "keyring")]
    pub token_store: TokenStoreKind,

    #[envconfig(from = "KEYRING_ACCOUNT", default = "default")]
    pub keyring_account: String,

    /// Defaults to `<data dir>/promptledger/ledger.db`.
    #[envconfig(from = "DATABASE_PATH")]
    pub database_path: Option<String>,

    #[envconfig(from = "POLL_INTERVAL_SECS", default = "60")]
    pub poll_interval_secs: u64,

    #[envconfig(from = "FETCH_LIMIT", default = "10")]
    pub fetch_limit: u32,

    /// Bound on each Graph and token request.
    #[envconfig(from = "HTTP_TIMEOUT_SECS", default = "30")]
    pub http_timeout_secs: u64,
}

impl Config {
    /// Checks values that parse but cannot work.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.poll_interval_secs > 0, "POLL_INTERVAL_SECS must be greater than zero");
        ensure!(self.http_timeout_secs > 0, "HTTP_TIMEOUT_SECS must be greater than zero");
        ensure!(
            (1..=MAX_FETCH_LIMIT).contains(&self.fetch_limit),
            "FETCH_LIMIT must be between 1 and {MAX_FETCH_LIMIT}"
        );

        if self.access_token().is_none() {
            if self.client_id().is_none() {
                bail!("CLIENT_ID is required unless GRAPH_ACCESS_TOKEN is set");
            }
            ensure!(!self.scopes().is_empty(), "SCOPES must name at least one scope");
            ensure!(!self.tenant.trim().is_empty(), "TENANT must not be empty");
        }

        if self.token_store == TokenStoreKind::Keyring {
            ensure!(
                !self.keyring_account.trim().is_empty(),
                "KEYRING_ACCOUNT must not be empty when TOKEN_STORE=keyring"
            );
        }

        Ok(())
    }

    pub fn client_id(&self) -> Option<&str> {
        non_empty(self.client_id.as_deref())
    }

    pub fn access_token(&self) -> Option<&str> {
        non_empty(self.graph_access_token.as_deref())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        non_empty(self.graph_refresh_token.as_deref())
    }

    pub fn scopes(&self) -> Vec<String> {
        self.scopes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Resolves the ledger path and creates its parent directory.
    pub fn database_path(&self) -> anyhow::Result<PathBuf> {
        let path = match non_empty(self.database_path.as_deref()) {
            Some(path) => PathBuf::from(path),
            None => dirs::data_dir()
                .context("No data directory on this platform; set DATABASE_PATH")?
                .join("promptledger")
                .join("ledger.db"),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        Ok(path)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::init_from_hashmap(&env).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("CLIENT_ID", "abc")]);
        assert_eq!(config.tenant, "consumers");
        assert_eq!(config.scopes(), vec!["offline_access", "Mail.ReadWrite"]);
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.fetch_limit, 10);
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
        assert_eq!(config.token_store, TokenStoreKind::Keyring);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_client_id_required_without_access_token() {
        assert!(config(&[]).validate().is_err());
        assert!(config(&[("CLIENT_ID", "  ")]).validate().is_err());
        assert!(config(&[("GRAPH_ACCESS_TOKEN", "tok")]).validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = config(&[("CLIENT_ID", "abc"), ("POLL_INTERVAL_SECS", "0")]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_http_timeout_rejected() {
        let config = config(&[("CLIENT_ID", "abc"), ("HTTP_TIMEOUT_SECS", "0")]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fetch_limit_bounds() {
        assert!(config(&[("CLIENT_ID", "abc"), ("FETCH_LIMIT", "0")]).validate().is_err());
        assert!(config(&[("CLIENT_ID", "abc"), ("FETCH_LIMIT", "1001")]).validate().is_err());
        assert!(config(&[("CLIENT_ID", "abc"), ("FETCH_LIMIT", "50")]).validate().is_ok());
    }

    #[test]
    fn test_scopes_trimmed() {
        let config = config(&[("CLIENT_ID", "abc"), ("SCOPES", " Mail.Read , ,offline_access ")]);
        assert_eq!(config.scopes(), vec!["Mail.Read", "offline_access"]);
    }

    #[test]
    fn test_token_store_parsing() {
        assert_eq!("KEYRING".parse::<TokenStoreKind>().unwrap(), TokenStoreKind::Keyring);
        assert_eq!("none".parse::<TokenStoreKind>().unwrap(), TokenStoreKind::None);
        assert!("vault".parse::<TokenStoreKind>().is_err());
    }

    #[test]
    fn test_explicit_database_path() {
        let dir = std::env::temp_dir().join(format!("promptledger-config-{}", std::process::id()));
        let file = dir.join("nested").join("ledger.db");
        let config = config(&[("DATABASE_PATH", file.to_str().unwrap())]);

        assert_eq!(config.database_path().unwrap(), file);
        assert!(file.parent().unwrap().is_dir());

        std::fs::remove_dir_all(&dir).ok();
    }
}
