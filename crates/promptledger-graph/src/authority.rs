//! Microsoft identity platform authorities.

use crate::error::{Error, Result};
use url::Url;

/// Default login host of the Microsoft identity platform.
const LOGIN_HOST: &str = "https://login.microsoftonline.com/";

/// Tenant for personal Microsoft accounts (outlook.com, hotmail.com).
pub const CONSUMERS: &str = "consumers";

/// Token endpoints of one tenant.
#[derive(Debug, Clone)]
pub struct Authority {
    /// Tenant segment (`consumers`, `common`, `organizations` or a tenant id).
    pub tenant: String,
    /// Token endpoint URL.
    pub token_url: Url,
    /// Device authorization endpoint URL.
    pub device_code_url: Url,
}

impl Authority {
    /// Creates the authority of a tenant on the public login host.
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant produces an invalid URL.
    pub fn new(tenant: impl Into<String>) -> Result<Self> {
        Self::with_login_host(LOGIN_HOST, tenant)
    }

    /// Creates an authority on a custom login host (national clouds, tests).
    ///
    /// # Errors
    ///
    /// Returns an error if the host or tenant produces an invalid URL.
    pub fn with_login_host(host: impl AsRef<str>, tenant: impl Into<String>) -> Result<Self> {
        let tenant = tenant.into();
        if tenant.trim().is_empty() || tenant.contains('/') {
            return Err(Error::InvalidConfig(format!("invalid tenant {tenant:?}")));
        }

        let mut host = host.as_ref().to_string();
        if !host.ends_with('/') {
            host.push('/');
        }
        let base = Url::parse(&host)?.join(&format!("{tenant}/oauth2/v2.0/"))?;

        Ok(Self {
            token_url: base.join("token")?,
            device_code_url: base.join("devicecode")?,
            tenant,
        })
    }

    /// Authority for personal Microsoft accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if URL parsing fails.
    pub fn consumers() -> Result<Self> {
        Self::new(CONSUMERS)
    }
}
