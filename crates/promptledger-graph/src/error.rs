//! Error types for Graph and `OAuth2` operations.

/// Result type alias for Graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Graph client error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// `OAuth2` error from the identity platform.
    #[error("OAuth2 error: {error} - {description}")]
    OAuth {
        /// Error code (e.g., `invalid_grant`).
        error: String,
        /// Human-readable description.
        description: String,
    },

    /// Error response from the Graph API.
    #[error("Graph API error ({status}): {code} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Graph error code (e.g., `InvalidAuthenticationToken`).
        code: String,
        /// Human-readable message.
        message: String,
    },

    /// Token expired.
    #[error("Token expired")]
    TokenExpired,

    /// No refresh token available.
    #[error("No refresh token available")]
    NoRefreshToken,

    /// Authorization timeout.
    #[error("Authorization timed out after {0} seconds")]
    Timeout(u64),

    /// User denied authorization.
    #[error("User denied authorization")]
    AccessDenied,

    /// Refresh token persistence failed.
    #[error("Token store error: {0}")]
    TokenStore(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// URL parsing error.
    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),
}

impl Error {
    /// Creates an OAuth error from error code and description.
    #[must_use]
    pub fn oauth_error(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self::OAuth {
            error: error.into(),
            description: description.into(),
        }
    }

    /// Returns true if the failure is about credentials rather than transport.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        match self {
            Self::OAuth { .. } | Self::TokenExpired | Self::NoRefreshToken | Self::AccessDenied => {
                true
            }
            Self::Api { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }
}
