//! Error types for notification extraction.

use std::fmt;

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// A field extracted from a notification body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Name of the person receiving the payment.
    Recipient,
    /// Bank the payment came from.
    FromBank,
    /// Account the payment came from.
    FromAccount,
    /// Transferred amount.
    Amount,
    /// Account the payment went into.
    ToAccount,
    /// Notification date/time text.
    DateTime,
}

impl Field {
    /// Returns the field name as used in logs and persisted records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recipient => "recipient",
            Self::FromBank => "fromBank",
            Self::FromAccount => "fromAccount",
            Self::Amount => "amount",
            Self::ToAccount => "toAccount",
            Self::DateTime => "datetime",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extraction error types.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// A required anchor was not found, or captured nothing.
    #[error("Missing required field: {0}")]
    MissingField(Field),

    /// The amount anchor matched but its text is not a decimal number.
    #[error("Invalid amount {raw:?}: {source}")]
    InvalidAmount {
        /// Captured text, before separator removal.
        raw: String,
        /// Decimal parse failure.
        #[source]
        source: rust_decimal::Error,
    },
}

impl ExtractionError {
    /// Returns the field this error is about.
    #[must_use]
    pub const fn field(&self) -> Field {
        match self {
            Self::MissingField(field) => *field,
            Self::InvalidAmount { .. } => Field::Amount,
        }
    }
}
