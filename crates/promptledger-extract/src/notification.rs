//! Structured payment notification types.

use rust_decimal::Decimal;

/// A parsed bank payment notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentNotification {
    /// Name the notification is addressed to.
    pub recipient: String,
    /// Transaction details.
    pub transaction: Transaction,
}

/// Transaction carried by a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Payment method tag (e.g. "พร้อมเพย์").
    pub method: String,
    /// Account the money came from.
    pub from: BankAccount,
    /// Amount in the base currency unit, exact.
    pub amount: Decimal,
    /// Account the money went into.
    pub to_account: String,
    /// Date/time text exactly as the bank wrote it.
    pub date_time: String,
}

/// A bank account reference as printed in a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankAccount {
    /// Bank name or code (e.g. "SCB").
    pub bank: String,
    /// Masked account identifier.
    pub account: String,
}

impl BankAccount {
    /// Creates a new account reference.
    #[must_use]
    pub fn new(bank: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            bank: bank.into(),
            account: account.into(),
        }
    }
}
