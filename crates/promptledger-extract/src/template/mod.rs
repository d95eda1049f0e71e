//! Notification templates.
//!
//! Every bank formats its notifications differently, so each supported
//! format is a [`NotificationTemplate`]. Callers pick a template through a
//! [`TemplateRegistry`] (by subject line) and never touch the anchors
//! themselves.

mod scb;

pub use scb::ScbPromptPay;

use regex::Regex;
use rust_decimal::Decimal;

use crate::error::{ExtractionError, Field, Result};
use crate::notification::PaymentNotification;

/// A notification format for one bank/notification family.
pub trait NotificationTemplate: Send + Sync {
    /// Short identifier used in logs (e.g. `scb-promptpay`).
    fn name(&self) -> &'static str;

    /// Checks whether a message with this subject uses this template.
    fn matches_subject(&self, subject: &str) -> bool;

    /// Extracts a notification from normalized plain text.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is missing or is not a decimal number.
    fn parse(&self, text: &str) -> Result<PaymentNotification>;
}

/// Ordered set of templates; the first match wins.
#[derive(Default)]
pub struct TemplateRegistry {
    templates: Vec<Box<dyn NotificationTemplate>>,
}

impl TemplateRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every template shipped in this crate.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new().with_template(ScbPromptPay)
    }

    /// Appends a template with lower priority than those already registered.
    #[must_use]
    pub fn with_template(mut self, template: impl NotificationTemplate + 'static) -> Self {
        self.templates.push(Box::new(template));
        self
    }

    /// Returns the template responsible for a subject line, if any.
    #[must_use]
    pub fn select(&self, subject: &str) -> Option<&dyn NotificationTemplate> {
        self.templates
            .iter()
            .find(|t| t.matches_subject(subject))
            .map(AsRef::as_ref)
    }

    /// Names of the registered templates, in priority order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.templates.iter().map(|t| t.name()).collect()
    }

    /// Returns true if no template is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl std::fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("templates", &self.names())
            .finish()
    }
}

/// Returns the trimmed first capture group of the leftmost match.
///
/// A missing anchor yields `None`.
fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Parses a captured amount into an exact decimal.
///
/// Thousands separators are dropped. Nothing is ever defaulted to zero.
fn parse_amount(raw: Option<&str>) -> Result<Decimal> {
    let raw = raw
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or(ExtractionError::MissingField(Field::Amount))?;

    let cleaned = raw.replace(',', "");
    Decimal::from_str_exact(&cleaned).map_err(|source| ExtractionError::InvalidAmount {
        raw: raw.to_string(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notification::{BankAccount, Transaction};
    use rust_decimal_macros::dec;

    struct FixedTemplate;

    impl NotificationTemplate for FixedTemplate {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn matches_subject(&self, subject: &str) -> bool {
            subject.starts_with("Payment received")
        }

        fn parse(&self, _text: &str) -> Result<PaymentNotification> {
            Ok(PaymentNotification {
                recipient: "Fixed".to_string(),
                transaction: Transaction {
                    method: "transfer".to_string(),
                    from: BankAccount::new("TEST", "0001"),
                    amount: dec!(1),
                    to_account: "0002".to_string(),
                    date_time: String::new(),
                },
            })
        }
    }

    #[test]
    fn test_builtin_selects_scb() {
        let registry = TemplateRegistry::builtin();
        let template = registry
            .select("แจ้งเตือน: คุณได้รับเงินผ่านรายการพร้อมเพย์")
            .unwrap();
        assert_eq!(template.name(), "scb-promptpay");
    }

    #[test]
    fn test_unknown_subject_not_selected() {
        let registry = TemplateRegistry::builtin();
        assert!(registry.select("Your monthly statement").is_none());
        assert!(registry.select("").is_none());
    }

    #[test]
    fn test_empty_registry() {
        let registry = TemplateRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.select("คุณได้รับเงินผ่านรายการพร้อมเพย์").is_none());
    }

    #[test]
    fn test_registration_order_is_priority() {
        let registry = TemplateRegistry::builtin().with_template(FixedTemplate);
        assert_eq!(registry.names(), vec!["scb-promptpay", "fixed"]);

        let fixed = registry.select("Payment received from ACME").unwrap();
        assert_eq!(fixed.name(), "fixed");
        assert_eq!(fixed.parse("").unwrap().recipient, "Fixed");
    }

    #[test]
    fn test_parse_amount_plain_and_grouped() {
        assert_eq!(parse_amount(Some("1500.00")).unwrap(), dec!(1500.00));
        assert_eq!(parse_amount(Some(" 12,345.67 ")).unwrap(), dec!(12345.67));
        assert_eq!(parse_amount(Some("7")).unwrap(), dec!(7));
    }

    #[test]
    fn test_parse_amount_missing() {
        let err = parse_amount(None).unwrap_err();
        assert!(matches!(err, ExtractionError::MissingField(Field::Amount)));

        let err = parse_amount(Some("   ")).unwrap_err();
        assert_eq!(err.field(), Field::Amount);
    }

    #[test]
    fn test_parse_amount_not_a_number() {
        let err = parse_amount(Some("หนึ่งพัน")).unwrap_err();
        match err {
            ExtractionError::InvalidAmount { raw, .. } => assert_eq!(raw, "หนึ่งพัน"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
