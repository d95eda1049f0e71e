//! # promptledger-extract
//!
//! Turns the free-text body of a bank payment notification into a
//! structured [`PaymentNotification`].
//!
//! ## Features
//!
//! - **Normalization**: strip markup from HTML bodies before extraction
//! - **Templates**: one [`NotificationTemplate`] per bank/notification family
//! - **Registry**: pick the template for a message by its subject line
//!
//! ## Quick Start
//!
//! ```ignore
//! use promptledger_extract::{BodyType, TemplateRegistry, normalize};
//!
//! let registry = TemplateRegistry::builtin();
//! let template = registry
//!     .select("คุณได้รับเงินผ่านรายการพร้อมเพย์")
//!     .expect("SCB PromptPay subject");
//!
//! let text = normalize(Some(html_body), BodyType::Html);
//! let notification = template.parse(&text)?;
//! println!("{} received {}", notification.recipient, notification.transaction.amount);
//! ```
//!
//! Text fields whose anchor is missing come back empty. The amount is the
//! exception: a missing or malformed amount fails the whole parse with an
//! [`ExtractionError`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
mod normalize;
mod notification;

pub mod template;

pub use error::{ExtractionError, Field, Result};
pub use normalize::{BodyType, normalize};
pub use notification::{BankAccount, PaymentNotification, Transaction};
pub use template::{NotificationTemplate, ScbPromptPay, TemplateRegistry};
