//! SCB PromptPay incoming-transfer notification.
//!
//! The body (after markup is stripped) reads roughly:
//!
//! ```text
//! เรียน <name> คุณได้รับเงินผ่านรายการพร้อมเพย์ จาก: <bank> /<account>จำนวน (บาท): <amount>เข้าบัญชี: <account>วัน/เวลา: <when>ขอแสดงความนับถือธนาคารไทยพาณิชย์
//! ```

use std::sync::OnceLock;

use regex::Regex;

use super::{NotificationTemplate, capture, parse_amount};
use crate::error::Result;
use crate::notification::{BankAccount, PaymentNotification, Transaction};

/// Subject phrase identifying a PromptPay incoming-transfer notification.
const SUBJECT_MARKER: &str = "คุณได้รับเงินผ่านรายการพร้อมเพย์";

/// Method tag recorded for every transaction of this template.
const METHOD: &str = "พร้อมเพย์";

/// "Day" label of the date/time field, which runs into the destination account.
const DAY_LABEL: &str = "วัน";

struct Anchors {
    recipient: Regex,
    from_bank: Regex,
    from_account: Regex,
    from_account_slash_after: Regex,
    amount: Regex,
    to_account: Regex,
    date_time: Regex,
}

#[allow(clippy::expect_used)]
fn anchors() -> &'static Anchors {
    static ANCHORS: OnceLock<Anchors> = OnceLock::new();
    ANCHORS.get_or_init(|| Anchors {
        recipient: Regex::new(r"เรียน\s+(.*?)\s+คุณได้รับ").expect("invalid recipient regex"),
        from_bank: Regex::new(r"จาก:\s*(\w+)").expect("invalid bank regex"),
        from_account: Regex::new(r"/\s*(\w+)จำนวน").expect("invalid from-account regex"),
        from_account_slash_after: Regex::new(r"(\w+)\s*/\s*จำนวน")
            .expect("invalid from-account regex"),
        amount: Regex::new(r"จำนวน \(บาท\):\s*(.*?)เข้าบัญชี").expect("invalid amount regex"),
        to_account: Regex::new(r"เข้าบัญชี:\s*(\w+)").expect("invalid to-account regex"),
        date_time: Regex::new(r"วัน/เวลา:\s*(.*?)ขอแสดงความนับถือธนาคารไทยพาณิชย์")
            .expect("invalid date/time regex"),
    })
}

/// Siam Commercial Bank PromptPay notification template.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScbPromptPay;

impl NotificationTemplate for ScbPromptPay {
    fn name(&self) -> &'static str {
        "scb-promptpay"
    }

    fn matches_subject(&self, subject: &str) -> bool {
        subject.contains(SUBJECT_MARKER)
    }

    fn parse(&self, text: &str) -> Result<PaymentNotification> {
        let anchors = anchors();
        let text_field = |re: &Regex| capture(re, text).unwrap_or_default().to_string();

        let amount = parse_amount(capture(&anchors.amount, text))?;

        let from_account = capture(&anchors.from_account, text)
            .or_else(|| capture(&anchors.from_account_slash_after, text))
            .unwrap_or_default()
            .to_string();

        let to_account = text_field(&anchors.to_account).replace(DAY_LABEL, "");

        Ok(PaymentNotification {
            recipient: text_field(&anchors.recipient),
            transaction: Transaction {
                method: METHOD.to_string(),
                from: BankAccount::new(text_field(&anchors.from_bank), from_account),
                amount,
                to_account,
                date_time: text_field(&anchors.date_time),
            },
        })
    }
}
