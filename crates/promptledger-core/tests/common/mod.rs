#![allow(dead_code, clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use promptledger_core::{
    DedupStore, IngestionRecord, Mailbox, MailboxError, MessageId, RawMessage, RecordOutcome,
    StoreError, StoreResult,
};
use promptledger_extract::{BodyType, NotificationTemplate, PaymentNotification, ScbPromptPay};

pub const PROMPTPAY_SUBJECT: &str = "คุณได้รับเงินผ่านรายการพร้อมเพย์";

pub const SCB_BODY: &str = "เรียน Somchai คุณได้รับ...จาก: SCB ... XXX123/จำนวน ... จำนวน (บาท): 1500.00เข้าบัญชี: YYY456วัน ... วัน/เวลา: 01/01/2024 10:00ขอแสดงความนับถือธนาคารไทยพาณิชย์";

pub const SCB_HTML_BODY: &str = concat!(
    "<html><body><table>",
    "<tr><td>เรียน Somchai Jaidee</td></tr>",
    "<tr><td> คุณได้รับเงินผ่านรายการพร้อมเพย์ </td></tr>",
    "<tr><td>จาก: KBANK / x4321</td><td>จำนวน (บาท): 1,250.50</td>",
    "<td>เข้าบัญชี: x9876</td><td>วัน/เวลา: 15 ม.ค. 2567 - 14:35</td>",
    "<td>ขอแสดงความนับถือ</td><td>ธนาคารไทยพาณิชย์</td></tr>",
    "</table></body></html>",
);

/// A PromptPay notification with the plain-text sample body.
pub fn promptpay(id: &str) -> RawMessage {
    RawMessage::new(id, PROMPTPAY_SUBJECT)
        .with_body(SCB_BODY, BodyType::Text)
        .with_internet_message_id(format!("<{id}@scb.co.th>"))
}

/// A PromptPay notification whose body has no amount.
pub fn promptpay_without_amount(id: &str) -> RawMessage {
    RawMessage::new(id, PROMPTPAY_SUBJECT)
        .with_body("เรียน Somchai คุณได้รับ จาก: SCB", BodyType::Text)
}

/// An unrelated message.
pub fn newsletter(id: &str) -> RawMessage {
    RawMessage::new(id, "Weekly newsletter").with_body(SCB_BODY, BodyType::Text)
}

/// Mailbox holding a fixed set of messages, newest first.
#[derive(Default)]
pub struct FakeMailbox {
    messages: Mutex<Vec<RawMessage>>,
    read: Mutex<HashSet<MessageId>>,
    pub list_calls: AtomicUsize,
    pub mark_read_calls: AtomicUsize,
    pub fail_list: AtomicBool,
    pub fail_mark_read: AtomicBool,
}

impl FakeMailbox {
    pub fn with_messages(messages: Vec<RawMessage>) -> Arc<Self> {
        Arc::new(Self {
            messages: Mutex::new(messages),
            ..Self::default()
        })
    }

    pub fn is_read(&self, id: &str) -> bool {
        self.read.lock().unwrap().contains(&MessageId::new(id))
    }

    pub fn read_count(&self) -> usize {
        self.read.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailbox for FakeMailbox {
    async fn list_unread(&self, limit: u32) -> Result<Vec<RawMessage>, MailboxError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(MailboxError::Connection("mailbox offline".into()));
        }

        let read = self.read.lock().unwrap();
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| !read.contains(&m.id))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, id: &MessageId) -> Result<(), MailboxError> {
        self.mark_read_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_mark_read.load(Ordering::SeqCst) {
            return Err(MailboxError::Operation("flag update rejected".into()));
        }
        self.read.lock().unwrap().insert(id.clone());
        Ok(())
    }
}

/// Store whose backend is always down.
pub struct UnavailableStore;

#[async_trait]
impl DedupStore for UnavailableStore {
    async fn exists(&self, _id: &MessageId) -> StoreResult<bool> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn record_if_absent(&self, _record: &IngestionRecord) -> StoreResult<RecordOutcome> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

/// Store that answers lookups but fails every insert.
#[derive(Default)]
pub struct FailingInsertStore {
    pub checked: Mutex<Vec<MessageId>>,
    pub insert_calls: AtomicUsize,
}

#[async_trait]
impl DedupStore for FailingInsertStore {
    async fn exists(&self, id: &MessageId) -> StoreResult<bool> {
        self.checked.lock().unwrap().push(id.clone());
        Ok(false)
    }

    async fn record_if_absent(&self, _record: &IngestionRecord) -> StoreResult<RecordOutcome> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("disk I/O error".into()))
    }
}

/// Store that claims nothing exists yet but already holds every record,
/// as seen by a cycle that lost the insert race.
pub struct RaceLostStore;

#[async_trait]
impl DedupStore for RaceLostStore {
    async fn exists(&self, _id: &MessageId) -> StoreResult<bool> {
        Ok(false)
    }

    async fn record_if_absent(&self, _record: &IngestionRecord) -> StoreResult<RecordOutcome> {
        Ok(RecordOutcome::AlreadyExists)
    }
}

/// SCB template that counts how often it parses.
#[derive(Clone, Default)]
pub struct CountingTemplate {
    pub parses: Arc<AtomicUsize>,
}

impl NotificationTemplate for CountingTemplate {
    fn name(&self) -> &'static str {
        "counting-scb"
    }

    fn matches_subject(&self, subject: &str) -> bool {
        ScbPromptPay.matches_subject(subject)
    }

    fn parse(&self, text: &str) -> promptledger_extract::Result<PaymentNotification> {
        self.parses.fetch_add(1, Ordering::SeqCst);
        ScbPromptPay.parse(text)
    }
}
