//! One poll cycle: fetch, filter, dedup, parse, persist, acknowledge.

use std::sync::Arc;

use promptledger_extract::TemplateRegistry;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::ingest::{DedupStore, IngestionRecord, RecordOutcome};
use crate::message::RawMessage;
use crate::service::Mailbox;

/// Default number of unread messages fetched per cycle.
pub const DEFAULT_FETCH_LIMIT: u32 = 10;

/// Pipeline tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Most recent unread messages fetched per cycle.
    pub fetch_limit: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_limit: DEFAULT_FETCH_LIMIT,
        }
    }
}

/// What happened to a single fetched message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// No template accepts the subject; the message was left untouched.
    NotCandidate,
    /// A record already existed; nothing was parsed or acknowledged.
    AlreadyRecorded,
    /// The body could not be parsed; the message stays unread.
    ExtractionFailed,
    /// A new record was written.
    Ingested {
        /// Whether the message was marked as read.
        acknowledged: bool,
    },
    /// Another cycle recorded the message first.
    Duplicate {
        /// Whether the message was marked as read.
        acknowledged: bool,
    },
}

/// Summary of one poll cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Messages returned by the mailbox.
    pub fetched: usize,
    /// Messages whose subject matched no template.
    pub not_candidate: usize,
    /// Messages skipped because a record already existed.
    pub already_recorded: usize,
    /// Candidates whose body could not be parsed.
    pub extraction_failed: usize,
    /// New records written.
    pub ingested: usize,
    /// Parsed messages that lost the insert race to an overlapping cycle.
    pub duplicates: usize,
    /// Recorded messages that could not be marked as read.
    pub ack_failed: usize,
    /// Why the cycle stopped early, if it did.
    pub aborted: Option<Error>,
}

impl CycleReport {
    /// Returns whether the cycle stopped before processing every message.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    fn tally(&mut self, outcome: MessageOutcome) {
        let acknowledged = match outcome {
            MessageOutcome::NotCandidate => {
                self.not_candidate += 1;
                return;
            }
            MessageOutcome::AlreadyRecorded => {
                self.already_recorded += 1;
                return;
            }
            MessageOutcome::ExtractionFailed => {
                self.extraction_failed += 1;
                return;
            }
            MessageOutcome::Ingested { acknowledged } => {
                self.ingested += 1;
                acknowledged
            }
            MessageOutcome::Duplicate { acknowledged } => {
                self.duplicates += 1;
                acknowledged
            }
        };
        if !acknowledged {
            self.ack_failed += 1;
        }
    }
}

/// Moves payment notifications from a mailbox into a dedup store.
///
/// Shared behind an `Arc`; overlapping cycles are safe because uniqueness
/// is enforced by [`DedupStore::record_if_absent`].
pub struct IngestionPipeline {
    mailbox: Arc<dyn Mailbox>,
    store: Arc<dyn DedupStore>,
    templates: TemplateRegistry,
    config: PipelineConfig,
}

impl IngestionPipeline {
    /// Creates a pipeline with the built-in templates and default settings.
    #[must_use]
    pub fn new(mailbox: Arc<dyn Mailbox>, store: Arc<dyn DedupStore>) -> Self {
        Self {
            mailbox,
            store,
            templates: TemplateRegistry::builtin(),
            config: PipelineConfig::default(),
        }
    }

    /// Replaces the template registry.
    #[must_use]
    pub fn with_templates(mut self, templates: TemplateRegistry) -> Self {
        self.templates = templates;
        self
    }

    /// Replaces the pipeline settings.
    #[must_use]
    pub const fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs one poll cycle.
    ///
    /// Never fails: fetch and store failures end the cycle early and are
    /// reported in [`CycleReport::aborted`].
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        let messages = match self.mailbox.list_unread(self.config.fetch_limit).await {
            Ok(messages) => messages,
            Err(e) => {
                let err = Error::Fetch(e);
                error!("Cycle aborted: {err}");
                report.aborted = Some(err);
                return report;
            }
        };
        report.fetched = messages.len();

        for message in &messages {
            match self.process(message).await {
                Ok(outcome) => report.tally(outcome),
                Err(err) => {
                    error!(message_id = %message.id, "Cycle aborted: {err}");
                    report.aborted = Some(err);
                    break;
                }
            }
        }

        info!(
            fetched = report.fetched,
            ingested = report.ingested,
            already_recorded = report.already_recorded,
            duplicates = report.duplicates,
            not_candidate = report.not_candidate,
            extraction_failed = report.extraction_failed,
            ack_failed = report.ack_failed,
            aborted = report.is_aborted(),
            "Cycle finished"
        );
        report
    }

    /// Handles one message. Only a store failure is returned as an error.
    async fn process(&self, message: &RawMessage) -> Result<MessageOutcome> {
        let Some(template) = self.templates.select(&message.subject) else {
            debug!(message_id = %message.id, "Subject matches no template");
            return Ok(MessageOutcome::NotCandidate);
        };

        if self.store.exists(&message.id).await? {
            debug!(message_id = %message.id, "Already recorded, skipping");
            return Ok(MessageOutcome::AlreadyRecorded);
        }

        let notification = match template.parse(&message.plain_text()) {
            Ok(notification) => notification,
            Err(e) => {
                let err = Error::Extraction(e);
                warn!(message_id = %message.id, template = template.name(), "{err}");
                return Ok(MessageOutcome::ExtractionFailed);
            }
        };

        let record = IngestionRecord::new(message, notification);
        let inserted = match self.store.record_if_absent(&record).await? {
            RecordOutcome::Inserted => {
                debug!(
                    message_id = %message.id,
                    amount = %record.notification.transaction.amount,
                    "Recorded notification"
                );
                true
            }
            RecordOutcome::AlreadyExists => {
                info!(message_id = %message.id, "Recorded by an overlapping cycle");
                false
            }
        };

        let acknowledged = match self.mailbox.mark_read(&message.id).await {
            Ok(()) => true,
            Err(source) => {
                let err = Error::Acknowledge {
                    id: message.id.clone(),
                    source,
                };
                warn!(message_id = %message.id, "{err}");
                false
            }
        };

        Ok(if inserted {
            MessageOutcome::Ingested { acknowledged }
        } else {
            MessageOutcome::Duplicate { acknowledged }
        })
    }
}

impl std::fmt::Debug for IngestionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionPipeline")
            .field("templates", &self.templates)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
