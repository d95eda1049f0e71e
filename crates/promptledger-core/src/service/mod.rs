//! Mailbox access.

mod graph;
mod mailbox;

pub use graph::GraphMailbox;
pub use mailbox::{Mailbox, MailboxError};
