//! The parsed message.

use chrono::{DateTime, Utc};

use super::attachment::Attachment;

/// One email, parsed from exactly one container file.
///
/// Header fields the container does not carry, or that could not be
/// resolved, are `None`. The message is not modified after parsing.
#[derive(Debug, Clone, Default)]
pub struct Message {
    /// Decoded subject line.
    pub subject: Option<String>,

    /// Rendered sender mailbox.
    pub sender: Option<String>,

    /// Rendered primary recipients (`To`), comma-separated.
    pub recipients: Option<String>,

    /// Sent date normalised to UTC.
    pub date: Option<DateTime<Utc>>,

    /// Plain-text body; empty when the message has none.
    pub body: String,

    /// Attachments in the order the container yields them.
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// `true` if the message carries at least one named attachment.
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}
