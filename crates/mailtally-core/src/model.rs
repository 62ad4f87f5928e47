//! Records produced by a scan.

use chrono::{DateTime, FixedOffset};
use mailtally_imap::{Flags, MessageAttributes};
use serde::Serialize;

/// One message's statistics-relevant attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    /// Message sequence number within the folder.
    pub sequence_id: u32,
    /// UID, when the server returned one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<u32>,
    /// Decoded folder name.
    pub folder: String,
    /// Folder name as sent by the server, for follow-up commands.
    pub mailbox: String,
    /// `RFC822.SIZE`, absent when the server omitted or mangled it.
    pub size_bytes: Option<u64>,
    /// Internal date, absent when it could not be decoded.
    pub internal_date: Option<DateTime<FixedOffset>>,
    /// Message flags.
    pub flags: Flags,
}

impl MessageRecord {
    /// Builds a record from decoded FETCH attributes.
    #[must_use]
    pub fn from_attributes(attrs: MessageAttributes, folder: &str, mailbox: &str) -> Self {
        Self {
            sequence_id: attrs.sequence_id,
            uid: attrs.uid,
            folder: folder.to_string(),
            mailbox: mailbox.to_string(),
            size_bytes: attrs.size,
            internal_date: attrs.internal_date,
            flags: attrs.flags,
        }
    }

    /// Unread means no `\Seen` flag.
    #[must_use]
    pub fn is_unread(&self) -> bool {
        !self.flags.is_seen()
    }
}

/// Statistics for one folder.
///
/// Folders that were excluded, failed, or hold no messages still get a
/// report; its counters are simply zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderReport {
    /// Decoded folder name.
    pub name: String,
    /// Folder name as sent by the server.
    pub mailbox: String,
    /// Message count the server reported on select.
    pub exists: u32,
    /// Number of decoded message records.
    pub message_count: u64,
    /// Records without `\Seen`.
    pub unread_count: u64,
    /// Sum of known sizes.
    pub total_size_bytes: u64,
    /// The records themselves.
    #[serde(skip)]
    pub messages: Vec<MessageRecord>,
}

impl FolderReport {
    /// Zero report for a folder.
    #[must_use]
    pub fn empty(name: impl Into<String>, mailbox: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mailbox: mailbox.into(),
            exists: 0,
            message_count: 0,
            unread_count: 0,
            total_size_bytes: 0,
            messages: Vec::new(),
        }
    }

    /// Adds a record and updates the counters.
    pub fn push(&mut self, record: MessageRecord) {
        self.message_count += 1;
        if record.is_unread() {
            self.unread_count += 1;
        }
        self.total_size_bytes += record.size_bytes.unwrap_or(0);
        self.messages.push(record);
    }
}
