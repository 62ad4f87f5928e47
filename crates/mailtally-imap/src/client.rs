//! The protocol operations a statistics scan needs.
//!
//! Scanning code is generic over [`ProtocolClient`] so it can run against a
//! live [`ImapSession`](crate::connection::ImapSession) or an in-memory fake.

use crate::command::FetchItems;
use crate::types::{SequenceSet, Status};
use crate::Result;

/// Outcome of selecting a mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Completion status of the SELECT/EXAMINE command.
    pub status: Status,
    /// Message count from the `EXISTS` response, 0 when absent.
    pub exists: u32,
    /// Completion text, useful when the status is not OK.
    pub text: String,
}

impl Selection {
    /// Successful selection with the given message count.
    #[must_use]
    pub fn ok(exists: u32) -> Self {
        Self {
            status: Status::Ok,
            exists,
            text: String::new(),
        }
    }

    /// Failed selection.
    #[must_use]
    pub fn failed(status: Status, text: impl Into<String>) -> Self {
        Self {
            status,
            exists: 0,
            text: text.into(),
        }
    }

    /// Returns true if the mailbox is now selected.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

/// Read-only IMAP operations, awaited one at a time.
///
/// Raw responses are returned undecoded; decoding is the caller's job so a
/// malformed line degrades one record instead of failing the command.
#[allow(async_fn_in_trait)]
pub trait ProtocolClient {
    /// Returns the server's capabilities, upper-cased.
    async fn capabilities(&mut self) -> Result<Vec<String>>;

    /// Lists every folder; one raw `LIST` response per folder.
    async fn list_folders(&mut self) -> Result<Vec<Vec<u8>>>;

    /// Selects a mailbox by its raw name. A `NO`/`BAD` completion is
    /// reported through [`Selection::status`], not as an error.
    async fn select(&mut self, mailbox: &str, read_only: bool) -> Result<Selection>;

    /// Returns the message numbers matched by `SEARCH ALL`.
    async fn search_all(&mut self) -> Result<Vec<u32>>;

    /// Fetches a range in one command; one raw `FETCH` response per message.
    async fn fetch_range(&mut self, set: &SequenceSet, items: &FetchItems) -> Result<Vec<Vec<u8>>>;

    /// Returns the raw `QUOTA` response for the mailbox's quota root.
    async fn get_quota_root(&mut self, mailbox: &str) -> Result<Vec<u8>>;
}
