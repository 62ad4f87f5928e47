//! IMAP commands.
//!
//! Only the read-only subset needed to gather mailbox statistics.

mod serialize;
mod tag_generator;
mod types;

use crate::types::SequenceSet;

pub use tag_generator::TagGenerator;
pub use types::{FetchAttribute, FetchItems};

pub(crate) use serialize::needs_literal;
use serialize::{write_astring, write_fetch_items};

/// IMAP command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// CAPABILITY command.
    Capability,
    /// STARTTLS command.
    StartTls,
    /// LOGIN command.
    Login {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
    /// LIST command.
    List {
        /// Reference name.
        reference: String,
        /// Mailbox pattern.
        pattern: String,
    },
    /// EXAMINE command (read-only SELECT).
    Examine {
        /// Raw mailbox name.
        mailbox: String,
    },
    /// SELECT command.
    Select {
        /// Raw mailbox name.
        mailbox: String,
    },
    /// `SEARCH ALL`.
    SearchAll,
    /// FETCH command.
    Fetch {
        /// Messages to fetch.
        sequence: SequenceSet,
        /// Items to fetch.
        items: FetchItems,
    },
    /// GETQUOTAROOT command (RFC 9208).
    GetQuotaRoot {
        /// Raw mailbox name.
        mailbox: String,
    },
    /// LOGOUT command.
    Logout,
}

impl Command {
    /// Returns the command name, for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Capability => "CAPABILITY",
            Self::StartTls => "STARTTLS",
            Self::Login { .. } => "LOGIN",
            Self::List { .. } => "LIST",
            Self::Examine { .. } => "EXAMINE",
            Self::Select { .. } => "SELECT",
            Self::SearchAll => "SEARCH",
            Self::Fetch { .. } => "FETCH",
            Self::GetQuotaRoot { .. } => "GETQUOTAROOT",
            Self::Logout => "LOGOUT",
        }
    }

    /// Serializes the command to bytes with the given tag.
    #[must_use]
    pub fn serialize(&self, tag: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(tag.as_bytes());
        buf.push(b' ');

        match self {
            Self::Capability | Self::StartTls | Self::Logout => {
                buf.extend_from_slice(self.name().as_bytes());
            }

            Self::Login { username, password } => {
                buf.extend_from_slice(b"LOGIN ");
                write_astring(&mut buf, username);
                buf.push(b' ');
                write_astring(&mut buf, password);
            }

            Self::List { reference, pattern } => {
                buf.extend_from_slice(b"LIST ");
                write_astring(&mut buf, reference);
                buf.push(b' ');
                write_astring(&mut buf, pattern);
            }

            Self::Examine { mailbox }
            | Self::Select { mailbox }
            | Self::GetQuotaRoot { mailbox } => {
                buf.extend_from_slice(self.name().as_bytes());
                buf.push(b' ');
                write_astring(&mut buf, mailbox);
            }

            Self::SearchAll => buf.extend_from_slice(b"SEARCH ALL"),

            Self::Fetch { sequence, items } => {
                buf.extend_from_slice(format!("FETCH {sequence} ").as_bytes());
                write_fetch_items(&mut buf, items);
            }
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }

    /// Returns the serialized command with credentials masked, for trace logs.
    #[must_use]
    pub fn redacted(&self, tag: &str) -> String {
        match self {
            Self::Login { username, .. } => {
                let mut buf = format!("{tag} LOGIN ").into_bytes();
                write_astring(&mut buf, username);
                buf.extend_from_slice(b" ****");
                String::from_utf8_lossy(&buf).into_owned()
            }
            _ => String::from_utf8_lossy(&self.serialize(tag)).trim_end().to_string(),
        }
    }
}
