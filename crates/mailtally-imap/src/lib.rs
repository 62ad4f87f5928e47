//! # mailtally-imap
//!
//! The IMAP side of mailbox statistics: response decoders, the folder flag
//! policy, and a minimal read-only session.
//!
//! ## Features
//!
//! - **Sans-I/O decoders**: LIST entries, FETCH attribute blocks, QUOTA
//!   responses and line classification, each a pure function from bytes to
//!   a typed record or a [`DecodeError`]
//! - **Modified UTF-7**: folder names decoded for display, raw names kept
//!   for commands
//! - **Flag policy**: decides which folders are scanned (`\Noselect`,
//!   `\NonExistent` and the virtual `\All`/`\Important` views are not)
//! - **Read-only session**: CAPABILITY, LOGIN, LIST, EXAMINE, SEARCH, FETCH,
//!   GETQUOTAROOT over TLS via rustls, with connect and I/O timeouts
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailtally_imap::{Config, FolderFlagPolicy, ImapSession, ProtocolClient, Security};
//! use mailtally_imap::parser::decode_folder_entry;
//!
//! #[tokio::main]
//! async fn main() -> mailtally_imap::Result<()> {
//!     let config = Config::builder("imap.example.com").security(Security::Implicit).build();
//!     let mut session = ImapSession::connect(&config).await?;
//!     session.login("user@example.com", "password").await?;
//!
//!     let policy = FolderFlagPolicy::default();
//!     for raw in session.list_folders().await? {
//!         let entry = decode_folder_entry(&raw)?;
//!         if policy.classify(&entry.flags).selectable {
//!             let selection = session.select(&entry.name, true).await?;
//!             println!("{}: {}", entry.display_name()?, selection.exists);
//!         }
//!     }
//!
//!     session.logout().await
//! }
//! ```
//!
//! ## Modules
//!
//! - [`command`]: the commands a scan sends
//! - [`connection`]: configuration, transport, framing and the session
//! - [`mutf7`]: modified UTF-7 folder names
//! - [`parser`]: response decoders
//! - [`policy`]: folder exclusion rules
//! - [`types`]: flags, folder entries, sequence sets, status

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
pub mod command;
pub mod connection;
mod error;
pub mod mutf7;
pub mod parser;
pub mod policy;
pub mod types;

pub use client::{ProtocolClient, Selection};
pub use command::{Command, FetchAttribute, FetchItems, TagGenerator};
pub use connection::{
    Completion, Config, ConfigBuilder, FramedStream, ImapSession, ImapStream, Security,
};
pub use error::{DecodeError, DecodeResult, Error, Result};
pub use parser::{Field, FieldIssue, MessageAttributes, QuotaInfo};
pub use policy::{FlagClassification, FolderFlagPolicy};
pub use types::{Flag, Flags, FolderEntry, FolderFlag, FolderFlags, SeqNum, SequenceSet, Status};
