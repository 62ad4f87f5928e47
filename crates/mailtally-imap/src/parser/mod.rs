//! IMAP response decoding.
//!
//! Sans-I/O decoders that turn raw response fragments into typed records.
//! Response lines are not a fully regular grammar (quoting and escaping vary
//! between servers), so every decoder works in two stages:
//!
//! - **Structural**: a permissive match of the outer shape (flag list,
//!   delimiter, name; message number plus parenthesized attributes; quota
//!   root plus resource list). Failure here is a [`DecodeError`].
//! - **Field extraction**: strict parsing of each inner value. Where a field
//!   is optional, a bad value degrades only that field.
//!
//! Every decoder accepts the fragment with or without its `* KEYWORD `
//! prefix and trailing CRLF.
//!
//! # Example
//!
//! ```
//! use mailtally_imap::parser::decode_folder_entry;
//!
//! let entry = decode_folder_entry(br#"(\HasNoChildren) "/" INBOX"#).unwrap();
//! assert_eq!(entry.name, "INBOX");
//! assert_eq!(entry.delimiter, Some('/'));
//! ```
//!
//! [`DecodeError`]: crate::DecodeError

pub mod lexer;

mod folder;
mod line;
mod message;
mod quota;

pub use folder::decode_folder_entry;
pub use lexer::{Lexer, Token};
pub use line::{ServerLine, classify_line, decode_capabilities, decode_exists, decode_search};
pub use message::{Field, FieldIssue, MessageAttributes, decode_message_attributes};
pub use quota::{QuotaInfo, decode_quota};

/// Strips an optional `* ` + `keyword` prefix and the trailing line ending.
pub(crate) fn payload<'a>(raw: &'a [u8], keyword: &str) -> &'a [u8] {
    let mut input = trim_line_end(raw);

    if let Some(rest) = input.strip_prefix(b"* ") {
        input = rest;
    }
    let trimmed = input.trim_ascii_start();
    if trimmed.len() > keyword.len()
        && trimmed[..keyword.len()].eq_ignore_ascii_case(keyword.as_bytes())
        && matches!(trimmed[keyword.len()], b' ' | b'\t')
    {
        input = &trimmed[keyword.len()..];
    }
    input
}

/// Removes trailing CR/LF bytes.
pub(crate) fn trim_line_end(raw: &[u8]) -> &[u8] {
    let mut end = raw.len();
    while end > 0 && matches!(raw[end - 1], b'\r' | b'\n') {
        end -= 1;
    }
    &raw[..end]
}
