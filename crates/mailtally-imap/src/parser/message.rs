//! FETCH attribute block decoding.

use chrono::{DateTime, FixedOffset};

use crate::error::DecodeResult;
use crate::parser::lexer::{Lexer, Token};
use crate::types::{Flag, Flags};

use super::trim_line_end;

/// INTERNALDATE layout, e.g. `17-Jul-1996 02:44:25 -0700`.
const INTERNAL_DATE_FORMAT: &str = "%d-%b-%Y %H:%M:%S %z";

/// Attribute that can degrade without failing the whole block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// `RFC822.SIZE`.
    Size,
    /// `INTERNALDATE`.
    InternalDate,
    /// `FLAGS`.
    Flags,
    /// `UID`.
    Uid,
}

impl Field {
    /// Returns the FETCH item name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Size => "RFC822.SIZE",
            Self::InternalDate => "INTERNALDATE",
            Self::Flags => "FLAGS",
            Self::Uid => "UID",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field that was missing or could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Affected field.
    pub field: Field,
    /// What was wrong with it.
    pub problem: String,
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.problem)
    }
}

/// Lightweight per-message attributes from one FETCH block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageAttributes {
    /// Message sequence number.
    pub sequence_id: u32,
    /// UID, when requested.
    pub uid: Option<u32>,
    /// `RFC822.SIZE` in bytes.
    pub size: Option<u64>,
    /// `INTERNALDATE`.
    pub internal_date: Option<DateTime<FixedOffset>>,
    /// Message flags.
    pub flags: Flags,
    /// Fields that were missing or malformed. `UID` is only reported when
    /// present but malformed.
    pub issues: Vec<FieldIssue>,
}

impl MessageAttributes {
    /// Returns the issue recorded for a field, if any.
    #[must_use]
    pub fn issue(&self, field: Field) -> Option<&FieldIssue> {
        self.issues.iter().find(|i| i.field == field)
    }

    fn note(&mut self, field: Field, problem: String) {
        self.issues.push(FieldIssue { field, problem });
    }
}

/// Decodes one FETCH block: `<id> (<item> <value> ...)`.
///
/// The `* ` prefix and the `FETCH` keyword are optional. The message number
/// is the only mandatory part; size, date and flags degrade to absent or
/// empty (with an entry in [`MessageAttributes::issues`]) when missing or
/// malformed.
///
/// # Errors
///
/// Returns an error when the message number or the parenthesized item list
/// cannot be found.
pub fn decode_message_attributes(raw: &[u8]) -> DecodeResult<MessageAttributes> {
    let (sequence_id, items) = split_block(raw).map_err(|e| e.within("FETCH block"))?;

    let mut attrs = MessageAttributes {
        sequence_id,
        uid: None,
        size: None,
        internal_date: None,
        flags: Flags::new(),
        issues: Vec::new(),
    };

    let keys = top_level_keys(items);
    let value_of = |name: &str| {
        keys.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|&(_, offset)| &items[offset..])
    };

    match value_of("RFC822.SIZE").map(read_size) {
        Some(Ok(size)) => attrs.size = Some(size),
        Some(Err(problem)) => attrs.note(Field::Size, problem),
        None => attrs.note(Field::Size, "missing".to_string()),
    }

    match value_of("INTERNALDATE").map(read_internal_date) {
        Some(Ok(date)) => attrs.internal_date = Some(date),
        Some(Err(problem)) => attrs.note(Field::InternalDate, problem),
        None => attrs.note(Field::InternalDate, "missing".to_string()),
    }

    match value_of("FLAGS").map(read_flags) {
        Some(Ok(flags)) => attrs.flags = flags,
        Some(Err(problem)) => attrs.note(Field::Flags, problem),
        None => attrs.note(Field::Flags, "missing".to_string()),
    }

    match value_of("UID").map(read_uid) {
        Some(Ok(uid)) => attrs.uid = Some(uid),
        Some(Err(problem)) => attrs.note(Field::Uid, problem),
        None => {}
    }

    Ok(attrs)
}

/// Structural stage: message number and the bytes inside the outer parens.
fn split_block(raw: &[u8]) -> DecodeResult<(u32, &[u8])> {
    let mut input = trim_line_end(raw).trim_ascii();
    if let Some(rest) = input.strip_prefix(b"*") {
        input = rest.trim_ascii_start();
    }

    let mut lexer = Lexer::new(input);
    let sequence_id = match lexer.next_token()? {
        Token::Number(n) => u32::try_from(n)
            .ok()
            .filter(|&n| n != 0)
            .ok_or_else(|| lexer.error(&format!("invalid message number {n}")))?,
        token => return Err(lexer.error(&format!("expected message number, got {token:?}"))),
    };

    lexer.skip_spaces();
    if lexer.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
        let keyword = lexer.read_atom_string()?;
        if !keyword.eq_ignore_ascii_case("FETCH") {
            return Err(lexer.error(&format!("expected FETCH, got {keyword}")));
        }
        lexer.skip_spaces();
    }

    if lexer.peek() != Some(b'(') {
        return Err(lexer.error("expected '(' opening the attribute list"));
    }
    let body = lexer.remaining();
    if body.len() < 2 || !body.ends_with(b")") {
        return Err(lexer.error("unterminated attribute list"));
    }

    Ok((sequence_id, &body[1..body.len() - 1]))
}

/// Finds the item names at nesting depth zero and the offset just past each.
///
/// Lexer errors (a stray quote, bad UTF-8) skip one byte and carry on, so a
/// damaged value only hides the items it overlaps.
fn top_level_keys(items: &[u8]) -> Vec<(String, usize)> {
    let mut lexer = Lexer::new(items);
    let mut depth = 0usize;
    let mut keys = Vec::new();

    loop {
        match lexer.next_token() {
            Ok(Token::Eof) => break,
            Ok(Token::LParen | Token::LBracket) => depth += 1,
            Ok(Token::RParen | Token::RBracket) => depth = depth.saturating_sub(1),
            Ok(Token::Atom(name)) if depth == 0 => keys.push((name.to_string(), lexer.position())),
            Ok(_) => {}
            Err(_) => lexer.skip(1),
        }
    }

    keys
}

fn read_size(value: &[u8]) -> Result<u64, String> {
    let mut lexer = Lexer::new(value);
    lexer.skip_spaces();
    lexer.read_number().map_err(|e| e.message)
}

fn read_uid(value: &[u8]) -> Result<u32, String> {
    let n = read_size(value)?;
    u32::try_from(n)
        .ok()
        .filter(|&n| n != 0)
        .ok_or_else(|| format!("invalid UID {n}"))
}

fn read_internal_date(value: &[u8]) -> Result<DateTime<FixedOffset>, String> {
    let mut lexer = Lexer::new(value);
    lexer.skip_spaces();
    match lexer.next_token() {
        Ok(Token::QuotedString(s)) => parse_internal_date(&s),
        Ok(token) => Err(format!("expected quoted date, got {token:?}")),
        Err(e) => Err(e.message),
    }
}

/// Parses an INTERNALDATE string; the day may be space padded.
fn parse_internal_date(s: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_str(s.trim(), INTERNAL_DATE_FORMAT)
        .map_err(|e| format!("cannot parse {s:?}: {e}"))
}

fn read_flags(value: &[u8]) -> Result<Flags, String> {
    let mut lexer = Lexer::new(value);
    lexer.skip_spaces();
    lexer.expect(Token::LParen).map_err(|e| e.message)?;

    let mut flags = Flags::new();
    loop {
        match lexer.next_token() {
            Ok(Token::RParen) => return Ok(flags),
            Ok(Token::Space) => {}
            Ok(Token::Atom(s)) => flags.insert(Flag::parse(s)),
            Ok(Token::Eof) => return Err("unterminated flag list".to_string()),
            Ok(token) => return Err(format!("unexpected {token:?} in flag list")),
            Err(e) => return Err(e.message),
        }
    }
}
