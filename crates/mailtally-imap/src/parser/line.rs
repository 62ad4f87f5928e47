//! Response line classification and the small untagged payloads.

use crate::error::DecodeResult;
use crate::parser::lexer::{Lexer, Token};
use crate::types::Status;

use super::{payload, trim_line_end};

/// One complete server response, as framed off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerLine<'a> {
    /// Command completion: `<tag> OK|NO|BAD <text>`.
    Tagged {
        /// Tag of the completed command.
        tag: &'a str,
        /// Completion status.
        status: Status,
        /// Human-readable text, response code included.
        text: String,
    },
    /// Server data: `* ...`.
    Untagged {
        /// Response keyword in upper case (`LIST`, `EXISTS`, `FETCH`, ...).
        keyword: String,
        /// Everything after `* `, without the line ending.
        data: &'a [u8],
    },
    /// Continuation request: `+ <text>`.
    Continuation(String),
}

/// Classifies a response by its first token.
///
/// # Errors
///
/// Returns an error when the line is neither tagged, untagged nor a
/// continuation, or when a tagged line has no valid status.
pub fn classify_line(raw: &[u8]) -> DecodeResult<ServerLine<'_>> {
    let line = trim_line_end(raw);

    if let Some(rest) = line.strip_prefix(b"+") {
        let text = String::from_utf8_lossy(rest.trim_ascii()).into_owned();
        return Ok(ServerLine::Continuation(text));
    }

    if let Some(data) = line.strip_prefix(b"* ") {
        let keyword = untagged_keyword(data).map_err(|e| e.within("untagged response"))?;
        return Ok(ServerLine::Untagged { keyword, data });
    }

    tagged(line).map_err(|e| e.within("tagged response"))
}

fn untagged_keyword(data: &[u8]) -> DecodeResult<String> {
    let mut lexer = Lexer::new(data);
    match lexer.next_token()? {
        Token::Atom(keyword) => Ok(keyword.to_ascii_uppercase()),
        Token::Number(_) => {
            lexer.expect_spaces()?;
            Ok(lexer.read_atom_string()?.to_ascii_uppercase())
        }
        token => Err(lexer.error(&format!("expected keyword, got {token:?}"))),
    }
}

fn tagged(line: &[u8]) -> DecodeResult<ServerLine<'_>> {
    let mut lexer = Lexer::new(line);
    let tag = match lexer.next_token()? {
        Token::Atom(tag) => tag,
        token => return Err(lexer.error(&format!("expected tag, got {token:?}"))),
    };
    lexer.expect_spaces()?;

    let word = lexer.read_atom_string()?;
    let status = Status::parse(word).ok_or_else(|| lexer.error(&format!("unknown status {word}")))?;

    let text = String::from_utf8_lossy(lexer.remaining().trim_ascii()).into_owned();
    Ok(ServerLine::Tagged { tag, status, text })
}

/// Decodes `<n> EXISTS`, returning `None` for any other response.
#[must_use]
pub fn decode_exists(data: &[u8]) -> Option<u32> {
    let line = trim_line_end(data);
    let mut lexer = Lexer::new(line.strip_prefix(b"* ").unwrap_or(line));
    let Ok(Token::Number(n)) = lexer.next_token() else {
        return None;
    };
    lexer.expect_spaces().ok()?;
    let keyword = lexer.read_atom_string().ok()?;
    if !keyword.eq_ignore_ascii_case("EXISTS") {
        return None;
    }
    u32::try_from(n).ok()
}

/// Decodes `SEARCH <n>...` into message numbers.
///
/// # Errors
///
/// Returns an error when a result is not a non-zero number.
pub fn decode_search(data: &[u8]) -> DecodeResult<Vec<u32>> {
    let mut input = trim_line_end(data).trim_ascii();
    if let Some(rest) = input.strip_prefix(b"*") {
        input = rest.trim_ascii_start();
    }

    let mut lexer = Lexer::new(input);
    if lexer.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
        let keyword = lexer.read_atom_string().map_err(|e| e.within("SEARCH response"))?;
        if !keyword.eq_ignore_ascii_case("SEARCH") {
            return Err(
                lexer.error(&format!("expected SEARCH, got {keyword}")).within("SEARCH response")
            );
        }
    }

    let mut ids = Vec::new();
    loop {
        lexer.skip_spaces();
        match lexer.next_token().map_err(|e| e.within("SEARCH response"))? {
            Token::Eof => break,
            Token::Number(n) => {
                let id = u32::try_from(n)
                    .ok()
                    .filter(|&n| n != 0)
                    .ok_or_else(|| {
                        lexer
                            .error(&format!("invalid message number {n}"))
                            .within("SEARCH response")
                    })?;
                ids.push(id);
            }
            token => {
                return Err(lexer
                    .error(&format!("unexpected {token:?} in result list"))
                    .within("SEARCH response"));
            }
        }
    }

    Ok(ids)
}

/// Decodes `CAPABILITY <cap>...` into upper-cased capability names.
#[must_use]
pub fn decode_capabilities(data: &[u8]) -> Vec<String> {
    let input = payload(data, "CAPABILITY");
    input
        .split(u8::is_ascii_whitespace)
        .filter(|word| !word.is_empty())
        .map(|word| String::from_utf8_lossy(word).to_ascii_uppercase())
        .collect()
}
