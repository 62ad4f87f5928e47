//! QUOTA response decoding (RFC 9208).

use serde::Serialize;

use crate::error::DecodeResult;
use crate::parser::lexer::{Lexer, Token};

use super::payload;

/// Storage usage of a quota root, in KiB (1024-octet units).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaInfo {
    /// Storage in use.
    pub used_kib: u64,
    /// Storage limit.
    pub total_kib: u64,
}

/// Decodes `<root> (STORAGE <used> <limit> ...)`.
///
/// Only the `STORAGE` resource is kept; other resources in the list are
/// skipped.
///
/// # Errors
///
/// Returns an error when the resource list is malformed or has no
/// `STORAGE` entry.
pub fn decode_quota(raw: &[u8]) -> DecodeResult<QuotaInfo> {
    let mut lexer = Lexer::new(payload(raw, "QUOTA"));
    decode(&mut lexer).map_err(|e| e.within("QUOTA response"))
}

fn decode(lexer: &mut Lexer<'_>) -> DecodeResult<QuotaInfo> {
    lexer.skip_spaces();
    let _root = lexer.read_astring()?;
    lexer.expect_spaces()?;
    lexer.expect(Token::LParen)?;

    let mut storage = None;
    loop {
        lexer.skip_spaces();
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Atom(resource) => {
                lexer.expect_spaces()?;
                let used = lexer.read_number()?;
                lexer.expect_spaces()?;
                let limit = lexer.read_number()?;
                if resource.eq_ignore_ascii_case("STORAGE") {
                    storage = Some(QuotaInfo {
                        used_kib: used,
                        total_kib: limit,
                    });
                }
            }
            token => return Err(lexer.error(&format!("expected resource name, got {token:?}"))),
        }
    }

    storage.ok_or_else(|| lexer.error("no STORAGE resource"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn storage_only() {
        let quota = decode_quota(br#""" (STORAGE 204800 1048576)"#).unwrap();
        assert_eq!(
            quota,
            QuotaInfo {
                used_kib: 204_800,
                total_kib: 1_048_576
            }
        );
    }

    #[test]
    fn full_line_with_atom_root() {
        let quota = decode_quota(b"* QUOTA INBOX (STORAGE 10 512)\r\n").unwrap();
        assert_eq!(quota.used_kib, 10);
        assert_eq!(quota.total_kib, 512);
    }

    #[test]
    fn other_resources_are_skipped() {
        let quota = decode_quota(br#""User quota" (MESSAGE 12 1000 STORAGE 300 900)"#).unwrap();
        assert_eq!(quota.used_kib, 300);
        assert_eq!(quota.total_kib, 900);
    }

    #[test]
    fn missing_storage_fails() {
        let err = decode_quota(br#""" (MESSAGE 12 1000)"#).unwrap_err();
        assert_eq!(err.context, "QUOTA response");
    }

    #[test]
    fn malformed_lists_fail() {
        assert!(decode_quota(br#""" STORAGE 1 2"#).is_err());
        assert!(decode_quota(br#""" (STORAGE 1)"#).is_err());
        assert!(decode_quota(br#""" (STORAGE 1 2"#).is_err());
        assert!(decode_quota(br#""" (STORAGE many 2)"#).is_err());
    }
}
