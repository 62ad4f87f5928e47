//! LIST entry decoding.

use crate::error::DecodeResult;
use crate::parser::lexer::{Lexer, Token};
use crate::types::{FolderEntry, FolderFlag, FolderFlags};

use super::payload;

/// Decodes one LIST entry: `(<flags>) "<delimiter>" <name>`.
///
/// The name may be quoted, a literal, or a bare run of text that can itself
/// contain whitespace (some servers do not quote names with spaces).
///
/// # Errors
///
/// Returns an error when the entry does not have the flags / delimiter /
/// name shape. Unknown flags are kept, never rejected.
pub fn decode_folder_entry(raw: &[u8]) -> DecodeResult<FolderEntry> {
    let input = payload(raw, "LIST");
    let mut lexer = Lexer::new(input);

    decode(&mut lexer).map_err(|e| e.within("LIST entry"))
}

fn decode(lexer: &mut Lexer<'_>) -> DecodeResult<FolderEntry> {
    lexer.skip_spaces();
    let flags = read_flag_list(lexer)?;

    lexer.skip_spaces();
    let delimiter = match lexer.next_token()? {
        Token::Nil => None,
        Token::QuotedString(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => return Err(lexer.error(&format!("delimiter must be one character: {s:?}"))),
            }
        }
        Token::Atom(s) if s.chars().count() == 1 => s.chars().next(),
        token => return Err(lexer.error(&format!("expected delimiter, got {token:?}"))),
    };

    lexer.expect_spaces()?;
    let name = read_name(lexer)?;

    Ok(FolderEntry {
        name,
        delimiter,
        flags,
    })
}

fn read_flag_list(lexer: &mut Lexer<'_>) -> DecodeResult<FolderFlags> {
    lexer.expect(Token::LParen)?;

    let mut flags = FolderFlags::new();
    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Space => {}
            Token::Atom(s) => flags.insert(FolderFlag::parse(s)),
            Token::Eof | Token::Crlf => return Err(lexer.error("unterminated flag list")),
            token => return Err(lexer.error(&format!("unexpected {token:?} in flag list"))),
        }
    }

    Ok(flags)
}

fn read_name(lexer: &mut Lexer<'_>) -> DecodeResult<String> {
    if matches!(lexer.peek(), Some(b'"' | b'{')) {
        let name = lexer.read_astring()?;
        if !lexer.at_line_end() {
            return Err(lexer.error("unexpected data after folder name"));
        }
        return Ok(name);
    }

    let bare = lexer.remaining().trim_ascii();
    if bare.is_empty() {
        return Err(lexer.error("missing folder name"));
    }
    let name = std::str::from_utf8(bare).map_err(|_| lexer.error("invalid UTF-8 in folder name"))?;
    lexer.skip(lexer.remaining().len());
    Ok(name.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn inbox() {
        let entry = decode_folder_entry(br#"(\HasNoChildren) "/" INBOX"#).unwrap();
        assert_eq!(entry.name, "INBOX");
        assert_eq!(entry.delimiter, Some('/'));
        assert_eq!(entry.flags.len(), 1);
        assert!(entry.flags.contains(&FolderFlag::HasNoChildren));
    }

    #[test]
    fn full_untagged_line() {
        let entry =
            decode_folder_entry(b"* LIST (\\HasChildren \\Noselect) \".\" \"[Gmail]\"\r\n")
                .unwrap();
        assert_eq!(entry.name, "[Gmail]");
        assert_eq!(entry.delimiter, Some('.'));
        assert!(entry.flags.contains(&FolderFlag::NoSelect));
    }

    #[test]
    fn bare_name_with_brackets() {
        let entry = decode_folder_entry(br#"(\Noselect \HasChildren) "/" [Gmail]"#).unwrap();
        assert_eq!(entry.name, "[Gmail]");
    }

    #[test]
    fn bare_name_with_spaces() {
        let entry =
            decode_folder_entry(b"(\\HasNoChildren) \"/\" Old   Projects 2019 \r\n").unwrap();
        assert_eq!(entry.name, "Old   Projects 2019");
    }

    #[test]
    fn quoted_name_with_escapes() {
        let entry = decode_folder_entry(br#"() "/" "Say \"hi\"""#).unwrap();
        assert_eq!(entry.name, "Say \"hi\"");
        assert!(entry.flags.is_empty());
    }

    #[test]
    fn literal_name() {
        let entry = decode_folder_entry(b"(\\HasNoChildren) \"/\" {7}\r\nA \"B\" C\r\n").unwrap();
        assert_eq!(entry.name, "A \"B\" C");
    }

    #[test]
    fn nil_delimiter() {
        let entry = decode_folder_entry(br#"(\HasNoChildren) NIL Notes"#).unwrap();
        assert_eq!(entry.delimiter, None);
        assert_eq!(entry.name, "Notes");
    }

    #[test]
    fn unknown_flags_are_kept() {
        let entry = decode_folder_entry(br#"(\HasNoChildren \XFancy $Label) "/" Work"#).unwrap();
        assert_eq!(entry.flags.unknown().collect::<Vec<_>>(), vec!["\\XFancy", "$Label"]);
    }

    #[test]
    fn missing_flag_list_fails() {
        let err = decode_folder_entry(br#""/" INBOX"#).unwrap_err();
        assert_eq!(err.context, "LIST entry");
    }

    #[test]
    fn unterminated_flag_list_fails() {
        assert!(decode_folder_entry(br#"(\HasNoChildren "/" INBOX"#).is_err());
    }

    #[test]
    fn missing_name_fails() {
        assert!(decode_folder_entry(br#"(\HasNoChildren) "/"   "#).is_err());
        assert!(decode_folder_entry(br#"(\HasNoChildren) "/""#).is_err());
    }

    #[test]
    fn long_delimiter_fails() {
        assert!(decode_folder_entry(br#"() "//" INBOX"#).is_err());
    }

    #[test]
    fn trailing_data_after_quoted_name_fails() {
        assert!(decode_folder_entry(br#"() "/" "INBOX" extra"#).is_err());
    }

    #[test]
    fn decoding_twice_is_identical() {
        let raw = br#"(\HasChildren \Custom) "/" "Projects/2024""#;
        assert_eq!(
            decode_folder_entry(raw).unwrap(),
            decode_folder_entry(raw).unwrap()
        );
    }
}
