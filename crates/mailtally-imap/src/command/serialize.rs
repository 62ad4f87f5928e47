//! Command serialization helpers.

use super::types::FetchItems;

/// Writes an astring (atom or quoted string).
pub fn write_astring(buf: &mut Vec<u8>, s: &str) {
    if s.is_empty() || s.bytes().any(needs_quoting) {
        buf.push(b'"');
        for b in s.bytes() {
            if b == b'"' || b == b'\\' {
                buf.push(b'\\');
            }
            buf.push(b);
        }
        buf.push(b'"');
    } else {
        buf.extend_from_slice(s.as_bytes());
    }
}

/// Returns true if the byte needs quoting.
const fn needs_quoting(b: u8) -> bool {
    matches!(b, b' ' | b'"' | b'\\' | b'(' | b')' | b'{' | b'%' | b'*' | b']')
        || b < 0x20
        || b >= 0x7F
}

/// Returns true if the string cannot be sent as a quoted string.
pub fn needs_literal(s: &str) -> bool {
    s.bytes().any(|b| matches!(b, b'\r' | b'\n' | 0))
}

/// Writes FETCH items.
pub fn write_fetch_items(buf: &mut Vec<u8>, items: &FetchItems) {
    match items {
        FetchItems::Fast => buf.extend_from_slice(b"FAST"),
        FetchItems::Items(attrs) => {
            if let [attr] = attrs.as_slice() {
                buf.extend_from_slice(attr.as_str().as_bytes());
            } else {
                buf.push(b'(');
                for (i, attr) in attrs.iter().enumerate() {
                    if i > 0 {
                        buf.push(b' ');
                    }
                    buf.extend_from_slice(attr.as_str().as_bytes());
                }
                buf.push(b')');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::FetchAttribute;
    use super::*;

    fn astring(s: &str) -> String {
        let mut buf = Vec::new();
        write_astring(&mut buf, s);
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn atoms_are_bare() {
        assert_eq!(astring("INBOX"), "INBOX");
        assert_eq!(astring("&AMk-l&AOk-ments"), "&AMk-l&AOk-ments");
    }

    #[test]
    fn specials_are_quoted() {
        assert_eq!(astring(""), "\"\"");
        assert_eq!(astring("Old Projects"), "\"Old Projects\"");
        assert_eq!(astring("[Gmail]/All Mail"), "\"[Gmail]/All Mail\"");
        assert_eq!(astring("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }

    #[test]
    fn line_breaks_need_literal() {
        assert!(needs_literal("pass\r\nword"));
        assert!(!needs_literal("pass word"));
    }

    #[test]
    fn fetch_items() {
        let mut buf = Vec::new();
        write_fetch_items(&mut buf, &FetchItems::Fast);
        assert_eq!(buf, b"FAST");

        buf.clear();
        write_fetch_items(&mut buf, &FetchItems::Items(vec![FetchAttribute::Rfc822Size]));
        assert_eq!(buf, b"RFC822.SIZE");

        buf.clear();
        write_fetch_items(&mut buf, &FetchItems::statistics());
        assert_eq!(buf, b"(UID FLAGS INTERNALDATE RFC822.SIZE)");
    }
}
