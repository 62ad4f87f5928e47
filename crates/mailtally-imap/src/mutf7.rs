//! Modified UTF-7 mailbox names (RFC 3501 section 5.1.3).
//!
//! Servers send non-ASCII folder names as printable ASCII with `&...-`
//! runs of UTF-16BE encoded in a base64 variant that uses `,` instead of `/`.
//! Names are decoded for presentation only; protocol commands keep using the
//! raw form.

use base64::Engine;
use base64::alphabet;
use base64::engine::{GeneralPurpose, general_purpose};

use crate::error::{DecodeError, DecodeResult};

const MUTF7: GeneralPurpose = GeneralPurpose::new(&alphabet::IMAP_MUTF7, general_purpose::NO_PAD);

/// Decodes a modified UTF-7 mailbox name.
///
/// Bytes outside the shifted runs pass through untouched, which also keeps
/// names from `UTF8=ACCEPT` servers intact.
///
/// # Errors
///
/// Returns an error for an unterminated `&` run, invalid base64, or a run
/// that is not well-formed UTF-16.
pub fn decode(name: &str) -> DecodeResult<String> {
    let mut out = String::with_capacity(name.len());
    let mut rest = name;
    let mut offset = 0;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let shifted = &rest[start + 1..];
        let end = shifted
            .find('-')
            .ok_or_else(|| error(offset + start, "unterminated '&' run"))?;

        if end == 0 {
            out.push('&');
        } else {
            out.push_str(&decode_run(&shifted[..end]).map_err(|msg| error(offset + start, msg))?);
        }

        let consumed = start + 1 + end + 1;
        offset += consumed;
        rest = &rest[consumed..];
    }

    out.push_str(rest);
    Ok(out)
}

fn decode_run(run: &str) -> Result<String, &'static str> {
    let bytes = MUTF7.decode(run).map_err(|_| "invalid base64 in '&' run")?;
    if bytes.len() % 2 != 0 {
        return Err("odd byte count in UTF-16 run");
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|_| "invalid UTF-16 in '&' run")
}

fn error(position: usize, message: &str) -> DecodeError {
    DecodeError::new(position, message).within("mailbox name")
}
