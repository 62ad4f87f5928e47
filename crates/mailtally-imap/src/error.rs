//! Error types for the IMAP layer.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to an IMAP server.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error during network operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS handshake or encryption error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Invalid DNS name for TLS.
    #[error("Invalid DNS name: {0}")]
    InvalidDnsName(#[from] rustls::pki_types::InvalidDnsNameError),

    /// Server text could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Server returned NO response.
    #[error("Server returned NO: {0}")]
    No(String),

    /// Server returned BAD response.
    #[error("Server returned BAD: {0}")]
    Bad(String),

    /// Server sent BYE (disconnecting).
    #[error("Server sent BYE: {0}")]
    Bye(String),

    /// Operation timed out.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Protocol violation or unexpected data.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed protocol text.
///
/// Raised when a response fragment does not have the shape its decoder
/// expects. Unknown-but-well-formed content (unrecognised flags, extra fetch
/// items) never produces this error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed {context} at byte {position}: {message}")]
pub struct DecodeError {
    /// What was being decoded (`LIST entry`, `FETCH block`, ...).
    pub context: &'static str,
    /// Byte offset into the fragment where decoding stopped.
    pub position: usize,
    /// Description of what went wrong.
    pub message: String,
}

impl DecodeError {
    /// Creates a decode error at the given position.
    #[must_use]
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            context: "response",
            position,
            message: message.into(),
        }
    }

    /// Attaches the name of the fragment being decoded.
    #[must_use]
    pub const fn within(mut self, context: &'static str) -> Self {
        self.context = context;
        self
    }
}

/// Result type alias for decoders.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_display_names_context() {
        let err = DecodeError::new(7, "expected '('").within("LIST entry");
        assert_eq!(err.to_string(), "malformed LIST entry at byte 7: expected '('");
    }

    #[test]
    fn decode_error_converts_into_error() {
        let err: Error = DecodeError::new(0, "empty").into();
        assert!(matches!(err, Error::Decode(_)));
    }
}
