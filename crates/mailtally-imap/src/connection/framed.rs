//! Framed I/O for the IMAP line protocol.
//!
//! A response is one CRLF-terminated line, extended by any `{n}` literals
//! it announces. Responses are returned whole, literal bytes included, so
//! the decoders see exactly what the server sent.
//!
//! The optional idle timeout bounds each individual read or write, not a
//! whole response: a server that keeps streaming is never cut off.

#![allow(clippy::missing_errors_doc)]

use std::future::Future;
use std::io;
use std::time::Duration;

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::{Error, Result};

const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Longest line accepted, literals excluded.
const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Largest literal accepted. Statistics never fetch bodies, so anything
/// bigger is a misbehaving server.
const MAX_LITERAL_SIZE: usize = 16 * 1024 * 1024;

/// Buffered IMAP reader/writer.
pub struct FramedStream<S> {
    reader: BufReader<S>,
    idle_timeout: Option<Duration>,
}

impl<S> FramedStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new framed stream.
    pub fn new(stream: S) -> Self {
        Self {
            reader: BufReader::with_capacity(DEFAULT_BUFFER_SIZE, stream),
            idle_timeout: None,
        }
    }

    /// Creates a framed stream that fails with [`Error::Timeout`] when a
    /// single read or write makes no progress within `timeout`.
    pub fn with_idle_timeout(stream: S, timeout: Duration) -> Self {
        Self {
            idle_timeout: Some(timeout),
            ..Self::new(stream)
        }
    }

    /// Reads one complete response, including embedded literals.
    pub async fn read_response(&mut self) -> Result<Vec<u8>> {
        let mut response = BytesMut::new();

        loop {
            let line_start = response.len();
            self.read_line(&mut response).await?;

            let Some(len) = literal_length(&response[line_start..]) else {
                break;
            };
            if len > MAX_LITERAL_SIZE {
                return Err(Error::Protocol(format!(
                    "literal too large: {len} bytes (max {MAX_LITERAL_SIZE})"
                )));
            }

            let start = response.len();
            response.resize(start + len, 0);
            within(self.idle_timeout, self.reader.read_exact(&mut response[start..])).await?;
        }

        Ok(response.to_vec())
    }

    /// Reads responses up to and including the completion for `tag`.
    pub async fn read_until_tagged(&mut self, tag: &str) -> Result<Vec<Vec<u8>>> {
        let mut responses = Vec::new();

        loop {
            let response = self.read_response().await?;
            let done = is_tagged(&response, tag);
            responses.push(response);
            if done {
                return Ok(responses);
            }
        }
    }

    /// Appends one CRLF-terminated line to `out`.
    async fn read_line(&mut self, out: &mut BytesMut) -> Result<()> {
        let mut read = 0;

        loop {
            let buf = within(self.idle_timeout, self.reader.fill_buf()).await?;
            if buf.is_empty() {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed",
                )));
            }

            if let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                out.put_slice(&buf[..=pos]);
                self.reader.consume(pos + 1);
                return Ok(());
            }

            let len = buf.len();
            out.put_slice(buf);
            self.reader.consume(len);

            read += len;
            if read > MAX_LINE_LENGTH {
                return Err(Error::Protocol("line too long".to_string()));
            }
        }
    }

    /// Writes and flushes a serialized command.
    pub async fn write_command(&mut self, data: &[u8]) -> Result<()> {
        let limit = self.idle_timeout;
        let stream = self.reader.get_mut();
        within(limit, stream.write_all(data)).await?;
        within(limit, stream.flush()).await?;
        Ok(())
    }

    /// Consumes the framed stream and returns the inner stream.
    ///
    /// Buffered, unread data is lost.
    pub fn into_inner(self) -> S {
        self.reader.into_inner()
    }
}

/// Runs one I/O step, bounded by the idle timeout when there is one.
async fn within<T>(
    limit: Option<Duration>,
    step: impl Future<Output = io::Result<T>>,
) -> Result<T> {
    match limit {
        Some(limit) => Ok(tokio::time::timeout(limit, step)
            .await
            .map_err(|_| Error::Timeout(limit))??),
        None => Ok(step.await?),
    }
}

/// Returns true if the response is the completion for `tag`.
fn is_tagged(response: &[u8], tag: &str) -> bool {
    response
        .strip_prefix(tag.as_bytes())
        .is_some_and(|rest| rest.first() == Some(&b' '))
}

/// Parses a trailing `{n}` or `{n+}` literal announcement.
fn literal_length(line: &[u8]) -> Option<usize> {
    let line = line.strip_suffix(b"\n")?;
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let line = line.strip_suffix(b"}")?;
    let line = line.strip_suffix(b"+").unwrap_or(line);

    let open = line.iter().rposition(|&b| b == b'{')?;
    let digits = &line[open + 1..];
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}
