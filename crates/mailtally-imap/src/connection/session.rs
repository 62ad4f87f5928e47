//! Live IMAP session.
//!
//! [`ImapSession`] drives one connection through greeting, optional
//! STARTTLS, LOGIN and the read-only commands of [`ProtocolClient`]. The
//! configured I/O timeout is an idle timeout: it bounds each read and write,
//! so a long but steady FETCH is never cut off. After any transport failure
//! the connection may be mid-response, so every later command fails fast.
//!
//! ```ignore
//! use mailtally_imap::connection::{Config, ImapSession};
//!
//! let mut session = ImapSession::connect(&Config::new("imap.example.com")).await?;
//! session.login("user@example.com", "secret").await?;
//! let folders = session.list_folders().await?;
//! session.logout().await?;
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};

use super::config::{Config, Security};
use super::framed::FramedStream;
use super::stream::{self, ImapStream};
use crate::client::{ProtocolClient, Selection};
use crate::command::{Command, FetchItems, TagGenerator, needs_literal};
use crate::parser::{ServerLine, classify_line, decode_capabilities, decode_exists, decode_search};
use crate::types::{SequenceSet, Status};
use crate::{Error, Result};

/// Everything the server sent for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Tagged completion status.
    pub status: Status,
    /// Tagged completion text.
    pub text: String,
    /// Untagged responses, in arrival order.
    pub responses: Vec<Vec<u8>>,
}

impl Completion {
    /// Raw untagged responses with the given keyword.
    pub fn untagged<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a [u8]> + 'a {
        self.responses.iter().filter_map(move |raw| match classify_line(raw) {
            Ok(ServerLine::Untagged { keyword: k, .. }) if k == keyword => Some(raw.as_slice()),
            _ => None,
        })
    }

    /// Converts a `NO`/`BAD` completion into an error.
    pub fn into_ok(self) -> Result<Self> {
        match self.status {
            Status::Ok | Status::PreAuth => Ok(self),
            Status::No => Err(Error::No(self.text)),
            Status::Bad => Err(Error::Bad(self.text)),
            Status::Bye => Err(Error::Bye(self.text)),
        }
    }
}

/// An IMAP connection in the authenticated-or-earlier state.
pub struct ImapSession<S> {
    framed: FramedStream<S>,
    tags: TagGenerator,
    io_timeout: Duration,
    broken: bool,
}

impl ImapSession<ImapStream> {
    /// Connects, reads the greeting and negotiates STARTTLS if configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection, TLS handshake or greeting fails,
    /// or if any step exceeds its timeout.
    pub async fn connect(config: &Config) -> Result<Self> {
        let stream = stream::connect(config).await?;
        let mut session = Self::start(stream, config.io_timeout).await?;

        if config.security == Security::StartTls {
            session.execute(Command::StartTls).await?.into_ok()?;
            let plain = session.framed.into_inner();
            let tls = timed(config.connect_timeout, plain.upgrade_to_tls(&config.host)).await?;
            tracing::debug!(host = %config.host, "STARTTLS negotiated");
            session = Self {
                framed: FramedStream::with_idle_timeout(tls, session.io_timeout),
                tags: session.tags,
                io_timeout: session.io_timeout,
                broken: false,
            };
        }

        Ok(session)
    }
}

impl<S> ImapSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an open stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if the greeting is `BYE`, malformed or late.
    pub async fn start(stream: S, io_timeout: Duration) -> Result<Self> {
        let mut framed = FramedStream::with_idle_timeout(stream, io_timeout);
        let greeting = framed.read_response().await?;
        tracing::trace!(line = %String::from_utf8_lossy(&greeting).trim_end(), "S:");

        match classify_line(&greeting)? {
            ServerLine::Untagged { keyword, data } => match keyword.as_str() {
                "OK" | "PREAUTH" => {}
                "BYE" => return Err(Error::Bye(String::from_utf8_lossy(data).into_owned())),
                other => return Err(Error::Protocol(format!("unexpected greeting {other}"))),
            },
            other => return Err(Error::Protocol(format!("unexpected greeting {other:?}"))),
        }

        Ok(Self {
            framed,
            tags: TagGenerator::default(),
            io_timeout,
            broken: false,
        })
    }

    /// Authenticates with LOGIN.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] when the server rejects the credentials or
    /// they cannot be sent as quoted strings.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        if needs_literal(username) || needs_literal(password) {
            return Err(Error::Auth("credentials contain line breaks".to_string()));
        }

        let completion = self
            .execute(Command::Login {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;

        match completion.status {
            Status::Ok => {
                tracing::debug!(username, "logged in");
                Ok(())
            }
            _ => Err(Error::Auth(completion.text)),
        }
    }

    /// Ends the session. A `BYE` before the completion is expected.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be sent.
    pub async fn logout(mut self) -> Result<()> {
        match self.execute(Command::Logout).await {
            Ok(_) | Err(Error::Bye(_)) => Ok(()),
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Sends one command and collects everything up to its completion.
    ///
    /// An untagged `BYE` ends the session and is returned as
    /// [`Error::Bye`]; `NO`/`BAD` completions are returned as-is.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure, timeout or a malformed completion,
    /// and [`Error::Protocol`] without touching the wire once an earlier
    /// command failed in transport.
    pub async fn execute(&mut self, command: Command) -> Result<Completion> {
        if self.broken {
            return Err(Error::Protocol(format!(
                "{} not sent: connection is out of sync after an earlier failure",
                command.name()
            )));
        }

        let tag = self.tags.next_tag();
        tracing::trace!(line = %command.redacted(&tag), "C:");

        let round_trip = match self.framed.write_command(&command.serialize(&tag)).await {
            Ok(()) => self.framed.read_until_tagged(&tag).await,
            Err(e) => Err(e),
        };
        let mut responses = round_trip.inspect_err(|e| {
            tracing::warn!(command = command.name(), error = %e, "connection unusable");
            self.broken = true;
        })?;

        let Some(tagged) = responses.pop() else {
            return Err(Error::Protocol(format!("{} produced no completion", command.name())));
        };
        for raw in &responses {
            tracing::trace!(line = %String::from_utf8_lossy(raw).trim_end(), "S:");
            if let Ok(ServerLine::Untagged { keyword, data }) = classify_line(raw)
                && keyword == "BYE"
                && !matches!(command, Command::Logout)
            {
                return Err(Error::Bye(String::from_utf8_lossy(data).into_owned()));
            }
        }
        tracing::trace!(line = %String::from_utf8_lossy(&tagged).trim_end(), "S:");

        match classify_line(&tagged)? {
            ServerLine::Tagged { status, text, .. } => {
                if !status.is_ok() {
                    tracing::debug!(
                        command = command.name(),
                        %status,
                        %text,
                        "command not completed"
                    );
                }
                Ok(Completion {
                    status,
                    text,
                    responses,
                })
            }
            other => Err(Error::Protocol(format!("expected tagged completion, got {other:?}"))),
        }
    }
}

impl<S> ProtocolClient for ImapSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    async fn capabilities(&mut self) -> Result<Vec<String>> {
        let completion = self.execute(Command::Capability).await?.into_ok()?;
        Ok(completion.untagged("CAPABILITY").flat_map(decode_capabilities).collect())
    }

    async fn list_folders(&mut self) -> Result<Vec<Vec<u8>>> {
        let completion = self
            .execute(Command::List {
                reference: String::new(),
                pattern: "*".to_string(),
            })
            .await?
            .into_ok()?;
        Ok(completion.untagged("LIST").map(<[u8]>::to_vec).collect())
    }

    async fn select(&mut self, mailbox: &str, read_only: bool) -> Result<Selection> {
        let mailbox = mailbox.to_string();
        let command = if read_only {
            Command::Examine { mailbox }
        } else {
            Command::Select { mailbox }
        };

        let completion = self.execute(command).await?;
        if !completion.status.is_ok() {
            return Ok(Selection::failed(completion.status, completion.text));
        }

        let exists = completion.untagged("EXISTS").filter_map(decode_exists).last().unwrap_or(0);
        Ok(Selection {
            status: completion.status,
            exists,
            text: completion.text,
        })
    }

    async fn search_all(&mut self) -> Result<Vec<u32>> {
        let completion = self.execute(Command::SearchAll).await?.into_ok()?;
        let mut ids = Vec::new();
        for raw in completion.untagged("SEARCH") {
            ids.extend(decode_search(raw)?);
        }
        Ok(ids)
    }

    async fn fetch_range(&mut self, set: &SequenceSet, items: &FetchItems) -> Result<Vec<Vec<u8>>> {
        let completion = self
            .execute(Command::Fetch {
                sequence: *set,
                items: items.clone(),
            })
            .await?
            .into_ok()?;
        Ok(completion.untagged("FETCH").map(<[u8]>::to_vec).collect())
    }

    async fn get_quota_root(&mut self, mailbox: &str) -> Result<Vec<u8>> {
        let completion = self
            .execute(Command::GetQuotaRoot {
                mailbox: mailbox.to_string(),
            })
            .await?
            .into_ok()?;
        completion
            .untagged("QUOTA")
            .next()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| Error::Protocol("GETQUOTAROOT returned no QUOTA response".to_string()))
    }
}

/// Bounds a future by `limit`.
async fn timed<T>(limit: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| Error::Timeout(limit))?
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio_test::io::Builder;

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_greeting_and_login() {
        let mock = Builder::new()
            .read(b"* OK IMAP4rev1 ready\r\n")
            .write(b"A0001 LOGIN me \"s3cret pass\"\r\n")
            .read(b"A0001 OK LOGIN completed\r\n")
            .build();

        let mut session = ImapSession::start(mock, TIMEOUT).await.unwrap();
        session.login("me", "s3cret pass").await.unwrap();
    }

    #[tokio::test]
    async fn test_bye_greeting() {
        let mock = Builder::new().read(b"* BYE too busy\r\n").build();
        let err = ImapSession::start(mock, TIMEOUT).await.err().unwrap();
        assert!(matches!(err, Error::Bye(_)));
    }

    #[tokio::test]
    async fn test_rejected_login() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0001 LOGIN me wrong\r\n")
            .read(b"A0001 NO [AUTHENTICATIONFAILED] Invalid credentials\r\n")
            .build();

        let mut session = ImapSession::start(mock, TIMEOUT).await.unwrap();
        let err = session.login("me", "wrong").await.unwrap_err();
        assert!(matches!(err, Error::Auth(text) if text.contains("Invalid credentials")));
    }

    #[tokio::test]
    async fn test_login_rejects_line_breaks_locally() {
        let mock = Builder::new().read(b"* OK ready\r\n").build();
        let mut session = ImapSession::start(mock, TIMEOUT).await.unwrap();
        assert!(matches!(session.login("me", "a\r\nb").await, Err(Error::Auth(_))));
    }

    #[tokio::test]
    async fn test_examine_reports_exists() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0001 EXAMINE INBOX\r\n")
            .read(b"* FLAGS (\\Answered \\Seen)\r\n* 17 EXISTS\r\n* 0 RECENT\r\n")
            .read(b"A0001 OK [READ-ONLY] EXAMINE completed\r\n")
            .build();

        let mut session = ImapSession::start(mock, TIMEOUT).await.unwrap();
        let selection = session.select("INBOX", true).await.unwrap();
        assert!(selection.is_ok());
        assert_eq!(selection.exists, 17);
    }

    #[tokio::test]
    async fn test_examine_no_is_a_status() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0001 EXAMINE Gone\r\n")
            .read(b"A0001 NO Mailbox doesn't exist\r\n")
            .build();

        let mut session = ImapSession::start(mock, TIMEOUT).await.unwrap();
        let selection = session.select("Gone", true).await.unwrap();
        assert_eq!(selection.status, Status::No);
        assert_eq!(selection.exists, 0);
    }

    #[tokio::test]
    async fn test_search_and_fetch() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0001 SEARCH ALL\r\n")
            .read(b"* SEARCH 1 2\r\nA0001 OK SEARCH completed\r\n")
            .write(b"A0002 FETCH 1:2 FAST\r\n")
            .read(b"* 1 FETCH (FLAGS (\\Seen) INTERNALDATE \"01-Jan-2024 10:00:00 +0000\"")
            .read(b" RFC822.SIZE 100)\r\n")
            .read(b"* 2 FETCH (FLAGS () INTERNALDATE \"02-Jan-2024 10:00:00 +0000\"")
            .read(b" RFC822.SIZE 200)\r\n")
            .read(b"A0002 OK FETCH completed\r\n")
            .build();

        let mut session = ImapSession::start(mock, TIMEOUT).await.unwrap();
        assert_eq!(session.search_all().await.unwrap(), vec![1, 2]);

        let set = SequenceSet::range(1, 2).unwrap();
        let blocks = session.fetch_range(&set, &FetchItems::Fast).await.unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[1].starts_with(b"* 2 FETCH"));
    }

    #[tokio::test]
    async fn test_quota_root() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0001 GETQUOTAROOT INBOX\r\n")
            .read(b"* QUOTAROOT INBOX \"\"\r\n* QUOTA \"\" (STORAGE 204800 1048576)\r\n")
            .read(b"A0001 OK GETQUOTAROOT completed\r\n")
            .build();

        let mut session = ImapSession::start(mock, TIMEOUT).await.unwrap();
        let raw = session.get_quota_root("INBOX").await.unwrap();
        assert_eq!(raw, b"* QUOTA \"\" (STORAGE 204800 1048576)\r\n");
    }

    #[tokio::test]
    async fn test_capabilities_and_bad() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0001 CAPABILITY\r\n")
            .read(b"* CAPABILITY IMAP4rev1 QUOTA\r\nA0001 OK done\r\n")
            .write(b"A0002 SEARCH ALL\r\n")
            .read(b"A0002 BAD No mailbox selected\r\n")
            .build();

        let mut session = ImapSession::start(mock, TIMEOUT).await.unwrap();
        assert_eq!(session.capabilities().await.unwrap(), vec!["IMAP4REV1", "QUOTA"]);
        assert!(matches!(session.search_all().await, Err(Error::Bad(_))));
    }

    #[tokio::test]
    async fn test_untagged_bye_mid_command() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0001 LIST \"\" \"*\"\r\n")
            .read(b"* BYE server shutting down\r\nA0001 NO aborted\r\n")
            .build();

        let mut session = ImapSession::start(mock, TIMEOUT).await.unwrap();
        assert!(matches!(session.list_folders().await, Err(Error::Bye(_))));
    }

    #[tokio::test]
    async fn test_logout_accepts_bye() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0001 LOGOUT\r\n")
            .read(b"* BYE logging out\r\nA0001 OK LOGOUT completed\r\n")
            .build();

        let session = ImapSession::start(mock, TIMEOUT).await.unwrap();
        session.logout().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_timeout() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0001 CAPABILITY\r\n")
            .wait(Duration::from_secs(120))
            .build();

        let mut session = ImapSession::start(mock, TIMEOUT).await.unwrap();
        assert!(matches!(session.capabilities().await, Err(Error::Timeout(_))));
        // Nothing further is written: the mock would reject an unexpected write.
        assert!(matches!(session.capabilities().await, Err(Error::Protocol(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_outlasting_timeout() {
        let mut builder = Builder::new();
        builder.read(b"* OK ready\r\n").write(b"A0001 FETCH 1:10 FAST\r\n");
        for id in 1..=10 {
            builder
                .wait(Duration::from_secs(2))
                .read(format!("* {id} FETCH (RFC822.SIZE {id}00)\r\n").as_bytes());
        }
        let mock = builder.read(b"A0001 OK FETCH completed\r\n").build();

        let mut session = ImapSession::start(mock, TIMEOUT).await.unwrap();
        let set = SequenceSet::range(1, 10).unwrap();
        let blocks = session.fetch_range(&set, &FetchItems::Fast).await.unwrap();
        assert_eq!(blocks.len(), 10);
        assert_eq!(blocks[9], b"* 10 FETCH (RFC822.SIZE 1000)\r\n");
    }

    #[tokio::test]
    async fn test_select_read_write() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0001 SELECT INBOX\r\n")
            .read(b"* 3 EXISTS\r\nA0001 OK [READ-WRITE] SELECT completed\r\n")
            .build();

        let mut session = ImapSession::start(mock, TIMEOUT).await.unwrap();
        let selection = session.select("INBOX", false).await.unwrap();
        assert_eq!(selection.exists, 3);
    }
}
