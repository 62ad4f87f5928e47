//! IMAP connection management.
//!
//! - Configuration (host, port, security mode, timeouts)
//! - TLS/plaintext stream abstraction
//! - Framed I/O for the IMAP line protocol
//! - [`ImapSession`], the live [`ProtocolClient`](crate::ProtocolClient)

mod config;
mod framed;
mod session;
mod stream;

pub use config::{Config, ConfigBuilder, Security};
pub use framed::FramedStream;
pub use session::{Completion, ImapSession};
pub use stream::{ImapStream, connect, create_tls_connector};
