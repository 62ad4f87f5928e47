//! Command-line arguments.

use std::time::Duration;

use clap::Parser;
use clap::builder::BoolishValueParser;
use mailtally_imap::{Config, Security};

/// Mailbox statistics, oversized messages and quota usage over IMAP.
#[derive(Debug, Parser)]
#[command(name = "mailtally", version, about)]
pub struct Cli {
    /// IMAP server hostname.
    #[arg(long, env = "IMAP_SERVER", default_value = "imap.gmail.com")]
    pub server: String,

    /// IMAP port; defaults to 993 for implicit TLS, 143 otherwise.
    #[arg(long, env = "IMAP_PORT")]
    pub port: Option<u16>,

    /// Connection security: implicit, starttls or plain.
    #[arg(long, env = "IMAP_SECURITY", default_value = "implicit")]
    pub security: Security,

    /// Login name.
    #[arg(long, env = "IMAP_USER")]
    pub user: String,

    /// Password or app password.
    #[arg(long, env = "IMAP_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// List every oversized message.
    #[arg(long, env = "IMAP_DETAILS", value_parser = BoolishValueParser::new())]
    pub details: bool,

    /// Log the IMAP conversation.
    #[arg(long, env = "IMAP_DEBUG", value_parser = BoolishValueParser::new())]
    pub debug: bool,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Connect timeout in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub connect_timeout: u64,

    /// Per-command timeout in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 60)]
    pub io_timeout: u64,
}

impl Cli {
    /// Connection settings.
    pub fn imap_config(&self) -> Config {
        Config::builder(&self.server)
            .security(self.security)
            .maybe_port(self.port)
            .connect_timeout(Duration::from_secs(self.connect_timeout))
            .io_timeout(Duration::from_secs(self.io_timeout))
            .build()
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub const fn log_filter(&self) -> &'static str {
        if self.debug {
            "mailtally=debug,mailtally_core=debug,mailtally_imap=trace"
        } else {
            "mailtally=info,mailtally_core=info,mailtally_imap=warn"
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["mailtally", "--user", "me@example.com", "--password", "secret"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults() {
        let cli = parse(&[]);
        let config = cli.imap_config();
        assert_eq!(config.host, "imap.gmail.com");
        assert_eq!(config.port, 993);
        assert_eq!(config.security, Security::Implicit);
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.io_timeout, Duration::from_secs(60));
        assert!(!cli.details);
        assert!(!cli.json);
    }

    #[test]
    fn starttls_uses_plain_port() {
        let cli = parse(&["--server", "mail.example.org", "--security", "starttls"]);
        let config = cli.imap_config();
        assert_eq!(config.security, Security::StartTls);
        assert_eq!(config.port, 143);
    }

    #[test]
    fn explicit_port_wins() {
        let cli = parse(&["--port", "1993", "--io-timeout", "5"]);
        let config = cli.imap_config();
        assert_eq!(config.port, 1993);
        assert_eq!(config.io_timeout, Duration::from_secs(5));
    }

    #[test]
    fn debug_raises_protocol_logging() {
        assert!(parse(&["--debug"]).log_filter().contains("mailtally_imap=trace"));
        assert!(parse(&[]).log_filter().contains("mailtally_imap=warn"));
    }

    #[test]
    fn unknown_security_is_rejected() {
        let result = Cli::try_parse_from([
            "mailtally",
            "--user",
            "u",
            "--password",
            "p",
            "--security",
            "ssl3",
        ]);
        assert!(result.is_err());
    }
}
