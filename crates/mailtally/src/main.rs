//! `mailtally` - mailbox statistics over IMAP
//!
//! Connects to one account, scans every selectable folder read-only and
//! prints message counts, sizes, oversized messages and quota usage.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod report;

use anyhow::Context;
use clap::Parser;
use mailtally_core::{AccountScan, CancelToken, OutlierDetector};
use mailtally_imap::ImapSession;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;
use report::Report;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so the report can be piped
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.imap_config();
    tracing::info!(server = %config.address(), security = %config.security, "Connecting");
    let mut session = ImapSession::connect(&config)
        .await
        .with_context(|| format!("failed to connect to {}", config.address()))?;
    session
        .login(&cli.user, &cli.password)
        .await
        .with_context(|| format!("login failed for {}", cli.user))?;

    let cancel = CancelToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, stopping after the current folder");
                cancel.cancel();
            }
        }
    });

    let outcome = AccountScan::default()
        .run(&mut session, &cancel)
        .await
        .context("folder scan failed")?;

    if let Err(e) = session.logout().await {
        tracing::warn!(error = %e, "Logout failed");
    }

    let outliers = OutlierDetector::new().detect(outcome.stats.messages());
    let report = Report::new(&outcome, &outliers, cli.details);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    } else {
        print!("{report}");
    }

    Ok(())
}
