//! The account-wide scan loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use mailtally_imap::parser::decode_quota;
use mailtally_imap::{ProtocolClient, QuotaInfo};

use crate::error::{Error, Result, ScanError};
use crate::scanner::{Diagnostic, FolderScanner};
use crate::stats::StatisticsAggregator;

/// Mailbox whose quota root is reported.
pub const QUOTA_MAILBOX: &str = "INBOX";

/// Cooperative cancellation flag, checked before each folder.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. The folder in progress still completes.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything one account scan produced.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Totals and per-folder reports.
    pub stats: StatisticsAggregator,
    /// Quota usage, or why it is unavailable.
    pub quota: Result<QuotaInfo>,
    /// Folders that were skipped or cut short.
    pub folder_errors: Vec<ScanError>,
    /// Degraded folders and messages.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of folders the server listed.
    pub folders_listed: usize,
    /// True when cancellation stopped the loop early.
    pub cancelled: bool,
}

/// Runs quota lookup, folder listing and sequential folder scans.
#[derive(Debug, Clone, Default)]
pub struct AccountScan {
    scanner: FolderScanner,
}

impl AccountScan {
    /// Creates an account scan using the given folder scanner.
    #[must_use]
    pub const fn new(scanner: FolderScanner) -> Self {
        Self { scanner }
    }

    /// Scans every listed folder, one at a time.
    ///
    /// Partial totals up to the last completed folder are returned when
    /// `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns an error only if the folder list cannot be retrieved.
    pub async fn run<C: ProtocolClient>(
        &self,
        client: &mut C,
        cancel: &CancelToken,
    ) -> Result<ScanOutcome> {
        let quota = fetch_quota(client).await;
        if let Err(e) = &quota {
            tracing::info!(error = %e, "Quota unavailable");
        }

        tracing::debug!("Listing folders");
        let entries = client.list_folders().await?;
        tracing::info!(folders = entries.len(), "Scanning folders");

        let mut outcome = ScanOutcome {
            stats: StatisticsAggregator::new(),
            quota,
            folder_errors: Vec::new(),
            diagnostics: Vec::new(),
            folders_listed: entries.len(),
            cancelled: false,
        };

        for raw in &entries {
            if cancel.is_cancelled() {
                tracing::warn!(
                    scanned = outcome.stats.totals().per_folder.len(),
                    listed = outcome.folders_listed,
                    "Scan cancelled"
                );
                outcome.cancelled = true;
                break;
            }

            let scan = self.scanner.scan(raw, client).await;
            outcome.diagnostics.extend(scan.diagnostics);
            outcome.folder_errors.extend(scan.error);
            outcome.stats.add_folder(scan.report);
        }

        let totals = outcome.stats.totals();
        tracing::info!(
            messages = totals.total_messages,
            unread = totals.total_unread,
            bytes = totals.total_size_bytes,
            "Scan complete"
        );
        Ok(outcome)
    }
}

/// Looks up the quota if the server advertises QUOTA.
async fn fetch_quota<C: ProtocolClient>(client: &mut C) -> Result<QuotaInfo> {
    let caps = client.capabilities().await?;
    if !caps.iter().any(|c| c == "QUOTA") {
        return Err(Error::QuotaUnsupported);
    }

    tracing::debug!(mailbox = QUOTA_MAILBOX, "Fetching quota");
    let raw = client.get_quota_root(QUOTA_MAILBOX).await?;
    let quota = decode_quota(&raw).map_err(mailtally_imap::Error::from)?;
    Ok(quota)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
