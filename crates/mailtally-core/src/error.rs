//! Error types for the core library.

use mailtally_imap::{DecodeError, FolderFlag};
use serde::Serialize;
use thiserror::Error;

/// Account-level errors.
///
/// A failed folder LIST aborts the scan; a missing QUOTA capability only
/// disables the quota figures.
#[derive(Debug, Error)]
pub enum Error {
    /// IMAP operation failed.
    #[error("IMAP error: {0}")]
    Imap(#[from] mailtally_imap::Error),

    /// The server does not advertise the QUOTA capability.
    #[error("server does not support QUOTA")]
    QuotaUnsupported,
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// How loudly a per-folder problem should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Expected outcome, e.g. a container folder that cannot be selected.
    Info,
    /// Data was skipped or is suspect.
    Warning,
}

/// Why a folder contributed nothing (or less than expected) to the totals.
///
/// Every variant is per-folder and non-fatal; the scan carries on with the
/// next folder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The LIST entry was malformed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The folder's flags exclude it from scanning.
    #[error("{folder}: not scanned ({})", join_flags(.flags))]
    Excluded {
        /// Decoded folder name.
        folder: String,
        /// Exclusionary flags that matched.
        flags: Vec<FolderFlag>,
    },

    /// The server refused or failed an operation.
    #[error("{folder}: {operation} failed: {reason}")]
    Protocol {
        /// Decoded folder name.
        folder: String,
        /// Command that failed (`EXAMINE`, `SEARCH`, `FETCH`).
        operation: &'static str,
        /// Server text or transport error.
        reason: String,
    },

    /// SEARCH returned nothing although the folder reported messages.
    #[error("{folder}: search returned no messages but {expected} exist")]
    EmptyResult {
        /// Decoded folder name.
        folder: String,
        /// Count reported on select.
        expected: u32,
    },
}

impl ScanError {
    /// Returns how the error should be reported.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Excluded { .. } => Severity::Info,
            Self::Decode(_) | Self::Protocol { .. } | Self::EmptyResult { .. } => Severity::Warning,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => f.write_str("info"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

fn join_flags(flags: &[FolderFlag]) -> String {
    flags.iter().map(FolderFlag::as_str).collect::<Vec<_>>().join(" ")
}
