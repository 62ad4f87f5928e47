//! # mailtally-core
//!
//! Turns decoded IMAP responses into mailbox statistics.
//!
//! This crate provides:
//! - **Folder scanning** - one folder at a time through any
//!   [`ProtocolClient`](mailtally_imap::ProtocolClient), with per-folder
//!   failures kept local
//! - **Aggregation** - account totals and the flat message record set
//! - **Outlier detection** - `mean + 2σ` size threshold, order independent
//! - **Quota math** - usage percentages and byte formatting
//! - **Account scan** - quota lookup, folder listing and the cancellable
//!   scan loop

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod model;
pub mod outlier;
pub mod quota;
pub mod run;
pub mod scanner;
pub mod stats;

pub use error::{Error, Result, ScanError, Severity};
pub use model::{FolderReport, MessageRecord};
pub use outlier::{Outlier, OutlierDetector, OutlierReport};
pub use quota::{QuotaInfo, folder_share, format_bytes, usage_percent};
pub use run::{AccountScan, CancelToken, ScanOutcome};
pub use scanner::{Diagnostic, FolderScan, FolderScanner};
pub use stats::{AggregateStats, StatisticsAggregator};
