//! Text and JSON rendering of a scan.

use std::fmt;

use mailtally_core::{
    Diagnostic, FolderReport, OutlierReport, QuotaInfo, ScanError, ScanOutcome, Severity,
    folder_share, format_bytes, usage_percent,
};
use serde::Serialize;

/// Everything printed after a scan.
pub struct Report<'a> {
    outcome: &'a ScanOutcome,
    outliers: &'a OutlierReport,
    details: bool,
}

impl<'a> Report<'a> {
    pub const fn new(outcome: &'a ScanOutcome, outliers: &'a OutlierReport, details: bool) -> Self {
        Self {
            outcome,
            outliers,
            details,
        }
    }

    fn quota(&self) -> Option<&QuotaInfo> {
        self.outcome.quota.as_ref().ok()
    }

    fn is_excluded(&self, folder: &FolderReport) -> bool {
        self.outcome
            .folder_errors
            .iter()
            .any(|e| matches!(e, ScanError::Excluded { folder: name, .. } if *name == folder.name))
    }

    /// JSON document with the same content as the text report.
    pub fn to_json(&self) -> JsonReport<'a> {
        let totals = self.outcome.stats.totals();
        JsonReport {
            total_messages: totals.total_messages,
            total_unread: totals.total_unread,
            total_size_bytes: totals.total_size_bytes,
            quota: self.outcome.quota.as_ref().ok().map(|q| JsonQuota {
                used_kib: q.used_kib,
                total_kib: q.total_kib,
                usage_percent: usage_percent(q),
            }),
            quota_error: self.outcome.quota.as_ref().err().map(ToString::to_string),
            folders: &totals.per_folder,
            outliers: self.outliers,
            folder_errors: self
                .outcome
                .folder_errors
                .iter()
                .map(|e| JsonFolderError {
                    severity: e.severity(),
                    message: e.to_string(),
                })
                .collect(),
            diagnostics: &self.outcome.diagnostics,
            cancelled: self.outcome.cancelled,
        }
    }
}

/// Serialized form of [`Report`].
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    total_messages: u64,
    total_unread: u64,
    total_size_bytes: u64,
    quota: Option<JsonQuota>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quota_error: Option<String>,
    folders: &'a [FolderReport],
    outliers: &'a OutlierReport,
    folder_errors: Vec<JsonFolderError>,
    diagnostics: &'a [Diagnostic],
    cancelled: bool,
}

#[derive(Debug, Serialize)]
struct JsonQuota {
    used_kib: u64,
    total_kib: u64,
    usage_percent: Option<f64>,
}

#[derive(Debug, Serialize)]
struct JsonFolderError {
    severity: Severity,
    message: String,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let totals = self.outcome.stats.totals();

        match &self.outcome.quota {
            Ok(q) => {
                let pct =
                    usage_percent(q).map_or_else(|| "n/a".to_string(), |p| format!("{p:.2}%"));
                writeln!(
                    f,
                    "Quota: {} of {} used ({pct})",
                    format_bytes(q.used_kib.saturating_mul(1024)),
                    format_bytes(q.total_kib.saturating_mul(1024)),
                )?;
            }
            Err(e) => writeln!(f, "Quota: unavailable ({e})")?,
        }
        writeln!(f)?;

        writeln!(
            f,
            "{:<32} {:>9} {:>9} {:>12} {:>8}",
            "Folder", "Messages", "Unread", "Size", "Share"
        )?;
        for folder in totals.per_folder.iter().filter(|r| !self.is_excluded(r)) {
            let share = self
                .quota()
                .and_then(|q| folder_share(folder.total_size_bytes, q))
                .map_or_else(|| "-".to_string(), |s| format!("{s:.2}%"));
            writeln!(
                f,
                "{:<32} {:>9} {:>9} {:>12} {:>8}",
                folder.name,
                folder.message_count,
                folder.unread_count,
                format_bytes(folder.total_size_bytes),
                share
            )?;
        }
        writeln!(
            f,
            "{:<32} {:>9} {:>9} {:>12}",
            "Total",
            totals.total_messages,
            totals.total_unread,
            format_bytes(totals.total_size_bytes)
        )?;
        writeln!(f)?;

        match (self.outliers.threshold, self.outliers.mean, self.outliers.std_dev) {
            (Some(threshold), Some(mean), Some(std_dev)) => {
                writeln!(
                    f,
                    "Size threshold: {} (mean {mean:.1} B, std dev {std_dev:.1} B, {} messages)",
                    format_bytes(threshold),
                    self.outliers.sample_size
                )?;
                writeln!(f, "Oversized messages: {}", self.outliers.outliers.len())?;
            }
            _ => writeln!(f, "Size threshold: no sized messages")?,
        }
        if self.details {
            for o in &self.outliers.outliers {
                write!(f, "  {:>12}  {} #{}", format_bytes(o.size_bytes), o.folder, o.sequence_id)?;
                if let Some(uid) = o.uid {
                    write!(f, " (UID {uid})")?;
                }
                if let Some(date) = o.internal_date {
                    write!(f, " {}", date.format("%Y-%m-%d"))?;
                }
                writeln!(f)?;
            }
        }

        if !self.outcome.folder_errors.is_empty() {
            writeln!(f)?;
            writeln!(f, "Skipped folders:")?;
            for e in &self.outcome.folder_errors {
                writeln!(f, "  {}: {e}", e.severity())?;
            }
        }
        if !self.outcome.diagnostics.is_empty() {
            writeln!(f)?;
            writeln!(f, "Diagnostics:")?;
            for d in &self.outcome.diagnostics {
                writeln!(f, "  {d}")?;
            }
        }

        if self.outcome.cancelled {
            writeln!(f)?;
            writeln!(
                f,
                "Scan cancelled after {} of {} folders; totals are partial.",
                totals.per_folder.len(),
                self.outcome.folders_listed
            )?;
        }
        Ok(())
    }
}
