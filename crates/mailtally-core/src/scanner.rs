//! Per-folder scanning.
//!
//! A scan walks one LIST entry through decode, flag policy, EXAMINE,
//! `SEARCH ALL` and a single batched FETCH. Whatever goes wrong stays local
//! to the folder: the result always carries a report (zero when nothing
//! could be counted) plus an optional [`ScanError`].

use mailtally_imap::parser::{decode_folder_entry, decode_message_attributes};
use mailtally_imap::{FetchItems, FolderFlagPolicy, ProtocolClient, SequenceSet};
use serde::Serialize;

use crate::error::{ScanError, Severity};
use crate::model::{FolderReport, MessageRecord};

/// One line of per-folder or per-message trouble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Decoded folder name.
    pub folder: String,
    /// Message the line is about, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_id: Option<u32>,
    /// How loudly to report it.
    pub severity: Severity,
    /// What happened.
    pub message: String,
}

impl Diagnostic {
    fn warning(folder: &str, sequence_id: Option<u32>, message: impl Into<String>) -> Self {
        Self {
            folder: folder.to_string(),
            sequence_id,
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.sequence_id {
            Some(id) => write!(f, "{}: {} #{id}: {}", self.severity, self.folder, self.message),
            None => write!(f, "{}: {}: {}", self.severity, self.folder, self.message),
        }
    }
}

/// Result of scanning one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderScan {
    /// Counters and records; zero when the folder was skipped.
    pub report: FolderReport,
    /// Why the folder was skipped or cut short.
    pub error: Option<ScanError>,
    /// Degraded messages and other non-fatal findings.
    pub diagnostics: Vec<Diagnostic>,
}

impl FolderScan {
    fn new(report: FolderReport) -> Self {
        Self {
            report,
            error: None,
            diagnostics: Vec::new(),
        }
    }

    fn fail(mut self, error: ScanError) -> Self {
        self.error = Some(error);
        self
    }
}

/// Scans folders one at a time.
#[derive(Debug, Clone)]
pub struct FolderScanner {
    policy: FolderFlagPolicy,
    items: FetchItems,
}

impl Default for FolderScanner {
    fn default() -> Self {
        Self {
            policy: FolderFlagPolicy::default(),
            items: FetchItems::statistics(),
        }
    }
}

impl FolderScanner {
    /// Scanner with the default policy, read-only selection and the
    /// statistics item set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the folder flag policy.
    #[must_use]
    pub fn with_policy(mut self, policy: FolderFlagPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Scans the folder described by one raw LIST entry.
    pub async fn scan<C: ProtocolClient>(&self, raw_entry: &[u8], client: &mut C) -> FolderScan {
        let entry = match decode_folder_entry(raw_entry) {
            Ok(entry) => entry,
            Err(e) => {
                let raw = String::from_utf8_lossy(raw_entry).trim_end().to_string();
                tracing::warn!(entry = %raw, error = %e, "Skipping undecodable folder entry");
                return FolderScan::new(FolderReport::empty(raw.clone(), raw)).fail(e.into());
            }
        };

        let (name, name_error) = match entry.display_name() {
            Ok(name) => (name, None),
            Err(e) => (entry.name.clone(), Some(e)),
        };
        let mut scan = FolderScan::new(FolderReport::empty(name.clone(), entry.name.clone()));
        if let Some(e) = name_error {
            tracing::warn!(folder = %name, error = %e, "Folder name is not valid modified UTF-7");
            scan.diagnostics.push(Diagnostic::warning(
                &name,
                None,
                format!("name shown undecoded: {e}"),
            ));
        }

        let class = self.policy.classify(&entry.flags);
        if !class.selectable {
            tracing::info!(folder = %name, flags = %entry.flags, "Folder not scanned");
            return scan.fail(ScanError::Excluded {
                folder: name,
                flags: class.excluded_by,
            });
        }
        if !class.unknown.is_empty() {
            let unknown = class.unknown.join(" ");
            tracing::warn!(folder = %name, flags = %unknown, "Unknown folder flags");
            scan.diagnostics
                .push(Diagnostic::warning(&name, None, format!("unknown folder flags: {unknown}")));
        }

        let operation = "EXAMINE";
        tracing::debug!(folder = %name, "Examining folder");
        let selection = match client.select(&entry.name, true).await {
            Ok(selection) if selection.is_ok() => selection,
            Ok(selection) => {
                let reason = format!("{} {}", selection.status, selection.text).trim().to_string();
                return scan.protocol_failure(name, operation, reason);
            }
            Err(e) => return scan.protocol_failure(name, operation, e.to_string()),
        };

        scan.report.exists = selection.exists;
        if selection.exists == 0 {
            tracing::debug!(folder = %name, "Folder is empty");
            return scan;
        }

        tracing::debug!(folder = %name, exists = selection.exists, "Searching folder");
        let ids = match client.search_all().await {
            Ok(ids) => ids,
            Err(e) => return scan.protocol_failure(name, "SEARCH", e.to_string()),
        };
        let Some(set) = SequenceSet::covering(&ids) else {
            tracing::warn!(folder = %name, expected = selection.exists, "Search returned nothing");
            return scan.fail(ScanError::EmptyResult {
                folder: name,
                expected: selection.exists,
            });
        };

        tracing::debug!(folder = %name, range = %set, "Fetching attributes");
        let blocks = match client.fetch_range(&set, &self.items).await {
            Ok(blocks) => blocks,
            Err(e) => return scan.protocol_failure(name, "FETCH", e.to_string()),
        };

        if blocks.len() != ids.len() {
            tracing::warn!(
                folder = %name,
                searched = ids.len(),
                fetched = blocks.len(),
                "Fetch count does not match search"
            );
            scan.diagnostics.push(Diagnostic::warning(
                &name,
                None,
                format!("search matched {} messages, fetch returned {}", ids.len(), blocks.len()),
            ));
        }

        for raw in &blocks {
            scan.decode_block(raw, &name, &entry.name);
        }

        tracing::debug!(
            folder = %name,
            messages = scan.report.message_count,
            bytes = scan.report.total_size_bytes,
            "Folder scanned"
        );
        scan
    }
}

impl FolderScan {
    fn protocol_failure(self, folder: String, operation: &'static str, reason: String) -> Self {
        tracing::warn!(folder = %folder, operation, reason = %reason, "Folder scan failed");
        self.fail(ScanError::Protocol {
            folder,
            operation,
            reason,
        })
    }

    fn decode_block(&mut self, raw: &[u8], folder: &str, mailbox: &str) {
        let attrs = match decode_message_attributes(raw) {
            Ok(attrs) => attrs,
            Err(e) => {
                tracing::warn!(folder, error = %e, "Skipping undecodable FETCH block");
                self.diagnostics
                    .push(Diagnostic::warning(folder, None, format!("skipped: {e}")));
                return;
            }
        };

        for issue in &attrs.issues {
            tracing::warn!(folder, seq = attrs.sequence_id, issue = %issue, "Degraded message");
            self.diagnostics
                .push(Diagnostic::warning(folder, Some(attrs.sequence_id), issue.to_string()));
        }

        self.report.push(MessageRecord::from_attributes(attrs, folder, mailbox));
    }
}
