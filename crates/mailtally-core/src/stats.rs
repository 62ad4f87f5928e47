//! Running totals across folders.

use serde::Serialize;

use crate::model::{FolderReport, MessageRecord};

/// Account-wide totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    /// Sum of per-folder message counts.
    pub total_messages: u64,
    /// Sum of per-folder unread counts.
    pub total_unread: u64,
    /// Sum of per-folder sizes.
    pub total_size_bytes: u64,
    /// Folder reports in the order they were added.
    pub per_folder: Vec<FolderReport>,
}

/// Folds folder reports into [`AggregateStats`].
///
/// Owned by a single writer. Scans over separate connections each fill
/// their own aggregator and are combined with [`merge`](Self::merge).
#[derive(Debug, Clone, Default)]
pub struct StatisticsAggregator {
    stats: AggregateStats,
}

impl StatisticsAggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one folder's report.
    pub fn add_folder(&mut self, report: FolderReport) {
        self.stats.total_messages += report.message_count;
        self.stats.total_unread += report.unread_count;
        self.stats.total_size_bytes += report.total_size_bytes;
        self.stats.per_folder.push(report);
    }

    /// Appends every folder of `other`.
    pub fn merge(&mut self, other: Self) {
        for report in other.stats.per_folder {
            self.add_folder(report);
        }
    }

    /// Current totals.
    #[must_use]
    pub const fn totals(&self) -> &AggregateStats {
        &self.stats
    }

    /// Every message record, in folder order.
    pub fn messages(&self) -> impl Iterator<Item = &MessageRecord> {
        self.stats.per_folder.iter().flat_map(|f| f.messages.iter())
    }
}

#[cfg(test)]
mod tests {
    use mailtally_imap::Flags;

    use super::*;

    fn folder(name: &str, sizes: &[u64]) -> FolderReport {
        let mut report = FolderReport::empty(name, name);
        for (i, &size) in sizes.iter().enumerate() {
            report.push(MessageRecord {
                sequence_id: u32::try_from(i + 1).unwrap_or(u32::MAX),
                uid: None,
                folder: name.to_string(),
                mailbox: name.to_string(),
                size_bytes: Some(size),
                internal_date: None,
                flags: Flags::new(),
            });
        }
        report
    }

    #[test]
    fn totals_start_empty() {
        let agg = StatisticsAggregator::new();
        assert_eq!(agg.totals(), &AggregateStats::default());
        assert_eq!(agg.messages().count(), 0);
    }

    #[test]
    fn add_folder_sums_counters() {
        let mut agg = StatisticsAggregator::new();
        agg.add_folder(folder("INBOX", &[100, 200]));
        agg.add_folder(FolderReport::empty("[Gmail]", "[Gmail]"));
        agg.add_folder(folder("Sent", &[50]));

        let totals = agg.totals();
        assert_eq!(totals.total_messages, 3);
        assert_eq!(totals.total_unread, 3);
        assert_eq!(totals.total_size_bytes, 350);
        assert_eq!(totals.per_folder.len(), 3);

        let folders: Vec<_> = agg.messages().map(|m| m.folder.as_str()).collect();
        assert_eq!(folders, vec!["INBOX", "INBOX", "Sent"]);
    }

    #[test]
    fn merge_keeps_both_sides() {
        let mut left = StatisticsAggregator::new();
        left.add_folder(folder("INBOX", &[10, 20]));
        let mut right = StatisticsAggregator::new();
        right.add_folder(folder("Archive", &[30]));

        left.merge(right);
        assert_eq!(left.totals().total_messages, 3);
        assert_eq!(left.totals().total_size_bytes, 60);
        assert_eq!(left.totals().per_folder[1].name, "Archive");
    }
}
