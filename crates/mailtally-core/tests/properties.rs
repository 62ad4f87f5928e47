//! Aggregation and threshold properties.

#![allow(clippy::unwrap_used)]

use mailtally_core::{FolderReport, MessageRecord, OutlierDetector, StatisticsAggregator};
use mailtally_imap::{Flag, Flags};
use proptest::prelude::*;

fn report(index: usize, messages: &[(u64, bool)]) -> FolderReport {
    let name = format!("Folder{index}");
    let mut report = FolderReport::empty(name.clone(), name.clone());
    for (seq, &(size, seen)) in (1u32..).zip(messages) {
        let flags: Flags = if seen { [Flag::Seen].into_iter().collect() } else { Flags::new() };
        report.push(MessageRecord {
            sequence_id: seq,
            uid: None,
            folder: name.clone(),
            mailbox: name.clone(),
            size_bytes: Some(size),
            internal_date: None,
            flags,
        });
    }
    report
}

fn folders() -> impl Strategy<Value = Vec<Vec<(u64, bool)>>> {
    prop::collection::vec(
        prop::collection::vec((0u64..50_000_000, any::<bool>()), 0..20),
        0..8,
    )
}

proptest! {
    #[test]
    fn aggregation_is_additive(folders in folders(), split in any::<prop::sample::Index>()) {
        let reports: Vec<_> = folders.iter().enumerate().map(|(i, m)| report(i, m)).collect();

        let mut whole = StatisticsAggregator::new();
        for r in &reports {
            whole.add_folder(r.clone());
        }

        let at = if reports.is_empty() { 0 } else { split.index(reports.len() + 1) };
        let mut left = StatisticsAggregator::new();
        let mut right = StatisticsAggregator::new();
        for r in reports[at..].iter().rev() {
            right.add_folder(r.clone());
        }
        for r in &reports[..at] {
            left.add_folder(r.clone());
        }
        right.merge(left);

        let (a, b) = (whole.totals(), right.totals());
        prop_assert_eq!(a.total_messages, b.total_messages);
        prop_assert_eq!(a.total_unread, b.total_unread);
        prop_assert_eq!(a.total_size_bytes, b.total_size_bytes);
        prop_assert_eq!(
            a.total_messages,
            a.per_folder.iter().map(|f| f.message_count).sum::<u64>()
        );
        prop_assert_eq!(
            a.total_size_bytes,
            whole.messages().map(|m| m.size_bytes.unwrap_or(0)).sum::<u64>()
        );
    }

    #[test]
    fn threshold_grows_with_a_new_largest_outlier(
        sizes in prop::collection::vec(0u64..10_000_000, 1..50),
        extra in 1u64..10_000_000,
    ) {
        let detector = OutlierDetector::new();
        let before = detector.threshold(&sizes).unwrap();
        let max = sizes.iter().copied().max().unwrap();

        let mut grown = sizes.clone();
        grown.push(max.max(before) + extra);
        let after = detector.threshold(&grown).unwrap();
        prop_assert!(after >= before, "{} < {}", after, before);
    }

    #[test]
    fn threshold_ignores_order(
        mut sizes in prop::collection::vec(0u64..u64::from(u32::MAX), 1..50)
    ) {
        let detector = OutlierDetector::new();
        let forward = detector.threshold(&sizes);
        sizes.reverse();
        prop_assert_eq!(forward, detector.threshold(&sizes));
    }
}

#[test]
fn appending_above_the_maximum_alone_can_lower_the_threshold() {
    let mut sizes = vec![0u64];
    sizes.extend(std::iter::repeat_n(1000, 100));
    let detector = OutlierDetector::new();
    let before = detector.threshold(&sizes).unwrap();

    sizes.push(1001);
    let after = detector.threshold(&sizes).unwrap();
    assert_eq!(before, 1188);
    assert_eq!(after, 1187);
}
