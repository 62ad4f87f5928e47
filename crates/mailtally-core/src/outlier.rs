//! Oversized message detection.
//!
//! The cut-off is `floor(mean + 2σ)` over every known size, with σ the
//! population standard deviation. This approximates the upper tail of a
//! normal distribution; it is not a percentile. Sums are exact integers, so
//! the result does not depend on record order.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::model::MessageRecord;

/// Default number of standard deviations above the mean.
pub const DEFAULT_DEVIATIONS: u32 = 2;

/// A message above the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outlier {
    /// Decoded folder name.
    pub folder: String,
    /// Raw folder name, for selecting it again.
    pub mailbox: String,
    /// Message sequence number.
    pub sequence_id: u32,
    /// UID, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<u32>,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Internal date, when known.
    pub internal_date: Option<DateTime<FixedOffset>>,
}

/// Distribution summary plus the messages above the threshold.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutlierReport {
    /// Number of sizes considered.
    pub sample_size: u64,
    /// Mean size, absent for an empty sample.
    pub mean: Option<f64>,
    /// Population standard deviation, absent for an empty sample.
    pub std_dev: Option<f64>,
    /// Sizes strictly above this are outliers.
    pub threshold: Option<u64>,
    /// Outliers, smallest first; ties by folder, then sequence number.
    pub outliers: Vec<Outlier>,
}

/// Computes the size threshold and ranks oversized messages.
#[derive(Debug, Clone, Copy)]
pub struct OutlierDetector {
    deviations: u32,
}

impl Default for OutlierDetector {
    fn default() -> Self {
        Self {
            deviations: DEFAULT_DEVIATIONS,
        }
    }
}

impl OutlierDetector {
    /// Detector using `mean + 2σ`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector using `mean + k·σ`.
    #[must_use]
    pub const fn with_deviations(deviations: u32) -> Self {
        Self { deviations }
    }

    /// Computes the threshold for a set of sizes. `None` when empty.
    #[must_use]
    pub fn threshold(&self, sizes: &[u64]) -> Option<u64> {
        Moments::of(sizes.iter().copied()).map(|m| m.threshold(self.deviations))
    }

    /// Analyses every record with a known size.
    pub fn detect<'a, I>(&self, records: I) -> OutlierReport
    where
        I: IntoIterator<Item = &'a MessageRecord>,
    {
        let sized: Vec<(&MessageRecord, u64)> = records
            .into_iter()
            .filter_map(|r| r.size_bytes.map(|size| (r, size)))
            .collect();

        let Some(moments) = Moments::of(sized.iter().map(|&(_, size)| size)) else {
            return OutlierReport::default();
        };
        let threshold = moments.threshold(self.deviations);

        let mut outliers: Vec<Outlier> = sized
            .into_iter()
            .filter(|&(_, size)| size > threshold)
            .map(|(r, size)| Outlier {
                folder: r.folder.clone(),
                mailbox: r.mailbox.clone(),
                sequence_id: r.sequence_id,
                uid: r.uid,
                size_bytes: size,
                internal_date: r.internal_date,
            })
            .collect();
        outliers.sort_by(|a, b| {
            a.size_bytes
                .cmp(&b.size_bytes)
                .then_with(|| a.folder.cmp(&b.folder))
                .then_with(|| a.sequence_id.cmp(&b.sequence_id))
        });

        tracing::debug!(
            sample = moments.count,
            threshold,
            outliers = outliers.len(),
            "Outlier detection complete"
        );

        OutlierReport {
            sample_size: moments.count,
            mean: Some(moments.mean()),
            std_dev: Some(moments.std_dev()),
            threshold: Some(threshold),
            outliers,
        }
    }
}

/// Exact count, sum and sum of squares.
#[derive(Debug, Clone, Copy)]
struct Moments {
    count: u64,
    sum: u128,
    sum_sq: u128,
    overflow: bool,
    /// Fallback variance when the exact sums overflow.
    variance_hint: f64,
}

impl Moments {
    fn of(sizes: impl Iterator<Item = u64> + Clone) -> Option<Self> {
        let mut m = Self {
            count: 0,
            sum: 0,
            sum_sq: 0,
            overflow: false,
            variance_hint: 0.0,
        };
        for size in sizes.clone() {
            let wide = u128::from(size);
            m.count += 1;
            m.sum += wide;
            match wide.checked_mul(wide).and_then(|sq| m.sum_sq.checked_add(sq)) {
                Some(sum_sq) => m.sum_sq = sum_sq,
                None => m.overflow = true,
            }
        }
        if m.count == 0 {
            return None;
        }
        if m.overflow {
            m.variance_hint = sorted_variance(sizes, m.mean());
        }
        Some(m)
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean(&self) -> f64 {
        self.sum as f64 / self.count as f64
    }

    #[allow(clippy::cast_precision_loss)]
    fn variance(&self) -> f64 {
        if self.overflow {
            return self.variance_hint;
        }
        let n = u128::from(self.count);
        // n·Σx² ≥ (Σx)² by Cauchy-Schwarz, so this cannot underflow.
        let numerator = n
            .checked_mul(self.sum_sq)
            .zip(self.sum.checked_mul(self.sum))
            .map(|(a, b)| a.saturating_sub(b));
        match numerator {
            Some(num) => num as f64 / (n * n) as f64,
            None => (self.sum_sq as f64 / n as f64) - self.mean().powi(2),
        }
    }

    fn std_dev(&self) -> f64 {
        self.variance().max(0.0).sqrt()
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn threshold(&self, deviations: u32) -> u64 {
        (self.mean() + f64::from(deviations) * self.std_dev()).floor() as u64
    }
}

/// Two-pass variance over sorted sizes, for inputs whose squares overflow.
#[allow(clippy::cast_precision_loss)]
fn sorted_variance(sizes: impl Iterator<Item = u64>, mean: f64) -> f64 {
    let mut sorted: Vec<u64> = sizes.collect();
    sorted.sort_unstable();
    let n = sorted.len() as f64;
    sorted.iter().map(|&x| (x as f64 - mean).powi(2)).sum::<f64>() / n
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mailtally_imap::Flags;

    use super::*;

    fn record(folder: &str, seq: u32, size: Option<u64>) -> MessageRecord {
        MessageRecord {
            sequence_id: seq,
            uid: Some(seq + 1000),
            folder: folder.to_string(),
            mailbox: folder.to_string(),
            size_bytes: size,
            internal_date: None,
            flags: Flags::new(),
        }
    }

    #[test]
    fn empty_input_has_no_threshold() {
        let records: Vec<MessageRecord> = Vec::new();
        let report = OutlierDetector::new().detect(&records);
        assert_eq!(report.threshold, None);
        assert_eq!(report.mean, None);
        assert!(report.outliers.is_empty());
        assert_eq!(OutlierDetector::new().threshold(&[]), None);
    }

    #[test]
    fn unknown_sizes_are_ignored() {
        let records = vec![record("INBOX", 1, None), record("INBOX", 2, None)];
        let report = OutlierDetector::new().detect(&records);
        assert_eq!(report.sample_size, 0);
        assert_eq!(report.threshold, None);
    }

    #[test]
    fn four_message_scenario() {
        let records: Vec<_> = [100, 200, 300, 100_000]
            .into_iter()
            .zip(1..)
            .map(|(size, seq)| record("INBOX", seq, Some(size)))
            .collect();

        let report = OutlierDetector::new().detect(&records);
        assert_eq!(report.sample_size, 4);
        assert!((report.mean.unwrap() - 25_150.0).abs() < 1e-9);
        assert!((report.std_dev.unwrap() - 43_214.7).abs() < 0.1);
        assert_eq!(report.threshold, Some(111_579));
        // With four samples no value can sit more than √3 σ above the mean.
        assert!(report.outliers.is_empty());
    }

    #[test]
    fn identical_sizes_have_no_outliers() {
        let records: Vec<_> = (1..=5).map(|seq| record("INBOX", seq, Some(4096))).collect();
        let report = OutlierDetector::new().detect(&records);
        assert_eq!(report.threshold, Some(4096));
        assert!(report.outliers.is_empty());
    }

    #[test]
    fn outliers_sorted_by_size_then_folder_then_sequence() {
        let mut records: Vec<_> = (1..=100).map(|seq| record("INBOX", seq, Some(1000))).collect();
        records.push(record("Sent", 7, Some(900_000)));
        records.push(record("Archive", 9, Some(900_000)));
        records.push(record("Archive", 3, Some(900_000)));
        records.push(record("INBOX", 101, Some(500_000)));

        let report = OutlierDetector::new().detect(&records);
        let order: Vec<_> = report
            .outliers
            .iter()
            .map(|o| (o.folder.as_str(), o.sequence_id))
            .collect();
        assert_eq!(
            order,
            vec![("INBOX", 101), ("Archive", 3), ("Archive", 9), ("Sent", 7)]
        );
        assert_eq!(report.outliers[0].uid, Some(1101));
    }

    #[test]
    fn result_is_order_independent() {
        let sizes = [7u64, 1_000_000, 12, 33, 5_000, 9, 2_500_000, 40];
        let forward: Vec<_> = sizes
            .iter()
            .zip(1..)
            .map(|(&size, seq)| record("INBOX", seq, Some(size)))
            .collect();
        let mut backward = forward.clone();
        backward.reverse();

        let a = OutlierDetector::new().detect(&forward);
        let b = OutlierDetector::new().detect(&backward);
        assert_eq!(a, b);
    }

    #[test]
    fn huge_sizes_do_not_overflow() {
        let sizes = [u64::MAX, u64::MAX - 1, 0];
        let threshold = OutlierDetector::new().threshold(&sizes).unwrap();
        assert!(threshold > 0);
    }

    #[test]
    fn custom_deviations() {
        let sizes = [0u64, 10];
        assert_eq!(OutlierDetector::with_deviations(0).threshold(&sizes), Some(5));
        assert_eq!(OutlierDetector::with_deviations(1).threshold(&sizes), Some(10));
    }
}
