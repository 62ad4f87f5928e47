//! Quota percentages and byte formatting.

pub use mailtally_imap::QuotaInfo;

const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

/// Rounds to two decimals.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of the quota in use. `None` when the limit is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn usage_percent(quota: &QuotaInfo) -> Option<f64> {
    (quota.total_kib != 0).then(|| round2(100.0 * quota.used_kib as f64 / quota.total_kib as f64))
}

/// A folder's share of the used quota. `None` when nothing is used.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn folder_share(folder_bytes: u64, quota: &QuotaInfo) -> Option<f64> {
    (quota.used_kib != 0)
        .then(|| round2(100.0 * folder_bytes as f64 / (1024.0 * quota.used_kib as f64)))
}

/// Renders a byte count with binary units, e.g. `1.50 MiB`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}
