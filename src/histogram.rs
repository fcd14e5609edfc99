//! K-mer count histograms (count of counts).
//!
//! # Example
//!
//! ```rust
//! use kmerstat::dump::DumpEntry;
//! use kmerstat::histogram::compute_histogram;
//!
//! let entries = [
//!     DumpEntry::new("ACG", 1),
//!     DumpEntry::new("CGT", 1),
//!     DumpEntry::new("GTA", 2),
//! ];
//! let histogram = compute_histogram(&entries);
//!
//! assert_eq!(histogram.get(&1), Some(&2));
//! assert_eq!(histogram.get(&2), Some(&1));
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dump::DumpEntry;

/// Maps a count value to the number of rows carrying it, in ascending count
/// order.
pub type KmerHistogram = BTreeMap<u64, u64>;

/// Summary statistics for a k-mer histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramStats {
    /// Sum of all counts.
    pub total_kmers: u64,
    /// Number of rows.
    pub distinct_kmers: u64,
    /// The count value shared by the most rows. Ties go to the smaller count.
    pub mode_count: u64,
    /// Number of rows with `mode_count`.
    pub mode_frequency: u64,
    /// `total_kmers / distinct_kmers`, or 0 for an empty histogram.
    pub mean_count: f64,
}

/// Builds the count-of-counts histogram of `entries`.
///
/// Duplicate k-mers are not merged; each row contributes once.
pub fn compute_histogram(entries: &[DumpEntry]) -> KmerHistogram {
    let mut histogram = BTreeMap::new();
    for entry in entries {
        *histogram.entry(entry.count).or_insert(0) += 1;
    }
    histogram
}

/// Computes summary statistics for a histogram.
#[must_use]
pub fn histogram_stats(histogram: &KmerHistogram) -> HistogramStats {
    let distinct: u64 = histogram.values().sum();
    let total: u64 = histogram.iter().map(|(c, f)| c * f).sum();

    let (mode_count, mode_frequency) = histogram
        .iter()
        .fold(None, |best: Option<(u64, u64)>, (&c, &f)| match best {
            Some((_, bf)) if bf >= f => best,
            _ => Some((c, f)),
        })
        .unwrap_or((0, 0));

    HistogramStats {
        total_kmers: total,
        distinct_kmers: distinct,
        mode_count,
        mode_frequency,
        #[allow(clippy::cast_precision_loss)]
        mean_count: if distinct > 0 {
            total as f64 / distinct as f64
        } else {
            0.0
        },
    }
}
