//! In-memory k-mer frequency tables.
//!
//! A [`FrequencyTable`] keeps `(kmer, count)` rows in the order they were
//! parsed. Duplicated k-mers are kept as separate rows.

use std::{fmt, io::Write, path::Path};

use serde::Serialize;

use crate::{
    dump::DumpEntry,
    error::KmerStatError,
    histogram::{compute_histogram, KmerHistogram},
};

/// Ordered collection of [`DumpEntry`] rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    rows: Vec<DumpEntry>,
}

impl FrequencyTable {
    /// Builds a table that keeps `entries` in their given order.
    pub fn from_entries(entries: impl IntoIterator<Item = DumpEntry>) -> Self {
        Self {
            rows: entries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[DumpEntry] {
        &self.rows
    }

    /// Sum of the count column.
    pub fn total_count(&self) -> u64 {
        self.rows.iter().map(|r| r.count).sum()
    }

    /// Sorts rows by count, highest first. Rows with equal counts keep their
    /// relative order.
    pub fn sort_by_count_desc(&mut self) {
        self.rows.sort_by(|a, b| b.count.cmp(&a.count));
    }

    /// Returns a copy of this table sorted by count, highest first.
    #[must_use]
    pub fn sorted_by_count_desc(&self) -> Self {
        let mut sorted = self.clone();
        sorted.sort_by_count_desc();
        sorted
    }

    /// The `n` rows with the highest counts, or every row if there are fewer
    /// than `n`.
    #[must_use]
    pub fn top(&self, n: usize) -> Self {
        let mut sorted = self.sorted_by_count_desc();
        sorted.rows.truncate(n);
        sorted
    }

    /// Number of rows sharing each count value.
    pub fn group_by_count(&self) -> KmerHistogram {
        compute_histogram(&self.rows)
    }

    /// Descriptive statistics of the count column, or `None` for an empty
    /// table.
    pub fn describe(&self) -> Option<Describe> {
        Describe::of(self.rows.iter().map(|r| r.count))
    }

    /// Writes rows as CSV with a `kmer,count` header.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        self.serialize_rows(&mut wtr)
    }

    /// Writes rows as `kmer<TAB>count` lines without a header.
    pub fn write_delimited_text<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = tab_writer().from_writer(writer);
        self.serialize_rows(&mut wtr)
    }

    /// Writes the table to a CSV file at `path`.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), KmerStatError> {
        let path = path.as_ref();
        let mut wtr = csv::Writer::from_path(path).map_err(KmerStatError::csv(path))?;
        self.serialize_rows(&mut wtr).map_err(KmerStatError::csv(path))
    }

    /// Writes the table to a tab-separated text file at `path`.
    pub fn to_delimited_text<P: AsRef<Path>>(&self, path: P) -> Result<(), KmerStatError> {
        let path = path.as_ref();
        let mut wtr = tab_writer().from_path(path).map_err(KmerStatError::csv(path))?;
        self.serialize_rows(&mut wtr).map_err(KmerStatError::csv(path))
    }

    /// Reads a table back from a CSV file written by [`to_csv`](Self::to_csv).
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self, KmerStatError> {
        let path = path.as_ref();
        let mut rdr = csv::Reader::from_path(path).map_err(KmerStatError::csv(path))?;
        let rows = rdr
            .deserialize()
            .collect::<Result<Vec<DumpEntry>, _>>()
            .map_err(KmerStatError::csv(path))?;
        Ok(Self { rows })
    }

    fn serialize_rows<W: Write>(&self, wtr: &mut csv::Writer<W>) -> Result<(), csv::Error> {
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl From<Vec<DumpEntry>> for FrequencyTable {
    fn from(rows: Vec<DumpEntry>) -> Self {
        Self { rows }
    }
}

fn tab_writer() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder.delimiter(b'\t').has_headers(false);
    builder
}

/// Descriptive statistics over a count column.
///
/// Quartiles use linear interpolation between the closest ranks and `std` is
/// the sample standard deviation, which is undefined for a single value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: u64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: u64,
}

impl Describe {
    #[allow(clippy::cast_precision_loss)]
    fn of(values: impl Iterator<Item = u64>) -> Option<Self> {
        let mut sorted: Vec<u64> = values.collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_unstable();

        let n = sorted.len();
        let mean = sorted.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
        let std = (n > 1).then(|| {
            let ss: f64 = sorted.iter().map(|&v| (v as f64 - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        });

        Some(Self {
            count: n,
            mean,
            std,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted[n - 1],
        })
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn quantile(sorted: &[u64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let (a, b) = (sorted[lo] as f64, sorted[hi] as f64);
    a + (b - a) * (pos - lo as f64)
}

impl fmt::Display for Describe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "count {:>14}", self.count)?;
        writeln!(f, "mean  {:>14.6}", self.mean)?;
        match self.std {
            Some(std) => writeln!(f, "std   {std:>14.6}")?,
            None => writeln!(f, "std   {:>14}", "NaN")?,
        }
        writeln!(f, "min   {:>14}", self.min)?;
        writeln!(f, "25%   {:>14.6}", self.q25)?;
        writeln!(f, "50%   {:>14.6}", self.median)?;
        writeln!(f, "75%   {:>14.6}", self.q75)?;
        write!(f, "max   {:>14}", self.max)
    }
}
