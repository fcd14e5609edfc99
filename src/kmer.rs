//! K-mer lengths and position arithmetic.

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::KmerLengthError;

/// Minimum supported k-mer length.
pub const MIN_K: u32 = 1;

/// A validated, positive k-mer length.
///
/// There is no upper bound here; the counting tool enforces its own.
///
/// # Example
///
/// ```rust
/// use kmerstat::kmer::KmerLength;
///
/// let k = KmerLength::new(21)?;
/// assert_eq!(k.get(), 21);
/// assert!(KmerLength::new(0).is_err());
/// assert_eq!("45".parse::<KmerLength>().map(KmerLength::get), Ok(45));
/// # Ok::<(), kmerstat::error::KmerLengthError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct KmerLength(u32);

impl KmerLength {
    /// The shortest k-mer, a single base.
    pub const MIN: Self = Self(MIN_K);

    /// Validates `k` and wraps it.
    pub fn new(k: usize) -> Result<Self, KmerLengthError> {
        match u32::try_from(k) {
            Ok(v) if v >= MIN_K => Ok(Self(v)),
            _ => Err(KmerLengthError { k, min: MIN_K }),
        }
    }

    /// The length as a `usize`.
    pub const fn get(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for KmerLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses command-line k-mer lengths.
impl FromStr for KmerLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let k: usize = s
            .trim()
            .parse()
            .map_err(|_| format!("'{s}' is not a valid number"))?;
        Self::new(k).map_err(|e| e.to_string())
    }
}

/// Number of k-mer start positions in a sequence of `genome_length` bases.
///
/// `genome_length - k + 1` when the genome is at least `k` long, otherwise 0.
///
/// ```rust
/// use kmerstat::kmer::{count_kmer_positions, KmerLength};
///
/// let k = KmerLength::new(10)?;
/// assert_eq!(count_kmer_positions(20, k), 11);
/// assert_eq!(count_kmer_positions(9, k), 0);
/// # Ok::<(), kmerstat::error::KmerLengthError>(())
/// ```
pub fn count_kmer_positions(genome_length: u64, k: KmerLength) -> u64 {
    let k = u64::from(k.0);
    let positions = if genome_length >= k {
        genome_length - k + 1
    } else {
        0
    };
    tracing::debug!(genome_length, k, positions, "counted k-mer positions");
    positions
}
