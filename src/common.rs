//! K-mers shared by every genome in a collection.
//!
//! Each genome is read with `bio`'s FASTA reader and its k-mers are counted in
//! process. Windows containing `N` are skipped and bases are upper-cased first.
//! Windows never span two records. The running set of shared k-mers is
//! intersected with each genome in turn, and their frequencies are summed
//! across genomes. Once no k-mer is shared by all genomes so far, the
//! remaining genomes are not read.

use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use bio::io::fasta;
use rustc_hash::FxHashMap;
use tracing::{info, warn};

use crate::{
    error::KmerStatError,
    input::{is_fasta_path, open_sequence},
    kmer::KmerLength,
};

/// K-mers present in every processed genome, with summed frequencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonKmers {
    pub k: KmerLength,
    pub genomes_processed: usize,
    pub frequencies: BTreeMap<String, u64>,
}

/// Counts every `N`-free window of length `k` in `seq`, case-insensitively.
pub fn extract_kmers(seq: &[u8], k: KmerLength, counts: &mut FxHashMap<Vec<u8>, u64>) {
    let k = k.get();
    if seq.len() < k {
        return;
    }
    let upper = seq.to_ascii_uppercase();
    for window in upper.windows(k) {
        if window.contains(&b'N') {
            continue;
        }
        *counts.entry(window.to_vec()).or_insert(0) += 1;
    }
}

/// Counts the k-mers of one FASTA genome, plain or gzip-compressed.
pub fn genome_kmers(path: &Path, k: KmerLength) -> Result<FxHashMap<Vec<u8>, u64>, KmerStatError> {
    let reader = open_sequence(path)?;
    let mut counts = FxHashMap::default();
    for record in fasta::Reader::new(reader).records() {
        let record = record.map_err(|e| KmerStatError::SequenceParse {
            details: e.to_string(),
            path: path.to_path_buf(),
        })?;
        extract_kmers(record.seq(), k, &mut counts);
    }
    Ok(counts)
}

/// FASTA files (`.fna`, `.fa`, `.fasta`, optionally `.gz`) directly inside
/// `dir`, sorted by path.
///
/// An unreadable directory entry fails the listing rather than being skipped.
pub fn fasta_files_in(dir: &Path) -> Result<Vec<PathBuf>, KmerStatError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(KmerStatError::read(dir))? {
        let path = entry.map_err(KmerStatError::read(dir))?.path();
        if path.is_file() && is_fasta_path(&path) {
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(KmerStatError::NoInputFiles {
            dir: dir.to_path_buf(),
        });
    }
    files.sort();
    Ok(files)
}

/// Intersects the k-mer content of `genomes`, in the given order.
pub fn common_kmers(genomes: &[PathBuf], k: KmerLength) -> Result<CommonKmers, KmerStatError> {
    let mut shared: Option<FxHashMap<Vec<u8>, u64>> = None;
    let mut genomes_processed = 0;

    for path in genomes {
        let counts = genome_kmers(path, k)?;
        genomes_processed += 1;

        let next = match shared.take() {
            None => counts,
            Some(mut running) => {
                running.retain(|kmer, total| match counts.get(kmer) {
                    Some(count) => {
                        *total += count;
                        true
                    }
                    None => false,
                });
                running
            }
        };
        info!(genome = %path.display(), common = next.len(), "intersected genome");

        let exhausted = next.is_empty();
        shared = Some(next);
        if exhausted {
            warn!("no common k-mers remain; stopping early");
            break;
        }
    }

    let frequencies = shared
        .unwrap_or_default()
        .into_iter()
        .map(|(kmer, freq)| (String::from_utf8_lossy(&kmer).into_owned(), freq))
        .collect();
    Ok(CommonKmers {
        k,
        genomes_processed,
        frequencies,
    })
}

/// Writes a `kmer<TAB>frequency` header and one row per k-mer in sorted order.
pub fn write_common_kmers<W: Write>(common: &CommonKmers, mut out: W) -> std::io::Result<()> {
    writeln!(out, "kmer\tfrequency")?;
    for (kmer, freq) in &common.frequencies {
        writeln!(out, "{kmer}\t{freq}")?;
    }
    out.flush()
}
