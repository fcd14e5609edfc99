use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    cli::AnalyzeArgs,
    error::KmerStatError,
    input::sequence_stem,
    kmer::KmerLength,
    tool::Jellyfish,
};

/// K-mer sizes analysed when none are given.
pub const DEFAULT_KMER_SIZES: [usize; 3] = [11, 15, 21];

/// K-mer length used by `common` when none is given.
pub const DEFAULT_COMMON_K: usize = 11;

/// Number of k-mers plotted per size when not configured.
pub const DEFAULT_PLOT_TOP: usize = 100;

/// Ordered, non-empty list of distinct k-mer sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmerSizes(Vec<KmerLength>);

impl KmerSizes {
    pub fn new(sizes: impl IntoIterator<Item = KmerLength>) -> Result<Self, KmerStatError> {
        let sizes: Vec<_> = sizes.into_iter().collect();
        if sizes.is_empty() {
            return Err(KmerStatError::EmptyKmerSizes);
        }
        let mut seen = HashSet::new();
        for k in &sizes {
            if !seen.insert(*k) {
                return Err(KmerStatError::DuplicateKmerSize { k: k.get() });
            }
        }
        Ok(Self(sizes))
    }

    /// Validates raw lengths, then builds the list.
    pub fn from_lengths(sizes: impl IntoIterator<Item = usize>) -> Result<Self, KmerStatError> {
        let sizes = sizes
            .into_iter()
            .map(KmerLength::new)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(sizes)
    }

    pub fn iter(&self) -> impl Iterator<Item = KmerLength> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for KmerSizes {
    fn default() -> Self {
        Self(default_kmer_sizes())
    }
}

/// [`DEFAULT_KMER_SIZES`] as validated lengths.
pub fn default_kmer_sizes() -> Vec<KmerLength> {
    DEFAULT_KMER_SIZES
        .iter()
        .filter_map(|&k| KmerLength::new(k).ok())
        .collect()
}

/// [`DEFAULT_COMMON_K`] as a validated length.
pub fn default_common_k() -> KmerLength {
    KmerLength::new(DEFAULT_COMMON_K).unwrap_or(KmerLength::MIN)
}

/// Everything the pipeline needs to know about one run.
///
/// Every path the pipeline writes is derived from `output_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub kmer_sizes: KmerSizes,
    pub plot_top: usize,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            kmer_sizes: KmerSizes::default(),
            plot_top: DEFAULT_PLOT_TOP,
        }
    }

    /// Path of the normalized copy of the input.
    pub fn normalized_path(&self) -> PathBuf {
        let stem =
            sequence_stem(&self.input).map_or_else(|| "genome".into(), |s| s.to_string_lossy());
        self.output_dir.join(format!("{stem}.normalized.fa"))
    }

    /// File names used for one k-mer size.
    pub fn paths_for(&self, k: KmerLength) -> SizePaths {
        SizePaths::new(&self.output_dir, k)
    }
}

/// Files produced for a single k-mer size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizePaths {
    pub index: PathBuf,
    pub dump: PathBuf,
    pub csv: PathBuf,
    pub txt: PathBuf,
}

impl SizePaths {
    pub fn new(dir: &Path, k: KmerLength) -> Self {
        Self {
            index: dir.join(format!("mer_counts_k{k}.jf")),
            dump: dir.join(format!("mer_counts_dumps_k{k}.fa")),
            csv: dir.join(format!("kmer_frequencies_k{k}.csv")),
            txt: dir.join(format!("kmer_frequencies_k{k}.txt")),
        }
    }
}

impl TryFrom<&AnalyzeArgs> for PipelineConfig {
    type Error = KmerStatError;

    fn try_from(args: &AnalyzeArgs) -> Result<Self, Self::Error> {
        fs::metadata(&args.input).map_err(KmerStatError::read(&args.input))?;
        Ok(Self {
            input: args.input.clone(),
            output_dir: args.output_dir.clone(),
            kmer_sizes: KmerSizes::new(args.kmer_sizes.iter().copied())?,
            plot_top: args.top,
        })
    }
}

impl From<&AnalyzeArgs> for Jellyfish {
    fn from(args: &AnalyzeArgs) -> Self {
        Self {
            binary: args.jellyfish.clone(),
            memory_hint: args.memory.clone(),
            canonical: !args.no_canonical,
            threads: args.threads,
        }
    }
}
