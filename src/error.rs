//! Error types for kmerstat.
//!
//! Fatal conditions (an unreadable primary input, an unwritable output
//! directory) surface as [`KmerStatError`]. Recoverable problems found while
//! parsing a dump are not errors; they are collected as
//! [`LineIssue`](crate::dump::LineIssue) diagnostics instead.

use std::{path::PathBuf, process::ExitStatus};
use thiserror::Error;

/// Errors that can occur in kmerstat operations.
#[derive(Debug, Error)]
pub enum KmerStatError {
    /// K-mer length is below the minimum of 1.
    #[error("invalid k-mer length {k}: must be at least {min}")]
    InvalidKmerLength { k: usize, min: u32 },

    /// The same k-mer size was configured twice.
    #[error("k-mer size {k} is listed more than once")]
    DuplicateKmerSize { k: usize },

    /// No k-mer sizes were configured.
    #[error("at least one k-mer size is required")]
    EmptyKmerSizes,

    /// Failed to read a sequence file.
    #[error("failed to read sequence file '{path}': {source}")]
    SequenceRead {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to parse a sequence record.
    #[error("failed to parse sequence record in '{path}': {details}")]
    SequenceParse { details: String, path: PathBuf },

    /// Failed to write an output file.
    #[error("failed to write '{path}': {source}")]
    OutputWrite {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to read or write a delimited table.
    #[error("table error for '{path}': {source}")]
    Csv {
        #[source]
        source: csv::Error,
        path: PathBuf,
    },

    /// The external counting tool could not be started.
    #[error("failed to launch '{program}': {source}")]
    ToolSpawn {
        #[source]
        source: std::io::Error,
        program: String,
    },

    /// The external counting tool ran but reported failure.
    #[error("{program} {step} exited with {status}: {stderr}")]
    ToolFailed {
        program: String,
        step: &'static str,
        status: ExitStatus,
        stderr: String,
    },

    /// Failed to render a plot.
    #[error("failed to render plot: {details}")]
    Plot { details: String },

    /// Failed to serialize JSON output.
    #[error("failed to serialize JSON: {source}")]
    JsonError {
        #[source]
        source: serde_json::Error,
    },

    /// A directory held no FASTA files to work on.
    #[error("no FASTA files found in '{dir}'")]
    NoInputFiles { dir: PathBuf },

    /// Failed to decompress gzip file.
    #[error("failed to decompress gzip file '{path}': {source}")]
    Gzip {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// An assembly summary was missing its header or a required column.
    #[error("invalid assembly summary '{path}': {details}")]
    AssemblySummary { details: String, path: PathBuf },
}

impl KmerStatError {
    pub(crate) fn write(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::OutputWrite { source, path }
    }

    pub(crate) fn read(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::SequenceRead { source, path }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>) -> impl FnOnce(csv::Error) -> Self {
        let path = path.into();
        move |source| Self::Csv { source, path }
    }
}

/// Error for invalid k-mer length.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("k-mer length must be at least {min}, got {k}")]
pub struct KmerLengthError {
    /// The invalid k value that was provided.
    pub k: usize,
    /// Minimum valid k-mer length.
    pub min: u32,
}

impl From<serde_json::Error> for KmerStatError {
    fn from(source: serde_json::Error) -> Self {
        Self::JsonError { source }
    }
}

impl From<KmerLengthError> for KmerStatError {
    fn from(err: KmerLengthError) -> Self {
        Self::InvalidKmerLength {
            k: err.k,
            min: err.min,
        }
    }
}

/// Errors that can occur when using the builder API.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// No input FASTA was given.
    #[error("input path not set; call .input() first")]
    InputNotSet,

    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] KmerStatError),
}
