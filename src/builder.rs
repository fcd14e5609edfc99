//! Builder API for configuring a pipeline run.
//!
//! # Example
//!
//! ```rust,no_run
//! use kmerstat::builder::PipelineBuilder;
//! use kmerstat::plot::NoPlot;
//! use kmerstat::tool::Jellyfish;
//!
//! let pipeline = PipelineBuilder::new()
//!     .input("genome.fa")
//!     .output_dir("results")
//!     .kmer_sizes([11, 21])?
//!     .plot_top(20)
//!     .build(Jellyfish::default())?;
//!
//! let report = pipeline.run(&mut NoPlot)?;
//! for row in report.summary_rows() {
//!     println!("k={} positions={}", row.kmer_size, row.number_of_kmers);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::PathBuf;

use crate::{
    config::{KmerSizes, PipelineConfig, DEFAULT_PLOT_TOP},
    error::BuilderError,
    run::Pipeline,
    tool::KmerTool,
};

/// Fluent builder for a [`Pipeline`].
///
/// Defaults: output directory `.`, k-mer sizes 11, 15 and 21, top 100 k-mers
/// plotted.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    input: Option<PathBuf>,
    output_dir: PathBuf,
    kmer_sizes: KmerSizes,
    plot_top: usize,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            input: None,
            output_dir: PathBuf::from("."),
            kmer_sizes: KmerSizes::default(),
            plot_top: DEFAULT_PLOT_TOP,
        }
    }

    /// Sets the FASTA file to analyse.
    #[must_use]
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    /// Sets the directory all outputs are written to.
    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the k-mer sizes, processed in the given order.
    ///
    /// # Errors
    ///
    /// Fails if the list is empty, repeats a size, or holds a 0.
    pub fn kmer_sizes(
        mut self,
        sizes: impl IntoIterator<Item = usize>,
    ) -> Result<Self, BuilderError> {
        self.kmer_sizes = KmerSizes::from_lengths(sizes)?;
        Ok(self)
    }

    /// Sets how many k-mers are plotted per size.
    #[must_use]
    pub const fn plot_top(mut self, n: usize) -> Self {
        self.plot_top = n;
        self
    }

    /// The configuration built so far.
    pub fn config(&self) -> Result<PipelineConfig, BuilderError> {
        let input = self.input.clone().ok_or(BuilderError::InputNotSet)?;
        Ok(PipelineConfig {
            input,
            output_dir: self.output_dir.clone(),
            kmer_sizes: self.kmer_sizes.clone(),
            plot_top: self.plot_top,
        })
    }

    /// Builds a pipeline that counts with `tool`.
    pub fn build<T: KmerTool>(self, tool: T) -> Result<Pipeline<T>, BuilderError> {
        Ok(Pipeline::new(self.config()?, tool))
    }
}
