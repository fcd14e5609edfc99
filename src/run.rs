//! The k-mer statistics pipeline.
//!
//! [`Pipeline::run`] normalizes the input FASTA, measures the genome, and then
//! for each configured k-mer size, in order:
//!
//! 1. computes the number of k-mer positions,
//! 2. has the [`KmerTool`] count and dump k-mers of that size,
//! 3. parses the dump into a [`FrequencyTable`],
//! 4. if the table has rows, writes `kmer_frequencies_k{k}.csv` and
//!    `kmer_frequencies_k{k}.txt` and plots the most frequent k-mers.
//!
//! Every size gets a [`KmerSummaryRow`], whatever happened to it. A failure of
//! the external tool only ends that size's iteration. Failing to read the input
//! or to write outputs ends the run.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::{error, info, info_span, warn};

use crate::{
    config::PipelineConfig,
    dump::parse_dump,
    error::KmerStatError,
    fasta::{genome_length, normalize_fasta},
    histogram::{histogram_stats, HistogramStats},
    kmer::{count_kmer_positions, KmerLength},
    plot::{BarChart, PlotSink},
    table::{Describe, FrequencyTable},
    tool::KmerTool,
};

/// One row of the cross-size summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KmerSummaryRow {
    pub kmer_size: usize,
    pub number_of_kmers: u64,
}

/// What happened to one k-mer size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SizeOutcome {
    /// Tables and plot were written.
    Written { distinct: usize },
    /// The dump held no k-mers, so nothing was written.
    Empty,
    /// The external tool failed; the dump was not parsed.
    ToolFailed { message: String },
}

/// Per-size result of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeReport {
    #[serde(flatten)]
    pub row: KmerSummaryRow,
    #[serde(flatten)]
    pub outcome: SizeOutcome,
    pub csv: Option<PathBuf>,
    pub txt: Option<PathBuf>,
    pub describe: Option<Describe>,
    pub histogram: Option<HistogramStats>,
    pub malformed_headers: usize,
    pub orphan_lines: usize,
}

impl SizeReport {
    fn new(row: KmerSummaryRow, outcome: SizeOutcome) -> Self {
        Self {
            row,
            outcome,
            csv: None,
            txt: None,
            describe: None,
            histogram: None,
            malformed_headers: 0,
            orphan_lines: 0,
        }
    }
}

/// Result of a complete pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub input: PathBuf,
    pub normalized: PathBuf,
    pub records: usize,
    pub genome_length: u64,
    pub sizes: Vec<SizeReport>,
}

impl PipelineReport {
    /// The cross-size summary, one row per configured size in order.
    pub fn summary_rows(&self) -> Vec<KmerSummaryRow> {
        self.sizes.iter().map(|s| s.row).collect()
    }
}

/// Drives the external tool over every configured k-mer size.
#[derive(Debug, Clone)]
pub struct Pipeline<T> {
    config: PipelineConfig,
    tool: T,
}

impl<T: KmerTool> Pipeline<T> {
    pub const fn new(config: PipelineConfig, tool: T) -> Self {
        Self { config, tool }
    }

    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub const fn tool(&self) -> &T {
        &self.tool
    }

    /// Runs every stage and returns the report.
    pub fn run(&self, plot: &mut dyn PlotSink) -> Result<PipelineReport, KmerStatError> {
        let config = &self.config;
        fs::create_dir_all(&config.output_dir)
            .map_err(KmerStatError::write(&config.output_dir))?;

        let normalized = config.normalized_path();
        let records = normalize_fasta(&config.input, &normalized)?;
        let genome_length = genome_length(&normalized)?;
        info!(records, genome_length, "genome ready");

        let mut sizes = Vec::with_capacity(config.kmer_sizes.len());
        for k in config.kmer_sizes.iter() {
            let _span = info_span!("kmer_size", k = k.get()).entered();
            sizes.push(self.process_size(k, &normalized, genome_length, plot)?);
        }

        Ok(PipelineReport {
            input: config.input.clone(),
            normalized,
            records,
            genome_length,
            sizes,
        })
    }

    fn process_size(
        &self,
        k: KmerLength,
        normalized: &Path,
        genome_length: u64,
        plot: &mut dyn PlotSink,
    ) -> Result<SizeReport, KmerStatError> {
        let row = KmerSummaryRow {
            kmer_size: k.get(),
            number_of_kmers: count_kmer_positions(genome_length, k),
        };
        info!(number_of_kmers = row.number_of_kmers, "k-mer positions");

        let paths = self.config.paths_for(k);
        let counted = self
            .tool
            .count(normalized, k, &paths.index)
            .and_then(|()| self.tool.dump(&paths.index, &paths.dump));
        if let Err(e) = counted {
            error!(error = %e, "k-mer counting failed; skipping this size");
            return Ok(SizeReport::new(
                row,
                SizeOutcome::ToolFailed {
                    message: e.to_string(),
                },
            ));
        }

        let parsed = parse_dump(&paths.dump);
        let table = FrequencyTable::from_entries(parsed.entries);

        if table.is_empty() {
            warn!(dump = %paths.dump.display(), "no k-mers in dump; nothing written");
            let mut report = SizeReport::new(row, SizeOutcome::Empty);
            report.malformed_headers = parsed.malformed_headers.len();
            report.orphan_lines = parsed.orphan_lines.len();
            return Ok(report);
        }

        table.to_csv(&paths.csv)?;
        table.to_delimited_text(&paths.txt)?;
        plot.render(&BarChart::top_kmers(&table, k, self.config.plot_top))?;
        info!(
            distinct = table.len(),
            csv = %paths.csv.display(),
            txt = %paths.txt.display(),
            "wrote k-mer frequencies"
        );

        Ok(SizeReport {
            row,
            outcome: SizeOutcome::Written {
                distinct: table.len(),
            },
            csv: Some(paths.csv),
            txt: Some(paths.txt),
            describe: table.describe(),
            histogram: Some(histogram_stats(&table.group_by_count())),
            malformed_headers: parsed.malformed_headers.len(),
            orphan_lines: parsed.orphan_lines.len(),
        })
    }
}
