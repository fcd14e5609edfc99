//! Command-line interface definition.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::{
    config::{default_common_k, default_kmer_sizes, DEFAULT_PLOT_TOP},
    format::ReportFormat,
    kmer::KmerLength,
    plot::PlotMode,
    tool::DEFAULT_MEMORY_HINT,
};

/// K-mer frequency statistics for a genome, counted with Jellyfish.
#[derive(Parser, Debug)]
#[command(name = "kmerstat")]
#[command(version, author, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Normalize a FASTA file and report k-mer frequencies for each k-mer size
    Analyze(AnalyzeArgs),
    /// Find the k-mers shared by every genome in a directory
    Common(CommonArgs),
    /// Download selected genomes listed in an NCBI assembly summary
    Fetch(FetchArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Path to a FASTA file
    pub input: PathBuf,

    /// Comma-separated k-mer sizes (at least 1), processed in order
    #[arg(
        short,
        long = "kmer-sizes",
        value_delimiter = ',',
        default_values_t = default_kmer_sizes()
    )]
    pub kmer_sizes: Vec<KmerLength>,

    /// Directory for every file the run produces
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Jellyfish executable
    #[arg(long, default_value = "jellyfish")]
    pub jellyfish: PathBuf,

    /// Hash size hint for `jellyfish count -s`
    #[arg(short, long, default_value = DEFAULT_MEMORY_HINT)]
    pub memory: String,

    /// Threads for `jellyfish count`
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Count k-mers and their reverse complements separately
    #[arg(long)]
    pub no_canonical: bool,

    /// Number of k-mers to plot per size
    #[arg(long, default_value_t = DEFAULT_PLOT_TOP)]
    pub top: usize,

    /// Where to send the plots
    #[arg(short, long, value_enum, default_value = "terminal")]
    pub plot: PlotMode,

    /// Format of the cross-size summary
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: ReportFormat,
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Directory of FASTA genomes (.fna, .fa, .fasta, optionally gzipped)
    pub dir: PathBuf,

    /// K-mer length (at least 1)
    #[arg(short, default_value_t = default_common_k())]
    pub k: KmerLength,

    /// Output file; standard output when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Path to assembly_summary_genbank.txt (or .txt.gz)
    pub summary: PathBuf,

    /// Comma-separated assembly accessions to download
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub accessions: Vec<String>,

    /// Download directory
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// wget executable
    #[arg(long, default_value = "wget")]
    pub wget: PathBuf,

    /// Keep the downloads compressed instead of unzipping them
    #[arg(long)]
    pub no_unzip: bool,
}
