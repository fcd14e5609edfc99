//! # kmerstat
//!
//! K-mer frequency statistics for a genome.
//!
//! The pipeline normalizes a FASTA file to one line per sequence, measures
//! the genome, and for each configured k-mer size runs Jellyfish, parses its
//! dump into a [`FrequencyTable`](table::FrequencyTable), writes CSV and
//! tab-separated tables and plots the most frequent k-mers. A summary row per
//! k-mer size records how many k-mer positions the genome has.
//!
//! Input may be gzip-compressed. The [`assembly`] module downloads genomes
//! picked by accession from an NCBI assembly summary, and [`common`] finds
//! the k-mers shared by a directory of genomes.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use kmerstat::{builder::PipelineBuilder, plot::NoPlot, tool::Jellyfish};
//!
//! let report = PipelineBuilder::new()
//!     .input("genome.fa")
//!     .output_dir("kmers")
//!     .build(Jellyfish::default())?
//!     .run(&mut NoPlot)?;
//! println!("genome length {}", report.genome_length);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Parsing a dump and summarising it without running anything:
//!
//! ```rust
//! use kmerstat::{dump::parse_dump_reader, table::FrequencyTable};
//!
//! let parsed = parse_dump_reader(&b">3\nAAAA\n>5\nCCCC\nGGGG\n"[..]);
//! let table = FrequencyTable::from_entries(parsed.entries);
//! assert_eq!(table.top(1).rows()[0].kmer, "CCCC");
//! ```

pub mod assembly;
pub mod builder;
pub mod cli;
pub mod common;
pub mod config;
pub mod dump;
pub mod error;
pub mod fasta;
pub mod format;
pub mod histogram;
pub mod input;
pub mod kmer;
pub mod plot;
pub mod run;
pub mod table;
pub mod tool;
