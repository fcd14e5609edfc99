use std::{
    fs::File,
    io::{self, BufWriter, Write},
    process,
};

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use kmerstat::{
    assembly::{
        download_genomes, filter_accessions, load_assembly_summary, unzip_gz_files,
        write_download_summary, DownloadStatus, Wget, DOWNLOAD_SUMMARY_FILE,
    },
    cli::{AnalyzeArgs, Cli, Command, CommonArgs, FetchArgs},
    common::{common_kmers, fasta_files_in, write_common_kmers},
    config::PipelineConfig,
    error::KmerStatError,
    format::write_report,
    plot::sink_for,
    run::Pipeline,
    tool::Jellyfish,
};

fn init_tracing(quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if quiet { "warn" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn write_banner<W: Write>(mut out: W, config: &PipelineConfig) -> io::Result<()> {
    let sizes: Vec<_> = config.kmer_sizes.iter().map(|k| k.to_string()).collect();
    writeln!(out, "{}: {}", "k-mer sizes".bold(), sizes.join(",").blue().bold())?;
    writeln!(
        out,
        "{}: {}",
        "data".bold(),
        config.input.display().to_string().underline().bold().blue()
    )?;
    writeln!(
        out,
        "{}: {}",
        "output".bold(),
        config.output_dir.display().to_string().blue().bold()
    )?;
    writeln!(out)
}

fn analyze(args: &AnalyzeArgs, quiet: bool) -> Result<(), KmerStatError> {
    let config = PipelineConfig::try_from(args)?;
    let jellyfish = Jellyfish::from(args);

    if !quiet {
        // Keep stdout parseable when the report is TSV or JSON.
        let banner = if args.format.is_machine_readable() {
            write_banner(io::stderr().lock(), &config)
        } else {
            write_banner(io::stdout().lock(), &config)
        };
        banner.map_err(|source| KmerStatError::OutputWrite {
            source,
            path: "<terminal>".into(),
        })?;
    }

    let mut plot = sink_for(args.plot, &config.output_dir, args.format);
    let report = Pipeline::new(config, jellyfish).run(&mut *plot)?;
    write_report(&report, args.format, io::stdout().lock())
}

fn common(args: &CommonArgs) -> Result<(), KmerStatError> {
    let genomes = fasta_files_in(&args.dir)?;
    let shared = common_kmers(&genomes, args.k)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|source| KmerStatError::OutputWrite {
                source,
                path: path.clone(),
            })?;
            write_common_kmers(&shared, BufWriter::new(file)).map_err(|source| {
                KmerStatError::OutputWrite {
                    source,
                    path: path.clone(),
                }
            })?;
            println!(
                "{} {} common k-mers (k={}) across {} genomes to {}",
                "Saved".bold(),
                shared.frequencies.len(),
                args.k,
                shared.genomes_processed,
                path.display().to_string().blue()
            );
        }
        None => {
            write_common_kmers(&shared, io::stdout().lock())
                .map_err(|source| KmerStatError::OutputWrite {
                    source,
                    path: "<stdout>".into(),
                })?;
        }
    }
    Ok(())
}

fn fetch(args: &FetchArgs) -> Result<(), KmerStatError> {
    let assemblies = filter_accessions(load_assembly_summary(&args.summary)?, &args.accessions);
    let wget = Wget {
        binary: args.wget.clone(),
    };
    let downloads = download_genomes(&assemblies, &args.output_dir, &wget)?;
    write_download_summary(&downloads, &args.output_dir.join(DOWNLOAD_SUMMARY_FILE))?;

    for download in &downloads {
        let status = match download.status {
            DownloadStatus::Failed => download.status.to_string().red(),
            _ => download.status.to_string().green(),
        };
        println!("{}\t{}", download.assembly_accession.bold(), status);
    }

    if !args.no_unzip {
        unzip_gz_files(&args.output_dir)?;
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let result = match &cli.command {
        Command::Analyze(args) => analyze(args, cli.quiet),
        Command::Common(args) => common(args),
        Command::Fetch(args) => fetch(args),
    };

    if let Err(e) = result {
        eprintln!(
            "{}\n {}",
            "Application error:".blue().bold(),
            e.to_string().blue()
        );
        process::exit(1);
    }
}
