//! Fetching genomes listed in an NCBI assembly summary.
//!
//! `assembly_summary_genbank.txt` is tab-separated. Its column names live on a
//! comment line starting with `#assembly_accession`; other `#` lines are
//! skipped. Only the `assembly_accession` and `ftp_path` columns are used.
//!
//! For an accession `GCA_000001405.29` with
//! `ftp_path = https://ftp.ncbi.nlm.nih.gov/.../GCA_000001405.29_GRCh38.p14`
//! the genome is `{ftp_path}/GCA_000001405.29_GRCh38.p14_genomic.fna.gz` and
//! is saved as `{accession}_{asm_name}_genomic.fna.gz`.

use std::{
    collections::HashSet,
    ffi::OsString,
    fmt, fs,
    io::BufRead,
    path::{Path, PathBuf},
    process::Command,
};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::{
    error::KmerStatError,
    input::{gunzip_file, is_gzip_path, open_sequence},
};

/// Name of the per-run download report written into the download directory.
pub const DOWNLOAD_SUMMARY_FILE: &str = "download_summary.csv";

const HEADER_PREFIX: &str = "#assembly_accession";
const ACCESSION_COLUMN: &str = "assembly_accession";
const FTP_COLUMN: &str = "ftp_path";

/// One assembly from the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyRecord {
    pub accession: String,
    pub ftp_path: String,
}

impl AssemblyRecord {
    /// Last path segment of `ftp_path`.
    pub fn asm_name(&self) -> &str {
        self.ftp_path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }

    /// URL of the genomic FASTA for this assembly.
    pub fn genome_url(&self) -> String {
        format!(
            "{}/{}_genomic.fna.gz",
            self.ftp_path.trim_end_matches('/'),
            self.asm_name()
        )
    }

    /// File name the genome is saved under.
    pub fn local_file_name(&self) -> String {
        format!("{}_{}_genomic.fna.gz", self.accession, self.asm_name())
    }
}

fn summary_error(path: &Path, details: impl Into<String>) -> KmerStatError {
    KmerStatError::AssemblySummary {
        details: details.into(),
        path: path.to_path_buf(),
    }
}

fn present(field: Option<&str>) -> Option<&str> {
    field
        .map(str::trim)
        .filter(|f| !f.is_empty() && *f != "na")
}

/// Reads an assembly summary from `reader`. `path` is only used in errors.
///
/// Rows lacking an accession or an FTP path (empty or `na`) are dropped.
pub fn read_assembly_summary<R: BufRead>(
    mut reader: R,
    path: &Path,
) -> Result<Vec<AssemblyRecord>, KmerStatError> {
    let mut line = String::new();
    let columns: Vec<String> = loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .map_err(KmerStatError::read(path))?;
        if read == 0 {
            return Err(summary_error(
                path,
                format!("no header line starting with '{HEADER_PREFIX}'"),
            ));
        }
        if line.starts_with(HEADER_PREFIX) {
            break line
                .trim_start_matches('#')
                .trim_end()
                .split('\t')
                .map(|c| c.trim().to_string())
                .collect();
        }
    };

    let column = |name: &str| {
        columns.iter().position(|c| c == name).ok_or_else(|| {
            summary_error(path, format!("missing column '{name}', found {columns:?}"))
        })
    };
    let (acc_idx, ftp_idx) = (column(ACCESSION_COLUMN)?, column(FTP_COLUMN)?);

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row.map_err(KmerStatError::csv(path))?;
        match (present(row.get(acc_idx)), present(row.get(ftp_idx))) {
            (Some(accession), Some(ftp_path)) => records.push(AssemblyRecord {
                accession: accession.to_string(),
                ftp_path: ftp_path.to_string(),
            }),
            _ => debug!(?row, "skipping assembly without accession or ftp path"),
        }
    }
    Ok(records)
}

/// Loads an assembly summary file, plain or `.gz`.
pub fn load_assembly_summary(path: &Path) -> Result<Vec<AssemblyRecord>, KmerStatError> {
    let records = read_assembly_summary(open_sequence(path)?, path)?;
    info!(assemblies = records.len(), path = %path.display(), "loaded assembly summary");
    Ok(records)
}

/// Keeps the records whose accession is in `accessions`, in summary order.
///
/// Requested accessions that the summary does not list are logged.
pub fn filter_accessions(
    records: Vec<AssemblyRecord>,
    accessions: &[String],
) -> Vec<AssemblyRecord> {
    let wanted: HashSet<&str> = accessions.iter().map(String::as_str).collect();
    let selected: Vec<_> = records
        .into_iter()
        .filter(|r| wanted.contains(r.accession.as_str()))
        .collect();

    let found: HashSet<&str> = selected.iter().map(|r| r.accession.as_str()).collect();
    for missing in accessions.iter().filter(|a| !found.contains(a.as_str())) {
        warn!(accession = %missing, "accession not in assembly summary");
    }
    info!(selected = selected.len(), "filtered assemblies");
    selected
}

/// Something that can copy a URL to a local file.
pub trait Fetcher {
    fn fetch(&self, url: &str, out: &Path) -> Result<(), KmerStatError>;
}

/// Downloads with `wget -q -O {out} {url}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wget {
    pub binary: PathBuf,
}

impl Default for Wget {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("wget"),
        }
    }
}

impl Wget {
    pub fn args(url: &str, out: &Path) -> Vec<OsString> {
        vec!["-q".into(), "-O".into(), out.into(), url.into()]
    }
}

impl Fetcher for Wget {
    fn fetch(&self, url: &str, out: &Path) -> Result<(), KmerStatError> {
        let program = self.binary.display().to_string();
        debug!(%program, url, "running download");
        let output = Command::new(&self.binary)
            .args(Self::args(url, out))
            .output()
            .map_err(|source| KmerStatError::ToolSpawn {
                source,
                program: program.clone(),
            })?;
        if !output.status.success() {
            return Err(KmerStatError::ToolFailed {
                program,
                step: "download",
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// What happened to one assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    /// A non-empty file was already in place.
    AlreadyExists,
    Downloaded,
    Failed,
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AlreadyExists => "already exists",
            Self::Downloaded => "downloaded",
            Self::Failed => "failed",
        })
    }
}

/// One row of the download summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadRecord {
    pub assembly_accession: String,
    pub asm_name: String,
    pub ftp_url: String,
    pub local_file: PathBuf,
    pub status: DownloadStatus,
}

fn already_present(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| m.len() > 0)
}

/// Downloads each assembly's genome into `dir`, creating it if needed.
///
/// Existing non-empty files are not fetched again. A failed download is
/// recorded as [`DownloadStatus::Failed`] and the remaining assemblies are
/// still attempted.
pub fn download_genomes<F: Fetcher>(
    records: &[AssemblyRecord],
    dir: &Path,
    fetcher: &F,
) -> Result<Vec<DownloadRecord>, KmerStatError> {
    fs::create_dir_all(dir).map_err(KmerStatError::write(dir))?;

    let mut results = Vec::with_capacity(records.len());
    for record in records {
        let url = record.genome_url();
        let local_file = dir.join(record.local_file_name());

        let status = if already_present(&local_file) {
            info!(file = %local_file.display(), "skipping existing file");
            DownloadStatus::AlreadyExists
        } else {
            match fetcher.fetch(&url, &local_file) {
                Ok(()) => {
                    info!(%url, "downloaded");
                    DownloadStatus::Downloaded
                }
                Err(e) => {
                    error!(%url, error = %e, "download failed");
                    DownloadStatus::Failed
                }
            }
        };

        results.push(DownloadRecord {
            assembly_accession: record.accession.clone(),
            asm_name: record.asm_name().to_string(),
            ftp_url: url,
            local_file,
            status,
        });
    }
    Ok(results)
}

/// Writes the download summary as CSV.
pub fn write_download_summary(
    records: &[DownloadRecord],
    path: &Path,
) -> Result<(), KmerStatError> {
    let mut wtr = csv::Writer::from_path(path).map_err(KmerStatError::csv(path))?;
    for record in records {
        wtr.serialize(record).map_err(KmerStatError::csv(path))?;
    }
    wtr.flush().map_err(KmerStatError::write(path))?;
    info!(path = %path.display(), "wrote download summary");
    Ok(())
}

/// Decompresses every non-empty `.gz` file directly inside `dir`, keeping
/// the originals. Returns the decompressed paths in sorted order.
pub fn unzip_gz_files(dir: &Path) -> Result<Vec<PathBuf>, KmerStatError> {
    let mut packed = Vec::new();
    for entry in fs::read_dir(dir).map_err(KmerStatError::read(dir))? {
        let path = entry.map_err(KmerStatError::read(dir))?.path();
        if !(path.is_file() && is_gzip_path(&path)) {
            continue;
        }
        if already_present(&path) {
            packed.push(path);
        } else {
            warn!(file = %path.display(), "skipping empty download");
        }
    }
    packed.sort();

    let mut unpacked = Vec::with_capacity(packed.len());
    for path in packed {
        let target = gunzip_file(&path)?;
        info!(from = %path.display(), to = %target.display(), "unzipped");
        unpacked.push(target);
    }
    Ok(unpacked)
}
