//! FASTA normalization and genome length.
//!
//! [`normalize_fasta`] rewrites a multi-line FASTA file so that every record
//! occupies exactly two lines: the header, then the whole sequence. Headers are
//! kept verbatim (after trimming surrounding whitespace) and body lines are
//! concatenated in their original order.
//!
//! ```rust
//! use kmerstat::fasta::normalize_reader;
//!
//! let mut out = Vec::new();
//! let records = normalize_reader(&b">chr1\nACGT\nTTGA\n>chr2\nGG\n"[..], &mut out)?;
//! assert_eq!(records, 2);
//! assert_eq!(out, b">chr1\nACGTTTGA\n>chr2\nGG\n");
//! # Ok::<(), std::io::Error>(())
//! ```

use std::{
    fs::File,
    io::{self, BufRead, BufWriter, Write},
    path::Path,
};

use tracing::{debug, error, info};

use crate::{error::KmerStatError, input::open_sequence};

/// One FASTA record with its sequence joined onto a single line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FastaRecord {
    /// Header line, including the leading `>`.
    pub header: String,
    /// Concatenated sequence, without line breaks.
    pub sequence: String,
}

impl FastaRecord {
    fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.header)?;
        writeln!(out, "{}", self.sequence)
    }
}

/// Iterator that groups the lines of a FASTA stream into [`FastaRecord`]s.
///
/// A record is held in `pending` until the next header or the end of input
/// shows it is complete. Body lines appearing before the first header have no
/// record to belong to and are dropped.
pub struct FastaRecords<R> {
    lines: io::Lines<R>,
    pending: Option<FastaRecord>,
    done: bool,
}

impl<R: BufRead> FastaRecords<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            pending: None,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for FastaRecords<R> {
    type Item = io::Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.lines.next() {
                Some(Ok(line)) => {
                    let line = line.trim();
                    if line.starts_with('>') {
                        let started = FastaRecord {
                            header: line.to_string(),
                            sequence: String::new(),
                        };
                        if let Some(flushed) = self.pending.replace(started) {
                            return Some(Ok(flushed));
                        }
                    } else if let Some(record) = self.pending.as_mut() {
                        record.sequence.push_str(line);
                    } else if !line.is_empty() {
                        debug!(line, "dropping sequence line before first header");
                    }
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    return self.pending.take().map(Ok);
                }
            }
        }
    }
}

/// Normalizes FASTA text from `reader` into `writer`, returning the number of
/// records written.
pub fn normalize_reader<R: BufRead, W: Write>(reader: R, mut writer: W) -> io::Result<usize> {
    let mut records = 0;
    for record in FastaRecords::new(reader) {
        record?.write_to(&mut writer)?;
        records += 1;
    }
    writer.flush()?;
    Ok(records)
}

/// Normalizes the FASTA file at `input` into a new file at `output`. A `.gz`
/// input is decompressed while reading.
///
/// An input with no header lines produces an empty output file.
pub fn normalize_fasta<P, Q>(input: P, output: Q) -> Result<usize, KmerStatError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (input, output) = (input.as_ref(), output.as_ref());
    let reader = open_sequence(input)?;
    let mut writer = File::create(output)
        .map(BufWriter::new)
        .map_err(KmerStatError::write(output))?;

    let mut records = 0;
    for record in FastaRecords::new(reader) {
        let record = record.map_err(KmerStatError::read(input))?;
        record
            .write_to(&mut writer)
            .map_err(KmerStatError::write(output))?;
        records += 1;
    }
    writer.flush().map_err(KmerStatError::write(output))?;

    info!(
        records,
        input = %input.display(),
        output = %output.display(),
        "normalized FASTA"
    );
    Ok(records)
}

/// Sum of the trimmed lengths of all non-header lines in `reader`.
///
/// On a read error the error is returned together with the partial sum.
fn sum_sequence_lengths<R: BufRead>(reader: R) -> Result<u64, (u64, io::Error)> {
    let mut total = 0u64;
    for line in reader.lines() {
        let line = line.map_err(|e| (total, e))?;
        let line = line.trim();
        if !line.starts_with('>') {
            total += line.len() as u64;
        }
    }
    Ok(total)
}

/// Total sequence length of a (normalized) FASTA file.
///
/// Read failures are returned as errors, so an `Ok(0)` always means the file
/// holds no sequence.
pub fn genome_length<P: AsRef<Path>>(path: P) -> Result<u64, KmerStatError> {
    let path = path.as_ref();
    let length = sum_sequence_lengths(open_sequence(path)?)
        .map_err(|(_, e)| KmerStatError::read(path)(e))?;
    info!(genome_length = length, path = %path.display(), "computed genome length");
    Ok(length)
}

/// Best-effort variant of [`genome_length`].
///
/// Errors are logged and whatever was summed before the failure is returned,
/// so 0 is ambiguous between an empty genome and an unreadable file.
pub fn genome_length_lossy<P: AsRef<Path>>(path: P) -> u64 {
    let path = path.as_ref();
    let reader = match open_sequence(path) {
        Ok(reader) => reader,
        Err(e) => {
            error!(path = %path.display(), error = %e, "could not open FASTA file");
            return 0;
        }
    };
    match sum_sequence_lengths(reader) {
        Ok(length) => length,
        Err((partial, e)) => {
            error!(path = %path.display(), error = %e, partial, "FASTA read failed part way");
            partial
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tracing_test::traced_test;

    fn normalize(text: &str) -> (usize, String) {
        let mut out = Vec::new();
        let n = normalize_reader(Cursor::new(text), &mut out).unwrap();
        (n, String::from_utf8(out).unwrap())
    }

    #[test]
    fn joins_multiline_records() {
        let (n, out) = normalize(">a desc\nACG\nTTA\n\n>b\nGG\nCC\n");
        assert_eq!(n, 2);
        assert_eq!(out, ">a desc\nACGTTA\n>b\nGGCC\n");
    }

    #[test]
    fn trims_whitespace_and_crlf() {
        let (_, out) = normalize("  >a  \r\n AC \r\nGT\t\r\n");
        assert_eq!(out, ">a\nACGT\n");
    }

    #[test]
    fn no_header_means_no_output() {
        let (n, out) = normalize("ACGT\nTTTT\n");
        assert_eq!(n, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn trailing_header_gets_empty_sequence() {
        let (n, out) = normalize(">a\nAC\n>b\n");
        assert_eq!(n, 2);
        assert_eq!(out, ">a\nAC\n>b\n\n");
    }

    #[test]
    fn lines_before_first_header_are_dropped() {
        let (_, out) = normalize("NNNN\n>a\nAC\n");
        assert_eq!(out, ">a\nAC\n");
    }

    #[test]
    fn normalizing_twice_is_a_no_op() {
        let (_, once) = normalize(">x\nAAA\nCCC\n>y\nG\n>z\n");
        let (_, twice) = normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn records_iterator_yields_in_order() {
        let records: Vec<_> = FastaRecords::new(Cursor::new(">1\nA\n>2\nC\nG\n"))
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(
            records,
            vec![
                FastaRecord {
                    header: ">1".into(),
                    sequence: "A".into()
                },
                FastaRecord {
                    header: ">2".into(),
                    sequence: "CG".into()
                },
            ]
        );
    }

    #[test]
    fn sequence_length_skips_headers() {
        let total = sum_sequence_lengths(Cursor::new(">abcdef\nACGT \n>g\nAC\n")).unwrap();
        assert_eq!(total, 6);
    }

    /// Two good records, then a line that is not UTF-8, then more sequence.
    const BREAKS_AFTER_SIX: &[u8] = b">a\nACGT\n>b\nGG\n\xff\xfe\nTTTTTTTT\n";

    fn unreadable_midway() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BREAKS_AFTER_SIX).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn read_error_returns_partial_sum() {
        let (partial, err) = sum_sequence_lengths(Cursor::new(BREAKS_AFTER_SIX)).unwrap_err();
        assert_eq!(partial, 6);
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    #[traced_test]
    fn lossy_length_keeps_partial_sum_and_logs() {
        let file = unreadable_midway();
        assert_eq!(genome_length_lossy(file.path()), 6);
        assert!(logs_contain("FASTA read failed part way"));
    }

    #[test]
    fn strict_length_fails_on_the_same_file() {
        let file = unreadable_midway();
        assert!(matches!(
            genome_length(file.path()),
            Err(KmerStatError::SequenceRead { .. })
        ));
    }

    #[test]
    fn lossy_length_of_missing_file_is_zero() {
        assert_eq!(genome_length_lossy("/definitely/not/here.fa"), 0);
    }

    #[test]
    fn normalizes_gzipped_input() {
        let dir = tempfile::TempDir::new().unwrap();
        let packed = dir.path().join("g.fna.gz");
        let mut encoder = flate2::write::GzEncoder::new(
            File::create(&packed).unwrap(),
            flate2::Compression::default(),
        );
        encoder.write_all(b">a\nAC\nGT\n>b\nTT\n").unwrap();
        encoder.finish().unwrap();

        let out = dir.path().join("g.normalized.fa");
        assert_eq!(normalize_fasta(&packed, &out).unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), ">a\nACGT\n>b\nTT\n");
        assert_eq!(genome_length(&packed).unwrap(), 6);
    }
}
