//! Parser for count-annotated k-mer dumps.
//!
//! A dump alternates `>{count}` header lines with k-mer lines, which is what
//! `jellyfish dump` writes by default:
//!
//! ```text
//! >3
//! AAAA
//! >5
//! CCCC
//! GGGG
//! ```
//!
//! A header's count stays current until the next header, so it applies to
//! every k-mer line below it, not only the first. The dump above yields
//! `(AAAA, 3)`, `(CCCC, 5)` and `(GGGG, 5)`.
//!
//! Problems are never fatal: a malformed header clears the current count and
//! each k-mer line left without a count is skipped. Both are logged and
//! recorded as [`LineIssue`]s in the returned [`DumpParse`].

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A k-mer and the count the dump reported for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DumpEntry {
    pub kmer: String,
    pub count: u64,
}

impl DumpEntry {
    pub fn new(kmer: impl Into<String>, count: u64) -> Self {
        Self {
            kmer: kmer.into(),
            count,
        }
    }
}

/// A line of the dump that could not be used, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIssue {
    pub line: usize,
    pub text: String,
}

/// Entries recovered from a dump, plus the lines that had to be skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpParse {
    pub entries: Vec<DumpEntry>,
    /// Headers whose payload is not a positive integer.
    pub malformed_headers: Vec<LineIssue>,
    /// K-mer lines with no valid count above them.
    pub orphan_lines: Vec<LineIssue>,
}

impl DumpParse {
    /// Returns `true` if every non-empty line was used.
    pub fn is_clean(&self) -> bool {
        self.malformed_headers.is_empty() && self.orphan_lines.is_empty()
    }
}

fn parse_count(payload: &str) -> Option<u64> {
    payload.trim().parse::<u64>().ok().filter(|&c| c > 0)
}

/// Parses a dump from any buffered reader.
///
/// A read error part way through stops parsing; the entries read so far are
/// kept and the error is logged.
pub fn parse_dump_reader<R: BufRead>(reader: R) -> DumpParse {
    let mut parse = DumpParse::default();
    let mut current: Option<u64> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(line = line_no, error = %e, "stopped reading dump");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(payload) = line.strip_prefix('>') {
            current = parse_count(payload);
            if current.is_none() {
                warn!(line = line_no, header = line, "malformed count header");
                parse.malformed_headers.push(LineIssue {
                    line: line_no,
                    text: line.to_string(),
                });
            }
            continue;
        }

        match current {
            Some(count) => parse.entries.push(DumpEntry::new(line, count)),
            None => {
                warn!(line = line_no, kmer = line, "k-mer line has no count; skipped");
                parse.orphan_lines.push(LineIssue {
                    line: line_no,
                    text: line.to_string(),
                });
            }
        }
    }

    debug!(
        entries = parse.entries.len(),
        malformed = parse.malformed_headers.len(),
        orphans = parse.orphan_lines.len(),
        "parsed dump"
    );
    parse
}

/// Parses the dump file at `path`.
///
/// A file that cannot be opened is logged and yields an empty parse.
pub fn parse_dump<P: AsRef<Path>>(path: P) -> DumpParse {
    let path = path.as_ref();
    match File::open(path) {
        Ok(file) => parse_dump_reader(BufReader::new(file)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "dump file not found");
            DumpParse::default()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not open dump file");
            DumpParse::default()
        }
    }
}
