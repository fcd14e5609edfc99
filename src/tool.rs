//! External k-mer counting tool.
//!
//! Counting itself is delegated to an external program. [`KmerTool`] is the
//! seam: the pipeline asks it to build a count index for one k and then to dump
//! that index as `>{count}` / k-mer lines. [`Jellyfish`] is the real
//! implementation; tests substitute their own.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
};

use tracing::{debug, info};

use crate::{error::KmerStatError, kmer::KmerLength};

/// A program that can count k-mers into an index and dump the index as text.
pub trait KmerTool {
    /// Counts k-mers of length `k` in `fasta`, writing the index to `index`.
    fn count(&self, fasta: &Path, k: KmerLength, index: &Path) -> Result<(), KmerStatError>;

    /// Dumps `index` to `dump` in `>{count}\n{kmer}` form.
    fn dump(&self, index: &Path, dump: &Path) -> Result<(), KmerStatError>;
}

/// Default hash size hint passed to `jellyfish count -s`.
pub const DEFAULT_MEMORY_HINT: &str = "100M";

/// Runs the `jellyfish` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jellyfish {
    /// Program to execute.
    pub binary: PathBuf,
    /// Initial hash size, e.g. `100M`.
    pub memory_hint: String,
    /// Count a k-mer and its reverse complement together (`-C`).
    pub canonical: bool,
    /// Worker threads for `count` (`-t`). Jellyfish's own default when `None`.
    pub threads: Option<usize>,
}

impl Default for Jellyfish {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("jellyfish"),
            memory_hint: DEFAULT_MEMORY_HINT.to_string(),
            canonical: true,
            threads: None,
        }
    }
}

impl Jellyfish {
    /// Arguments for `jellyfish count`.
    pub fn count_args(&self, fasta: &Path, k: KmerLength, index: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "count".into(),
            "-m".into(),
            k.to_string().into(),
            "-s".into(),
            self.memory_hint.clone().into(),
        ];
        if self.canonical {
            args.push("-C".into());
        }
        if let Some(threads) = self.threads {
            args.push("-t".into());
            args.push(threads.to_string().into());
        }
        args.push("-o".into());
        args.push(index.into());
        args.push(fasta.into());
        args
    }

    /// Arguments for `jellyfish dump`.
    pub fn dump_args(index: &Path, dump: &Path) -> Vec<OsString> {
        vec!["dump".into(), "-o".into(), dump.into(), index.into()]
    }

    fn program(&self) -> String {
        self.binary.display().to_string()
    }

    fn execute(&self, step: &'static str, args: &[OsString]) -> Result<(), KmerStatError> {
        debug!(program = %self.binary.display(), ?args, "running external tool");
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|source| KmerStatError::ToolSpawn {
                source,
                program: self.program(),
            })?;

        if !output.status.success() {
            return Err(KmerStatError::ToolFailed {
                program: self.program(),
                step,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl KmerTool for Jellyfish {
    fn count(&self, fasta: &Path, k: KmerLength, index: &Path) -> Result<(), KmerStatError> {
        info!(k = k.get(), index = %index.display(), "jellyfish count");
        self.execute("count", &self.count_args(fasta, k, index))
    }

    fn dump(&self, index: &Path, dump: &Path) -> Result<(), KmerStatError> {
        info!(dump = %dump.display(), "jellyfish dump");
        self.execute("dump", &Self::dump_args(index, dump))
    }
}
