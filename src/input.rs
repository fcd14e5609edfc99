//! Opening genome files, plain or gzip-compressed.
//!
//! A path ending in `.gz` is decompressed on the fly; anything else is read
//! as is. `genome.fna.gz` is a FASTA file, and its stem is `genome`.

use std::{
    ffi::OsStr,
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use flate2::read::MultiGzDecoder;

use crate::error::KmerStatError;

/// FASTA extensions recognised with or without a trailing `.gz`.
pub const FASTA_EXTENSIONS: [&str; 3] = ["fna", "fa", "fasta"];

/// Checks if a path has a `.gz` extension.
pub fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// The path with a trailing `.gz` removed, if it had one.
fn without_gz(path: &Path) -> &Path {
    if is_gzip_path(path) {
        path.file_stem().map_or(path, Path::new)
    } else {
        path
    }
}

/// Whether `path` names a FASTA file: `.fna`, `.fa`, `.fasta`, or any of
/// these followed by `.gz`.
pub fn is_fasta_path(path: &Path) -> bool {
    without_gz(path)
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| FASTA_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// File stem with both `.gz` and the sequence extension stripped.
pub fn sequence_stem(path: &Path) -> Option<&OsStr> {
    without_gz(path).file_stem()
}

/// Opens `path` for buffered reading, decompressing `.gz` files.
///
/// Decompression errors surface from the returned reader as `io::Error`s.
pub fn open_sequence(path: &Path) -> Result<Box<dyn BufRead>, KmerStatError> {
    let file = File::open(path).map_err(KmerStatError::read(path))?;
    if is_gzip_path(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Decompresses `path` to the same location without its `.gz` suffix and
/// returns the new path.
pub fn gunzip_file(path: &Path) -> Result<PathBuf, KmerStatError> {
    let target = path.with_extension("");
    let mut reader = open_sequence(path)?;
    let mut out = File::create(&target).map_err(KmerStatError::write(&target))?;
    io::copy(&mut reader, &mut out).map_err(|source| KmerStatError::Gzip {
        source,
        path: path.to_path_buf(),
    })?;
    Ok(target)
}
