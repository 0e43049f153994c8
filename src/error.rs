use std::path::PathBuf;

use thiserror::Error;

/// A single file's text could not be converted into a syntax tree.
///
/// Recovered locally: the file is skipped with a warning and the scan
/// continues.
#[derive(Debug, Error)]
#[error("failed to parse {file}: {message}")]
pub struct ParseError {
    /// Basename of the offending file.
    pub file: String,
    pub message: String,
}

/// Unexpected failure during traversal or extraction.
///
/// Not recovered: the remaining scan is abandoned, but whatever partial
/// graph has been accumulated is still reported.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-file failure, split by recovery policy.
#[derive(Debug, Error)]
pub enum FileFailure {
    /// Skip the file, keep scanning.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Abort the remaining scan.
    #[error(transparent)]
    Scan(#[from] ScanError),
}
