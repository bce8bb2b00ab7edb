// Fri Oct 16 2026 - Alex

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SymbolError {
    #[error("Failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse artifact {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("Unsupported artifact format in {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },
    #[error("Invalid symbol pattern: {0}")]
    Pattern(#[from] regex::Error),
}
