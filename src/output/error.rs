// Sat Oct 17 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Casts table contains an interior NUL byte")]
    InteriorNul,
}
