// Thu Oct 15 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HierarchyError {
    #[error("Cycle while toposorting base types, inheritance is broken: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },
    #[error("Unknown type id: {0}")]
    UnknownType(usize),
    #[error("Seed type is not registered: {0}")]
    UnknownSeed(String),
    #[error("Bases of wrapper type {0} are derived from its inner type and cannot be declared")]
    WrapperBases(String),
    #[error("Invalid hierarchy declaration: {0}")]
    Declaration(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
