// Sat Oct 17 2026 - Alex

use crate::hierarchy::HierarchyError;
use crate::output::OutputError;
use crate::symbol::SymbolError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CastsError {
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
    #[error(transparent)]
    Symbol(#[from] SymbolError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error("Failed to locate artifact: {0}")]
    Locate(#[source] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
}
