// Sat Oct 17 2026 - Alex

pub mod config;
pub mod hierarchy;
pub mod symbol;
pub mod output;
pub mod engine;
pub mod ui;

pub use config::Config;
pub use hierarchy::{HierarchyDeclaration, HierarchyError, TypeId, TypeRegistry};
pub use symbol::{Bindings, SymbolError, SymbolTableScanner, UpcastBinding};
pub use output::{CastsTable, NameRewriter, OutputError, TableAssembler, WrapperRewrite};
pub use engine::{current_artifact, CastsError, Exposure};

#[doc(hidden)]
pub use once_cell;
