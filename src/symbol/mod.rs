// Fri Oct 16 2026 - Alex

pub mod error;
pub mod reader;
pub mod demangle;
pub mod pattern;
pub mod scanner;

pub use error::SymbolError;
pub use reader::{read_exported_symbols, ArtifactSymbols, DEFAULT_CODE_SECTIONS};
pub use demangle::{demangle_itanium, Demangler, IdentityDemangler, ItaniumDemangler};
pub use pattern::{KnownTypesPattern, UpcastCaptures, UpcastPattern, DEFAULT_UPCAST_FUNCTION};
pub use scanner::{Bindings, ScanReport, SymbolTableScanner, UpcastBinding};
