// Fri Oct 16 2026 - Alex

use cpp_demangle::{DemangleOptions, Symbol};

/// Turns a raw exported symbol name into the compiler's textual signature.
pub trait Demangler: Send + Sync {
    /// Symbols that are not mangled, or fail to demangle, come back unchanged.
    fn demangle(&self, symbol: &str) -> String;
}

/// Itanium C++ ABI demangler, producing the same text as `c++filt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItaniumDemangler;

impl Demangler for ItaniumDemangler {
    fn demangle(&self, symbol: &str) -> String {
        demangle_itanium(symbol).unwrap_or_else(|| symbol.to_string())
    }
}

/// Passes names through untouched, for symbol lists that are already readable.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityDemangler;

impl Demangler for IdentityDemangler {
    fn demangle(&self, symbol: &str) -> String {
        symbol.to_string()
    }
}

pub fn demangle_itanium(mangled: &str) -> Option<String> {
    if !mangled.starts_with("_Z") {
        return None;
    }

    let symbol = Symbol::new(mangled).ok()?;
    symbol.demangle(&DemangleOptions::default()).ok()
}
