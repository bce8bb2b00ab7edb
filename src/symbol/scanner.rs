// Sat Oct 17 2026 - Alex

use crate::symbol::{
    read_exported_symbols, Demangler, ItaniumDemangler, KnownTypesPattern, SymbolError, UpcastPattern,
    DEFAULT_CODE_SECTIONS,
};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// `derived` can be converted to `base` by calling `symbol`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcastBinding {
    pub derived: String,
    pub base: String,
    pub symbol: String,
}

impl UpcastBinding {
    pub fn new(derived: &str, base: &str, symbol: &str) -> Self {
        Self {
            derived: derived.to_string(),
            base: base.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

/// derived name -> base name -> upcast symbol. Ordered maps, so two scans of the
/// same symbols in different orders compare and iterate identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Bindings {
    map: BTreeMap<String, BTreeMap<String, String>>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a binding, returning the symbol it replaced for the same pair.
    pub fn insert(&mut self, binding: UpcastBinding) -> Option<String> {
        self.map
            .entry(binding.derived)
            .or_default()
            .insert(binding.base, binding.symbol)
    }

    pub fn get(&self, derived: &str, base: &str) -> Option<&str> {
        self.map.get(derived)?.get(base).map(String::as_str)
    }

    pub fn bases_of(&self, derived: &str) -> Option<&BTreeMap<String, String>> {
        self.map.get(derived)
    }

    pub fn iter(&self) -> impl Iterator<Item = UpcastBinding> + '_ {
        self.map.iter().flat_map(|(derived, bases)| {
            bases
                .iter()
                .map(move |(base, symbol)| UpcastBinding::new(derived, base, symbol))
        })
    }

    /// Number of (derived, base) pairs.
    pub fn len(&self) -> usize {
        self.map.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<UpcastBinding> for Bindings {
    fn from_iter<T: IntoIterator<Item = UpcastBinding>>(iter: T) -> Self {
        let mut bindings = Bindings::new();
        for binding in iter {
            bindings.insert(binding);
        }
        bindings
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub symbols: usize,
    pub matched: usize,
    pub inconsistent: usize,
    pub skipped: usize,
    pub overwritten: usize,
}

/// Locates upcast instantiations in an artifact's symbol table.
pub struct SymbolTableScanner {
    pattern: UpcastPattern,
    sections: Vec<String>,
    demangler: Arc<dyn Demangler>,
    scanned: Mutex<HashMap<PathBuf, Arc<OnceCell<Arc<Bindings>>>>>,
}

impl SymbolTableScanner {
    pub fn new(known: &KnownTypesPattern, upcast_function: &str) -> Result<Self, SymbolError> {
        Ok(Self {
            pattern: UpcastPattern::new(known, upcast_function)?,
            sections: DEFAULT_CODE_SECTIONS.iter().map(|s| s.to_string()).collect(),
            demangler: Arc::new(ItaniumDemangler),
            scanned: Mutex::new(HashMap::new()),
        })
    }

    pub fn with_sections(mut self, sections: Vec<String>) -> Self {
        self.sections = sections;
        self
    }

    pub fn with_demangler(mut self, demangler: Arc<dyn Demangler>) -> Self {
        self.demangler = demangler;
        self
    }

    pub fn pattern(&self) -> &UpcastPattern {
        &self.pattern
    }

    /// Scan the artifact at `path`. Each path is read at most once; concurrent
    /// callers for the same path wait for the first scan and share its result.
    pub fn scan<P: AsRef<Path>>(&self, path: P) -> Result<Arc<Bindings>, SymbolError> {
        let path = path.as_ref();
        let cell = {
            let mut scanned = self.scanned.lock();
            scanned
                .entry(path.to_path_buf())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let bindings = cell.get_or_try_init(|| {
            let symbols = read_exported_symbols(path, &self.sections)?;
            let (bindings, report) = self.scan_symbols(&symbols.names);
            log::info!(
                "Scanned {} symbols in {}: {} upcasts, {} inconsistent",
                report.symbols,
                path.display(),
                report.matched,
                report.inconsistent
            );
            Ok::<_, SymbolError>(Arc::new(bindings))
        })?;

        Ok(Arc::clone(bindings))
    }

    /// Match an in-memory symbol list. Later symbols win when two bind the same pair.
    pub fn scan_symbols<S: AsRef<str> + Sync>(&self, symbols: &[S]) -> (Bindings, ScanReport) {
        let demangled: Vec<String> = symbols
            .par_iter()
            .map(|symbol| self.demangler.demangle(symbol.as_ref()))
            .collect();

        let mut bindings = Bindings::new();
        let mut report = ScanReport {
            symbols: symbols.len(),
            ..ScanReport::default()
        };

        for (symbol, readable) in symbols.iter().zip(&demangled) {
            let symbol: &str = symbol.as_ref();
            match self.pattern.captures(readable) {
                Some(caps) if caps.is_consistent() => {
                    log::debug!("bindings[{}][{}] = {}", caps.derived, caps.return_type, symbol);
                    report.matched += 1;
                    let previous = bindings.insert(UpcastBinding::new(&caps.derived, &caps.return_type, symbol));
                    if previous.is_some() {
                        report.overwritten += 1;
                    }
                }
                Some(_) => {
                    log::debug!("{} parses as an upcast, but the types don't match: {}", symbol, readable);
                    report.inconsistent += 1;
                }
                None => {
                    log::trace!("Skipping unmatched symbol {} (aka {})", symbol, readable);
                    report.skipped += 1;
                }
            }
        }

        (bindings, report)
    }
}
