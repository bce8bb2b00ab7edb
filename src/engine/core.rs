// Sat Oct 17 2026 - Alex

use crate::config::Config;
use crate::engine::CastsError;
use crate::hierarchy::{discover, DeclaredHierarchy, FilteredHierarchy, HierarchyError, KnownTypesCatalog, TypeId, TypeRegistry};
use crate::output::{CastsTable, NameRewriter, OutputError, TableAssembler};
use crate::symbol::{Bindings, Demangler, ItaniumDemangler, KnownTypesPattern, SymbolTableScanner};
use indexmap::IndexSet;
use once_cell::sync::OnceCell;
use std::ffi::{CStr, CString};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// Returns the location of the binary artifact whose symbols are scanned.
pub type ArtifactLocator = Box<dyn Fn() -> io::Result<PathBuf> + Send + Sync>;

/// Outcome of one stage, success or failure, shared by every caller.
pub type Shared<'a, T> = Result<&'a T, Arc<CastsError>>;

type Stage<T> = OnceCell<Result<T, Arc<CastsError>>>;

fn once<'a, T, F>(stage: &'a Stage<T>, compute: F) -> Shared<'a, T>
where
    F: FnOnce() -> Result<T, Arc<CastsError>>,
{
    stage.get_or_init(compute).as_ref().map_err(Arc::clone)
}

fn fatal<E: Into<CastsError>>(error: E) -> Arc<CastsError> {
    Arc::new(error.into())
}

enum BindingSource {
    Artifact(ArtifactLocator),
    Symbols(Vec<String>),
    Explicit(Bindings),
}

impl fmt::Debug for BindingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingSource::Artifact(_) => f.write_str("Artifact"),
            BindingSource::Symbols(symbols) => write!(f, "Symbols({})", symbols.len()),
            BindingSource::Explicit(bindings) => write!(f, "Explicit({})", bindings.len()),
        }
    }
}

/// A set of exposed types together with everything derived from them.
///
/// Every stage runs at most once for the lifetime of the `Exposure`, and its
/// outcome is cached whether it succeeded or failed. Concurrent first callers
/// block until that single run finishes and then all observe the same value or
/// the same error. Failures are fatal: the exported C entry points abort on them.
pub struct Exposure {
    registry: TypeRegistry,
    seeds: Vec<TypeId>,
    source: BindingSource,
    rewriter: NameRewriter,
    demangler: Arc<dyn Demangler>,
    config: Config,
    hierarchy: Stage<(FilteredHierarchy, KnownTypesCatalog)>,
    known_types: Stage<KnownTypesPattern>,
    scanner: Stage<SymbolTableScanner>,
    bindings: Stage<Arc<Bindings>>,
    table: Stage<CastsTable>,
    json: Stage<String>,
    table_c_str: Stage<CString>,
    known_types_c_str: Stage<CString>,
}

impl Exposure {
    /// Seal `registry` and expose `seeds`, in order, duplicates collapsed.
    pub fn new<F>(mut registry: TypeRegistry, seeds: &[TypeId], locator: F) -> Result<Self, CastsError>
    where
        F: Fn() -> io::Result<PathBuf> + Send + Sync + 'static,
    {
        registry.expand_wrappers()?;
        for seed in seeds {
            registry
                .entry(*seed)
                .map_err(|_| HierarchyError::UnknownSeed(seed.to_string()))?;
        }
        let seeds: IndexSet<TypeId> = seeds.iter().copied().collect();

        Ok(Self {
            registry,
            seeds: seeds.into_iter().collect(),
            source: BindingSource::Artifact(Box::new(locator)),
            rewriter: NameRewriter::new(),
            demangler: Arc::new(ItaniumDemangler),
            config: Config::default(),
            hierarchy: OnceCell::new(),
            known_types: OnceCell::new(),
            scanner: OnceCell::new(),
            bindings: OnceCell::new(),
            table: OnceCell::new(),
            json: OnceCell::new(),
            table_c_str: OnceCell::new(),
            known_types_c_str: OnceCell::new(),
        })
    }

    pub fn from_declared<F>(declared: DeclaredHierarchy, locator: F) -> Result<Self, CastsError>
    where
        F: Fn() -> io::Result<PathBuf> + Send + Sync + 'static,
    {
        let exposure = Self::new(declared.registry, &declared.seeds, locator)?;
        Ok(exposure.with_rewriter(declared.rewriter))
    }

    pub fn with_rewriter(mut self, rewriter: NameRewriter) -> Self {
        self.rewriter = rewriter;
        self
    }

    pub fn with_demangler(mut self, demangler: Arc<dyn Demangler>) -> Self {
        self.demangler = demangler;
        self
    }

    pub fn with_config(mut self, config: Config) -> Result<Self, CastsError> {
        config.validate().map_err(CastsError::Config)?;
        self.config = config;
        Ok(self)
    }

    /// Match an in-memory symbol list instead of reading the artifact.
    pub fn with_symbols(mut self, symbols: Vec<String>) -> Self {
        self.source = BindingSource::Symbols(symbols);
        self
    }

    /// Use explicitly registered (derived, base, symbol) triples instead of scanning.
    pub fn with_bindings(mut self, bindings: Bindings) -> Self {
        self.source = BindingSource::Explicit(bindings);
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn seeds(&self) -> &[TypeId] {
        &self.seeds
    }

    fn discovered(&self) -> Shared<'_, (FilteredHierarchy, KnownTypesCatalog)> {
        once(&self.hierarchy, || {
            let discovered = discover(&self.registry, &self.seeds).map_err(fatal)?;
            log::debug!("Discovered {} known types from {} seeds", discovered.1.len(), self.seeds.len());
            Ok(discovered)
        })
    }

    pub fn hierarchy(&self) -> Shared<'_, FilteredHierarchy> {
        self.discovered().map(|(hierarchy, _)| hierarchy)
    }

    pub fn catalog(&self) -> Shared<'_, KnownTypesCatalog> {
        self.discovered().map(|(_, catalog)| catalog)
    }

    /// The known-types regular expression, for consumers matching type names in free text.
    pub fn known_types(&self) -> Shared<'_, KnownTypesPattern> {
        once(&self.known_types, || {
            KnownTypesPattern::from_catalog(self.catalog()?).map_err(fatal)
        })
    }

    fn scanner(&self) -> Shared<'_, SymbolTableScanner> {
        once(&self.scanner, || {
            let scanner = SymbolTableScanner::new(self.known_types()?, &self.config.upcast_function)
                .map_err(fatal)?
                .with_sections(self.config.code_sections.clone())
                .with_demangler(Arc::clone(&self.demangler));
            log::debug!("Parsing symbols via {}", scanner.pattern().as_str());
            Ok(scanner)
        })
    }

    pub fn bindings(&self) -> Result<Arc<Bindings>, Arc<CastsError>> {
        let bindings = once(&self.bindings, || match &self.source {
            BindingSource::Explicit(bindings) => Ok(Arc::new(bindings.clone())),
            BindingSource::Symbols(symbols) => {
                let (bindings, report) = self.scanner()?.scan_symbols(symbols.as_slice());
                log::info!("Matched {} upcasts in {} symbols", report.matched, report.symbols);
                Ok(Arc::new(bindings))
            }
            BindingSource::Artifact(locator) => {
                let scanner = self.scanner()?;
                let path = locator().map_err(|e| fatal(CastsError::Locate(e)))?;
                scanner.scan(&path).map_err(fatal)
            }
        })?;
        Ok(Arc::clone(bindings))
    }

    pub fn casts_table(&self) -> Shared<'_, CastsTable> {
        once(&self.table, || {
            let hierarchy = self.hierarchy()?;
            let bindings = self.bindings()?;
            TableAssembler::new(&self.registry, &self.rewriter)
                .assemble(hierarchy, &bindings)
                .map_err(fatal)
        })
    }

    pub fn casts_table_json(&self) -> Result<&str, Arc<CastsError>> {
        let json = once(&self.json, || {
            self.casts_table()?.to_json(self.config.pretty_print).map_err(fatal)
        })?;
        Ok(json.as_str())
    }

    pub fn casts_table_c_str(&self) -> Shared<'_, CStr> {
        let c_str = once(&self.table_c_str, || to_c_string(self.casts_table_json()?))?;
        Ok(c_str.as_c_str())
    }

    pub fn known_types_c_str(&self) -> Shared<'_, CStr> {
        let c_str = once(&self.known_types_c_str, || to_c_string(self.known_types()?.as_str()))?;
        Ok(c_str.as_c_str())
    }
}

impl fmt::Debug for Exposure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exposure")
            .field("types", &self.registry.len())
            .field("seeds", &self.seeds)
            .field("source", &self.source)
            .field("config", &self.config)
            .finish()
    }
}

fn to_c_string(text: &str) -> Result<CString, Arc<CastsError>> {
    CString::new(text).map_err(|_| fatal(OutputError::InteriorNul))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::HierarchyDeclaration;
    use crate::symbol::{IdentityDemangler, UpcastBinding};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DECLARATION: &str = r#"{
        "types": [
            { "name": "A" },
            { "name": "B", "bases": ["A"] },
            { "name": "C", "bases": ["A"] },
            { "name": "D", "bases": ["B", "C"] }
        ],
        "wrappers": [ { "template": "Wrap", "inner": ["D"] } ],
        "seeds": ["A", "B", "C", "D", "Wrap<D>", "Wrap<A>", "Wrap<B>", "Wrap<C>"]
    }"#;

    fn fake_symbols() -> Vec<String> {
        let mut symbols = vec!["main".to_string(), "void unrelated<D>(D*)".to_string()];
        for (derived, base) in [("D", "A"), ("D", "B"), ("D", "C"), ("B", "A"), ("C", "A")] {
            symbols.push(format!("{b}* CxxFFI::upcast<{d}, {b}>({d}*)", d = derived, b = base));
            symbols.push(format!(
                "Wrap<{b}>* CxxFFI::upcast<Wrap<{d}>, Wrap<{b}> >(Wrap<{d}>*)",
                d = derived,
                b = base
            ));
        }
        symbols
    }

    fn no_artifact() -> io::Result<PathBuf> {
        Err(io::Error::new(io::ErrorKind::NotFound, "no artifact in this test"))
    }

    fn exposure(symbols: Vec<String>) -> Exposure {
        let declared = HierarchyDeclaration::from_json(DECLARATION).unwrap().build().unwrap();
        Exposure::from_declared(declared, no_artifact)
            .unwrap()
            .with_demangler(Arc::new(IdentityDemangler))
            .with_symbols(symbols)
    }

    #[test]
    fn test_end_to_end_diamond() {
        let exposure = exposure(fake_symbols());
        let table = exposure.casts_table().unwrap();

        let d: Vec<(&str, &str)> = table
            .bases("D")
            .unwrap()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            d,
            vec![
                ("C", "C* CxxFFI::upcast<D, C>(D*)"),
                ("B", "B* CxxFFI::upcast<D, B>(D*)"),
                ("A", "A* CxxFFI::upcast<D, A>(D*)"),
            ]
        );
        assert_eq!(table.get("Wrap<D>", "Wrap<A>"), Some("Wrap<A>* CxxFFI::upcast<Wrap<D>, Wrap<A> >(Wrap<D>*)"));
        assert_eq!(table.bases("Wrap<D>").unwrap().len(), 3);
        assert_eq!(table.bases("B").unwrap().len(), 1);
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn test_missing_symbol_only_drops_that_pair() {
        let symbols: Vec<String> = fake_symbols()
            .into_iter()
            .filter(|s| s != "A* CxxFFI::upcast<C, A>(C*)")
            .collect();
        let full = exposure(fake_symbols());
        let partial = exposure(symbols);
        let full_table = full.casts_table().unwrap();
        let partial_table = partial.casts_table().unwrap();

        assert_eq!(partial_table.get("C", "A"), None);
        assert!(partial_table.bases("C").unwrap().is_empty());
        for (derived, bases) in full_table.entries() {
            for (base, symbol) in bases {
                if (derived.as_str(), base.as_str()) != ("C", "A") {
                    assert_eq!(partial_table.get(derived, base), Some(symbol.as_str()));
                }
            }
        }
    }

    #[test]
    fn test_known_types_pattern() {
        let exposure = exposure(Vec::new());
        let known = exposure.known_types().unwrap();
        assert!(known.as_str().starts_with("((?:A)|(?:B)|"));
        assert!(known.is_match("Wrap<C>"));
        assert_eq!(exposure.known_types_c_str().unwrap().to_str().unwrap(), known.as_str());
    }

    #[test]
    fn test_empty_seed_set() {
        let exposure = Exposure::new(TypeRegistry::new(), &[], no_artifact)
            .unwrap()
            .with_bindings(Bindings::new());
        assert_eq!(exposure.casts_table_json().unwrap(), "{}");
        assert_eq!(exposure.casts_table_c_str().unwrap().to_bytes(), b"{}");
    }

    #[test]
    fn test_explicit_bindings() {
        let mut registry = TypeRegistry::new();
        let a = registry.register("A");
        let b = registry.register("B");
        registry.declare_bases(b, &[a]).unwrap();
        let bindings: Bindings = vec![UpcastBinding::new("B", "A", "b_to_a")].into_iter().collect();

        let exposure = Exposure::new(registry, &[b, a, b], no_artifact).unwrap().with_bindings(bindings);
        assert_eq!(exposure.seeds().len(), 2);
        let json = exposure.with_config(Config::new().with_pretty_print(false)).unwrap();
        assert_eq!(json.casts_table_json().unwrap(), r#"{"B":{"A":"b_to_a"},"A":{}}"#);
    }

    #[test]
    fn test_cycle_is_fatal() {
        let mut registry = TypeRegistry::new();
        let x = registry.register("X");
        let y = registry.register("Y");
        registry.declare_bases(x, &[y]).unwrap();
        registry.declare_bases(y, &[x]).unwrap();

        let exposure = Exposure::new(registry, &[x], no_artifact).unwrap();
        let first = exposure.casts_table().unwrap_err();
        assert!(matches!(*first, CastsError::Hierarchy(HierarchyError::Cycle { .. })));
        let second = exposure.known_types().unwrap_err();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_artifact_is_fatal() {
        let mut registry = TypeRegistry::new();
        let a = registry.register("A");
        let exposure = Exposure::new(registry, &[a], || Ok(PathBuf::from("/nonexistent/libapi.so"))).unwrap();
        assert!(matches!(*exposure.casts_table().unwrap_err(), CastsError::Symbol(_)));

        let mut registry = TypeRegistry::new();
        let a = registry.register("A");
        let exposure = Exposure::new(registry, &[a], no_artifact).unwrap();
        assert!(matches!(*exposure.bindings().unwrap_err(), CastsError::Locate(_)));
    }

    #[test]
    fn test_failure_is_computed_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut registry = TypeRegistry::new();
        let a = registry.register("A");
        let exposure = Exposure::new(registry, &[a], move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(PathBuf::from("/nonexistent/libapi.so"))
        })
        .unwrap();

        let errors: Vec<Arc<CastsError>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| exposure.casts_table().unwrap_err()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let later = exposure.casts_table().unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(errors.iter().all(|e| Arc::ptr_eq(e, &later)));
        assert!(exposure.casts_table_c_str().is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_seed_is_rejected() {
        let mut other = TypeRegistry::new();
        other.register("A");
        let stray = other.register("B");
        let mut registry = TypeRegistry::new();
        registry.register("A");
        match Exposure::new(registry, &[stray], no_artifact) {
            Err(CastsError::Hierarchy(HierarchyError::UnknownSeed(seed))) => assert_eq!(seed, "#1"),
            other => panic!("expected unknown seed, got {:?}", other),
        }
    }

    #[test]
    fn test_concurrent_first_use_computes_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut registry = TypeRegistry::new();
        let a = registry.register("A");
        let exposure = Exposure::new(registry, &[a], move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::env::current_exe()
        })
        .unwrap()
        .with_demangler(Arc::new(IdentityDemangler));

        let tables: Vec<usize> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| exposure.casts_table().unwrap() as *const CastsTable as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(tables.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(exposure.casts_table_json().unwrap(), "{\n  \"A\": {}\n}");
    }
}
