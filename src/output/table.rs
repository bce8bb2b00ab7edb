// Sat Oct 17 2026 - Alex

use crate::hierarchy::{FilteredHierarchy, HierarchyError, TypeRegistry};
use crate::output::{NameRewriter, OutputError};
use crate::symbol::Bindings;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Exposed type -> base type -> upcast symbol, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CastsTable {
    entries: IndexMap<String, IndexMap<String, String>>,
}

impl CastsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &IndexMap<String, IndexMap<String, String>> {
        &self.entries
    }

    pub fn bases(&self, derived: &str) -> Option<&IndexMap<String, String>> {
        self.entries.get(derived)
    }

    pub fn get(&self, derived: &str, base: &str) -> Option<&str> {
        self.entries.get(derived)?.get(base).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, OutputError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    pub fn from_json(text: &str) -> Result<Self, OutputError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P, pretty: bool) -> Result<(), OutputError> {
        let json = self.to_json(pretty)?;
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Joins filtered hierarchies with discovered bindings.
pub struct TableAssembler<'a> {
    registry: &'a TypeRegistry,
    rewriter: &'a NameRewriter,
}

impl<'a> TableAssembler<'a> {
    pub fn new(registry: &'a TypeRegistry, rewriter: &'a NameRewriter) -> Self {
        Self { registry, rewriter }
    }

    pub fn assemble(&self, hierarchy: &FilteredHierarchy, bindings: &Bindings) -> Result<CastsTable, HierarchyError> {
        let mut table = CastsTable::new();

        for graph in hierarchy.iter() {
            let derived = self.registry.name(graph.seed())?;
            let mut bases = IndexMap::new();

            for base_id in graph.ancestors() {
                let base = self.registry.name(*base_id)?;
                match bindings.get(derived, base) {
                    Some(symbol) => {
                        let shown = self.rewriter.rewrite(self.registry, *base_id);
                        if let Some(replaced) = bases.insert(shown.clone(), symbol.to_string()) {
                            log::debug!("Bases of {} collide as {}, dropping {}", derived, shown, replaced);
                        }
                    }
                    None => {
                        log::debug!("Couldn't find upcast from {} to {}", derived, base);
                    }
                }
            }

            let shown = self.rewriter.rewrite(self.registry, graph.seed());
            if table.entries.insert(shown.clone(), bases).is_some() {
                log::debug!("Exposed types collide as {}, keeping the later one ({})", shown, derived);
            }
        }

        log::info!("Assembled casts table with {} entries", table.len());
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{discover, TypeId};
    use crate::output::WrapperRewrite;
    use crate::symbol::UpcastBinding;

    fn diamond() -> (TypeRegistry, Vec<TypeId>) {
        let mut registry = TypeRegistry::new();
        let a = registry.register("A");
        let b = registry.register("B");
        let c = registry.register("C");
        let d = registry.register("D");
        registry.declare_bases(b, &[a]).unwrap();
        registry.declare_bases(c, &[a]).unwrap();
        registry.declare_bases(d, &[b, c]).unwrap();
        (registry, vec![a, b, c, d])
    }

    fn bindings(pairs: &[(&str, &str)]) -> Bindings {
        pairs
            .iter()
            .map(|(d, b)| UpcastBinding::new(d, b, &format!("upcast_{}_{}", d, b)))
            .collect()
    }

    #[test]
    fn test_assemble_diamond() {
        let (registry, seeds) = diamond();
        let (hierarchy, _) = discover(&registry, &seeds).unwrap();
        let found = bindings(&[("D", "A"), ("D", "B"), ("D", "C"), ("B", "A"), ("C", "A")]);
        let rewriter = NameRewriter::new();
        let table = TableAssembler::new(&registry, &rewriter).assemble(&hierarchy, &found).unwrap();

        let keys: Vec<&String> = table.entries().keys().collect();
        assert_eq!(keys, vec!["A", "B", "C", "D"]);
        assert!(table.bases("A").unwrap().is_empty());

        let d_bases: Vec<&String> = table.bases("D").unwrap().keys().collect();
        assert_eq!(d_bases, vec!["C", "B", "A"]);
        assert_eq!(table.get("D", "A"), Some("upcast_D_A"));
    }

    #[test]
    fn test_missing_binding_is_omitted() {
        let (registry, seeds) = diamond();
        let (hierarchy, _) = discover(&registry, &seeds).unwrap();
        let found = bindings(&[("D", "A"), ("D", "B"), ("B", "A"), ("C", "A")]);
        let rewriter = NameRewriter::new();
        let table = TableAssembler::new(&registry, &rewriter).assemble(&hierarchy, &found).unwrap();

        assert_eq!(table.get("D", "C"), None);
        assert_eq!(table.bases("D").unwrap().len(), 2);
        assert_eq!(table.get("C", "A"), Some("upcast_C_A"));
    }

    #[test]
    fn test_empty_seed_set_serializes_to_empty_object() {
        let registry = TypeRegistry::new();
        let (hierarchy, _) = discover(&registry, &[]).unwrap();
        let rewriter = NameRewriter::new();
        let table = TableAssembler::new(&registry, &rewriter)
            .assemble(&hierarchy, &Bindings::new())
            .unwrap();
        assert_eq!(table.to_json(false).unwrap(), "{}");
        assert_eq!(table.to_json(true).unwrap(), "{}");
    }

    #[test]
    fn test_rewritten_names_and_json_order() {
        let mut registry = TypeRegistry::new();
        let a = registry.register("A");
        let b = registry.register("B");
        registry.declare_bases(b, &[a]).unwrap();
        let wrapped_b = registry.wrap("std::__1::shared_ptr", b).unwrap();
        registry.expand_wrappers().unwrap();
        let wrapped_a = registry.lookup("std::__1::shared_ptr<A>").unwrap();

        let seeds = [wrapped_b, b, a, wrapped_a];
        let (hierarchy, _) = discover(&registry, &seeds).unwrap();
        let found = bindings(&[("B", "A"), ("std::__1::shared_ptr<B>", "std::__1::shared_ptr<A>")]);
        let rewriter = NameRewriter::new().with_wrapper_rule("std::__1::shared_ptr", WrapperRewrite::FlattenStdAbi);
        let table = TableAssembler::new(&registry, &rewriter).assemble(&hierarchy, &found).unwrap();

        assert_eq!(
            table.to_json(false).unwrap(),
            concat!(
                r#"{"std::shared_ptr<B>":{"std::shared_ptr<A>":"upcast_std::__1::shared_ptr<B>_std::__1::shared_ptr<A>"},"#,
                r#""B":{"A":"upcast_B_A"},"A":{},"std::shared_ptr<A>":{}}"#
            )
        );
    }

    #[test]
    fn test_rewrite_collision_keeps_later_entry() {
        let mut registry = TypeRegistry::new();
        let base = registry.register("Base");
        let first = registry.register("v1::Widget");
        let second = registry.register("v2::Widget");
        registry.declare_bases(first, &[base]).unwrap();
        registry.declare_bases(second, &[base]).unwrap();

        let seeds = [first, second, base];
        let (hierarchy, _) = discover(&registry, &seeds).unwrap();
        let found = bindings(&[("v1::Widget", "Base"), ("v2::Widget", "Base")]);
        let rewriter = NameRewriter::new()
            .with_override("v1::Widget", |_| "Widget".to_string())
            .with_override("v2::Widget", |_| "Widget".to_string());
        let table = TableAssembler::new(&registry, &rewriter).assemble(&hierarchy, &found).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("Widget", "Base"), Some("upcast_v2::Widget_Base"));
    }

    #[test]
    fn test_write_and_read_back() {
        let (registry, seeds) = diamond();
        let (hierarchy, _) = discover(&registry, &seeds).unwrap();
        let rewriter = NameRewriter::new();
        let table = TableAssembler::new(&registry, &rewriter)
            .assemble(&hierarchy, &bindings(&[("B", "A")]))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("casts.json");
        table.write_to(&path, true).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(CastsTable::from_json(&text).unwrap(), table);
    }
}
