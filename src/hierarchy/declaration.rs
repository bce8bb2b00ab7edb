// Fri Oct 16 2026 - Alex

use crate::hierarchy::{HierarchyError, TypeId, TypeRegistry};
use crate::output::{NameRewriter, WrapperRewrite};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// JSON description of an exposed hierarchy: the one-time registration step
/// performed before any table is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HierarchyDeclaration {
    #[serde(default)]
    pub types: Vec<TypeDeclaration>,
    #[serde(default)]
    pub wrappers: Vec<WrapperDeclaration>,
    #[serde(default)]
    pub seeds: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub name: String,
    #[serde(default)]
    pub bases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrapperDeclaration {
    pub template: String,
    pub inner: Vec<String>,
    #[serde(default)]
    pub rewrite: Option<WrapperRewrite>,
}

/// A sealed registry, the resolved seed list, and the rewriter the declaration asked for.
pub struct DeclaredHierarchy {
    pub registry: TypeRegistry,
    pub seeds: Vec<TypeId>,
    pub rewriter: NameRewriter,
}

impl HierarchyDeclaration {
    pub fn from_json(text: &str) -> Result<Self, HierarchyError> {
        serde_json::from_str(text).map_err(|e| HierarchyError::Declaration(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, HierarchyError> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn build(&self) -> Result<DeclaredHierarchy, HierarchyError> {
        let mut registry = TypeRegistry::new();

        for decl in &self.types {
            let derived = registry.register(&decl.name);
            let bases: Vec<TypeId> = decl.bases.iter().map(|name| registry.register(name)).collect();
            registry.declare_bases(derived, &bases)?;
        }

        let mut rewriter = NameRewriter::new();
        for decl in &self.wrappers {
            for inner in &decl.inner {
                let inner = registry.register(inner);
                registry.wrap(&decl.template, inner)?;
            }
            if let Some(rule) = decl.rewrite {
                rewriter.set_wrapper_rule(&decl.template, rule);
            }
        }

        registry.expand_wrappers()?;

        let mut seeds = IndexSet::new();
        for name in &self.seeds {
            let id = registry
                .lookup(name)
                .ok_or_else(|| HierarchyError::UnknownSeed(name.clone()))?;
            seeds.insert(id);
        }

        log::debug!(
            "Declared {} types ({} seeds, {} wrapper templates)",
            registry.len(),
            seeds.len(),
            self.wrappers.len()
        );

        Ok(DeclaredHierarchy {
            registry,
            seeds: seeds.into_iter().collect(),
            rewriter,
        })
    }
}
