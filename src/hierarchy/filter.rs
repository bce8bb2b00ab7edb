// Thu Oct 15 2026 - Alex

use crate::hierarchy::{AncestorSource, HierarchyError, TypeGraph, TypeId};
use indexmap::{IndexMap, IndexSet};

/// Per-seed type graphs restricted to the exposed seed set, in seed order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredHierarchy {
    graphs: Vec<TypeGraph>,
}

impl FilteredHierarchy {
    pub fn graphs(&self) -> &[TypeGraph] {
        &self.graphs
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeGraph> {
        self.graphs.iter()
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

pub struct HierarchyFilter {
    seeds: IndexSet<TypeId>,
}

impl HierarchyFilter {
    pub fn new(seeds: &[TypeId]) -> Self {
        Self {
            seeds: seeds.iter().copied().collect(),
        }
    }

    pub fn is_exposed(&self, id: TypeId) -> bool {
        self.seeds.contains(&id)
    }

    /// Drop every ancestor the caller did not ask to expose.
    pub fn filter(&self, graphs: &[TypeGraph]) -> FilteredHierarchy {
        let graphs = graphs
            .iter()
            .map(|graph| graph.retain(|id| self.is_exposed(id)))
            .collect();
        FilteredHierarchy { graphs }
    }
}

/// Deduplicated union of every type appearing in a [`FilteredHierarchy`],
/// with display names resolved. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownTypesCatalog {
    types: IndexMap<TypeId, String>,
}

impl KnownTypesCatalog {
    pub fn from_hierarchy<S: AncestorSource + ?Sized>(
        hierarchy: &FilteredHierarchy,
        source: &S,
    ) -> Result<Self, HierarchyError> {
        let mut types = IndexMap::new();
        for id in hierarchy.iter().flat_map(|graph| graph.order().iter().copied()) {
            if !types.contains_key(&id) {
                types.insert(id, source.display_name(id)?.to_string());
            }
        }
        Ok(Self { types })
    }

    pub fn contains(&self, id: TypeId) -> bool {
        self.types.contains_key(&id)
    }

    pub fn name(&self, id: TypeId) -> Option<&str> {
        self.types.get(&id).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
