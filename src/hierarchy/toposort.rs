// Thu Oct 15 2026 - Alex

use crate::hierarchy::{AncestorSource, HierarchyError, TypeId};
use std::collections::HashSet;

/// A seed type followed by each of its transitive ancestors exactly once,
/// most-derived first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeGraph {
    order: Vec<TypeId>,
}

impl TypeGraph {
    pub fn seed(&self) -> TypeId {
        self.order[0]
    }

    pub fn ancestors(&self) -> &[TypeId] {
        &self.order[1..]
    }

    pub fn order(&self) -> &[TypeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn contains(&self, id: TypeId) -> bool {
        self.order.contains(&id)
    }

    /// Keep the seed and those ancestors accepted by `keep`, preserving order.
    pub fn retain<F: Fn(TypeId) -> bool>(&self, keep: F) -> TypeGraph {
        let order = std::iter::once(self.seed())
            .chain(self.ancestors().iter().copied().filter(|id| keep(*id)))
            .collect();
        TypeGraph { order }
    }
}

#[derive(Default)]
struct VisitState {
    /// Temporary marks, in recursion order so a cycle can be reported as a path.
    wip: Vec<TypeId>,
    done: HashSet<TypeId>,
}

/// Depth-first topological sort over declared ancestors.
pub struct TypeGraphBuilder<'a, S: AncestorSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: AncestorSource + ?Sized> TypeGraphBuilder<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    pub fn build(&self, seed: TypeId) -> Result<TypeGraph, HierarchyError> {
        let mut state = VisitState::default();
        let order = self.visit(seed, &mut state)?;
        Ok(TypeGraph { order })
    }

    pub fn build_all(&self, seeds: &[TypeId]) -> Result<Vec<TypeGraph>, HierarchyError> {
        seeds.iter().map(|seed| self.build(*seed)).collect()
    }

    fn visit(&self, here: TypeId, state: &mut VisitState) -> Result<Vec<TypeId>, HierarchyError> {
        if state.done.contains(&here) {
            return Ok(Vec::new());
        }
        if let Some(pos) = state.wip.iter().position(|id| *id == here) {
            return Err(self.cycle_error(&state.wip[pos..], here));
        }

        state.wip.push(here);

        // Each base's output goes in front of what its earlier siblings produced,
        // so a shared ancestor always lands after every type deriving from it.
        let mut tail = Vec::new();
        for base in self.source.direct_ancestors(here)? {
            let mut front = self.visit(*base, state)?;
            front.extend(tail);
            tail = front;
        }

        state.wip.pop();
        state.done.insert(here);

        let mut order = Vec::with_capacity(tail.len() + 1);
        order.push(here);
        order.extend(tail);
        Ok(order)
    }

    fn cycle_error(&self, stack: &[TypeId], here: TypeId) -> HierarchyError {
        let path = stack
            .iter()
            .chain(std::iter::once(&here))
            .map(|id| match self.source.display_name(*id) {
                Ok(name) => name.to_string(),
                Err(_) => id.to_string(),
            })
            .collect();
        HierarchyError::Cycle { path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::TypeRegistry;

    fn diamond() -> (TypeRegistry, [TypeId; 4]) {
        let mut registry = TypeRegistry::new();
        let a = registry.register("A");
        let b = registry.register("B");
        let c = registry.register("C");
        let d = registry.register("D");
        registry.declare_bases(b, &[a]).unwrap();
        registry.declare_bases(c, &[a]).unwrap();
        registry.declare_bases(d, &[b, c]).unwrap();
        (registry, [a, b, c, d])
    }

    #[test]
    fn test_seed_without_bases() {
        let (registry, [a, ..]) = diamond();
        let graph = TypeGraphBuilder::new(&registry).build(a).unwrap();
        assert_eq!(graph.order(), &[a]);
        assert!(graph.ancestors().is_empty());
    }

    #[test]
    fn test_diamond_collapses_shared_ancestor() {
        let (registry, [a, b, c, d]) = diamond();
        let graph = TypeGraphBuilder::new(&registry).build(d).unwrap();

        assert_eq!(graph.seed(), d);
        assert_eq!(graph.order().iter().filter(|id| **id == a).count(), 1);
        assert_eq!(graph.order(), &[d, c, b, a]);
    }

    #[test]
    fn test_order_is_topological() {
        let (registry, ids) = diamond();
        let builder = TypeGraphBuilder::new(&registry);
        for seed in ids {
            let graph = builder.build(seed).unwrap();
            let order = graph.order();
            for (i, id) in order.iter().enumerate() {
                for base in registry.direct_ancestors(*id).unwrap() {
                    let base_pos = order.iter().position(|x| x == base).unwrap();
                    assert!(base_pos > i, "{:?} appears before its derived type", base);
                }
            }
        }
    }

    #[test]
    fn test_no_duplicates_in_deep_lattice() {
        let mut registry = TypeRegistry::new();
        let ids: Vec<TypeId> = (0..8).map(|i| registry.register(&format!("T{}", i))).collect();
        for i in 1..ids.len() {
            let bases: Vec<TypeId> = ids[..i].iter().rev().copied().collect();
            registry.declare_bases(ids[i], &bases).unwrap();
        }

        let graph = TypeGraphBuilder::new(&registry).build(ids[7]).unwrap();
        let unique: HashSet<TypeId> = graph.order().iter().copied().collect();
        assert_eq!(graph.len(), 8);
        assert_eq!(unique.len(), 8);
        assert_eq!(graph.seed(), ids[7]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let mut registry = TypeRegistry::new();
        let x = registry.register("X");
        let y = registry.register("Y");
        let z = registry.register("Z");
        registry.declare_bases(x, &[y]).unwrap();
        registry.declare_bases(y, &[z]).unwrap();
        registry.declare_bases(z, &[x]).unwrap();

        match TypeGraphBuilder::new(&registry).build(x) {
            Err(HierarchyError::Cycle { path }) => assert_eq!(path, vec!["X", "Y", "Z", "X"]),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_base_is_a_cycle() {
        let mut registry = TypeRegistry::new();
        let x = registry.register("X");
        registry.declare_bases(x, &[x]).unwrap();
        assert!(matches!(
            TypeGraphBuilder::new(&registry).build(x),
            Err(HierarchyError::Cycle { .. })
        ));
    }
}
