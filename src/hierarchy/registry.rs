// Thu Oct 15 2026 - Alex

use crate::hierarchy::HierarchyError;
use std::collections::HashMap;
use std::fmt;

/// Small index identifying a type registered in a [`TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

impl TypeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    /// An ordinary type whose direct bases are declared explicitly.
    Plain,
    /// A covariant wrapper such as a shared-ownership handle. Its bases are
    /// the wrapped forms of `inner`'s bases.
    Wrapper { template: String, inner: TypeId },
}

#[derive(Debug, Clone)]
pub struct TypeEntry {
    name: String,
    bases: Vec<TypeId>,
    shape: TypeShape,
}

impl TypeEntry {
    fn new(name: &str, shape: TypeShape) -> Self {
        Self {
            name: name.to_string(),
            bases: Vec::new(),
            shape,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bases(&self) -> &[TypeId] {
        &self.bases
    }

    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }

    pub fn is_wrapper(&self) -> bool {
        matches!(self.shape, TypeShape::Wrapper { .. })
    }
}

/// The adjacency function consumed by the graph builder.
pub trait AncestorSource {
    /// Direct ancestors of `id` in declared order. No declaration means no ancestors.
    fn direct_ancestors(&self, id: TypeId) -> Result<&[TypeId], HierarchyError>;

    fn display_name(&self, id: TypeId) -> Result<&str, HierarchyError>;
}

/// Explicit registry of exposed types and their declared ancestor relation.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entries: Vec<TypeEntry>,
    by_name: HashMap<String, TypeId>,
    wrappers: HashMap<(String, TypeId), TypeId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find-or-insert a plain type by its display name.
    pub fn register(&mut self, name: &str) -> TypeId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = TypeId(self.entries.len());
        self.entries.push(TypeEntry::new(name, TypeShape::Plain));
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Append direct bases to `derived`, keeping declaration order and
    /// ignoring bases that were already declared.
    pub fn declare_bases(&mut self, derived: TypeId, bases: &[TypeId]) -> Result<(), HierarchyError> {
        for base in bases {
            self.entry(*base)?;
        }

        let entry = self.entry_mut(derived)?;
        if entry.is_wrapper() {
            return Err(HierarchyError::WrapperBases(entry.name.clone()));
        }
        for base in bases {
            if !entry.bases.contains(base) {
                entry.bases.push(*base);
            }
        }
        Ok(())
    }

    /// Register `template<inner>` as a covariant wrapper around `inner`.
    pub fn wrap(&mut self, template: &str, inner: TypeId) -> Result<TypeId, HierarchyError> {
        let key = (template.to_string(), inner);
        if let Some(id) = self.wrappers.get(&key) {
            return Ok(*id);
        }

        let name = format!("{}<{}>", template, self.entry(inner)?.name);
        let shape = TypeShape::Wrapper {
            template: template.to_string(),
            inner,
        };

        let id = match self.by_name.get(&name).copied() {
            Some(existing) => {
                let entry = self.entry_mut(existing)?;
                if !entry.bases.is_empty() {
                    return Err(HierarchyError::WrapperBases(name));
                }
                entry.shape = shape;
                existing
            }
            None => {
                let id = TypeId(self.entries.len());
                self.entries.push(TypeEntry::new(&name, shape));
                self.by_name.insert(name, id);
                id
            }
        };

        self.wrappers.insert(key, id);
        Ok(id)
    }

    /// Derive the bases of every wrapper entry from its inner type, registering
    /// the wrapped ancestors as needed, until nothing changes.
    pub fn expand_wrappers(&mut self) -> Result<(), HierarchyError> {
        loop {
            let mut changed = false;
            let mut cursor = 0;

            while cursor < self.entries.len() {
                if let TypeShape::Wrapper { template, inner } = self.entries[cursor].shape.clone() {
                    let inner_bases = self.entry(inner)?.bases.clone();
                    let mut bases = Vec::with_capacity(inner_bases.len());
                    for base in inner_bases {
                        bases.push(self.wrap(&template, base)?);
                    }
                    if self.entries[cursor].bases != bases {
                        self.entries[cursor].bases = bases;
                        changed = true;
                    }
                }
                cursor += 1;
            }

            if !changed {
                return Ok(());
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn entry(&self, id: TypeId) -> Result<&TypeEntry, HierarchyError> {
        self.entries.get(id.0).ok_or(HierarchyError::UnknownType(id.0))
    }

    fn entry_mut(&mut self, id: TypeId) -> Result<&mut TypeEntry, HierarchyError> {
        self.entries.get_mut(id.0).ok_or(HierarchyError::UnknownType(id.0))
    }

    pub fn name(&self, id: TypeId) -> Result<&str, HierarchyError> {
        self.entry(id).map(TypeEntry::name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (TypeId(i), e))
    }
}

impl AncestorSource for TypeRegistry {
    fn direct_ancestors(&self, id: TypeId) -> Result<&[TypeId], HierarchyError> {
        self.entry(id).map(TypeEntry::bases)
    }

    fn display_name(&self, id: TypeId) -> Result<&str, HierarchyError> {
        self.name(id)
    }
}
