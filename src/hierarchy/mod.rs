// Thu Oct 15 2026 - Alex

pub mod error;
pub mod registry;
pub mod toposort;
pub mod filter;
pub mod declaration;

pub use error::HierarchyError;
pub use registry::{AncestorSource, TypeEntry, TypeId, TypeRegistry, TypeShape};
pub use toposort::{TypeGraph, TypeGraphBuilder};
pub use filter::{FilteredHierarchy, HierarchyFilter, KnownTypesCatalog};
pub use declaration::{DeclaredHierarchy, HierarchyDeclaration, TypeDeclaration, WrapperDeclaration};

/// Build, filter and catalog the hierarchies of `seeds` in one pass.
pub fn discover<S: AncestorSource + ?Sized>(
    source: &S,
    seeds: &[TypeId],
) -> Result<(FilteredHierarchy, KnownTypesCatalog), HierarchyError> {
    let graphs = TypeGraphBuilder::new(source).build_all(seeds)?;
    let filtered = HierarchyFilter::new(seeds).filter(&graphs);
    let catalog = KnownTypesCatalog::from_hierarchy(&filtered, source)?;
    Ok((filtered, catalog))
}
