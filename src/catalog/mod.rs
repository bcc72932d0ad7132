//! Component catalog - Explicit metadata for scope resolution
//!
//! The catalog replaces runtime reflection: manifests describe assemblies,
//! types, members and exports up front, and scoped catalogs filter them
//! through the scope resolver.

pub mod manifest;
pub mod model;
pub mod scoped;

pub use manifest::Manifest;
pub use model::{
    AssemblyDef, AssemblyId, Catalog, CatalogStats, ExportDef, ExportKey, ExportTarget, MemberDef,
    MemberId, MemberKind, PartDef, PartId, TypeDef, TypeId,
};
pub use scoped::{ScopedCatalog, ScopedPart};
