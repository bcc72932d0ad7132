//! Catalog metadata - Assemblies, types, members and the parts they export
//!
//! The catalog is an arena: everything refers to everything else by id, and
//! nothing changes after construction. Scope declarations are attached as
//! plain data at each level, ready to be handed to the resolver.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::scope::{
    AssemblyScopes, Candidate, NamespaceDeclaration, ScopeDeclaration, ScopeName,
};
use super::scoped::{ScopedCatalog, ScopedCatalogCache};

/// Index of an assembly in its catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AssemblyId(pub u32);

/// Index of a type in its catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

/// Index of a member in its catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MemberId(pub u32);

/// Index of a part in its catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PartId(pub u32);

/// A unit of deployment carrying assembly-wide and namespace scope rules.
#[derive(Debug, Clone)]
pub struct AssemblyDef {
    pub name: String,
    pub scopes: Vec<ScopeDeclaration>,
    pub namespace_scopes: Vec<NamespaceDeclaration>,
}

impl AssemblyDef {
    pub fn scopes(&self) -> AssemblyScopes<'_> {
        AssemblyScopes {
            name: &self.name,
            local: &self.scopes,
            namespaces: &self.namespace_scopes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: String,
    pub namespace: String,
    pub assembly: AssemblyId,
    /// Enclosing type, for nested types
    pub parent: Option<TypeId>,
    pub scopes: Vec<ScopeDeclaration>,
}

/// Kind of exported member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Field,
    Method,
    Property,
}

#[derive(Debug, Clone)]
pub struct MemberDef {
    pub name: String,
    pub kind: MemberKind,
    pub declaring_type: TypeId,
    pub scopes: Vec<ScopeDeclaration>,
    /// Declarations on the property's accessor method. Always empty for
    /// fields and methods.
    pub accessor_scopes: Vec<ScopeDeclaration>,
}

/// What an export hands out: a whole type or one of its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "id")]
pub enum ExportTarget {
    Type(TypeId),
    Member(MemberId),
}

#[derive(Debug, Clone)]
pub struct ExportDef {
    pub contract: String,
    pub target: ExportTarget,
}

/// A composable part: one type and the exports it contributes.
#[derive(Debug, Clone)]
pub struct PartDef {
    pub id: PartId,
    pub part_type: TypeId,
    pub exports: Vec<ExportDef>,
}

/// Identity of one export within a catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ExportKey {
    pub part: PartId,
    pub index: u32,
}

/// Immutable component catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    pub(crate) assemblies: Vec<AssemblyDef>,
    pub(crate) types: Vec<TypeDef>,
    pub(crate) members: Vec<MemberDef>,
    pub(crate) parts: Vec<PartDef>,
    scoped: ScopedCatalogCache,
}

impl Catalog {
    pub(crate) fn from_parts(
        assemblies: Vec<AssemblyDef>,
        types: Vec<TypeDef>,
        members: Vec<MemberDef>,
        parts: Vec<PartDef>,
    ) -> Self {
        Self {
            assemblies,
            types,
            members,
            parts,
            scoped: ScopedCatalogCache::default(),
        }
    }

    pub fn assembly(&self, id: AssemblyId) -> &AssemblyDef {
        &self.assemblies[id.0 as usize]
    }

    pub fn type_def(&self, id: TypeId) -> &TypeDef {
        &self.types[id.0 as usize]
    }

    pub fn member(&self, id: MemberId) -> &MemberDef {
        &self.members[id.0 as usize]
    }

    pub fn parts(&self) -> &[PartDef] {
        &self.parts
    }

    pub fn part(&self, id: PartId) -> &PartDef {
        &self.parts[id.0 as usize]
    }

    pub fn export(&self, key: ExportKey) -> &ExportDef {
        &self.part(key.part).exports[key.index as usize]
    }

    /// All exports with their keys
    pub fn exports(&self) -> impl Iterator<Item = (ExportKey, &ExportDef)> {
        self.parts.iter().flat_map(|part| {
            part.exports.iter().enumerate().map(move |(i, export)| {
                (
                    ExportKey {
                        part: part.id,
                        index: i as u32,
                    },
                    export,
                )
            })
        })
    }

    /// Exports published under `contract`
    pub fn exports_for<'a>(
        &'a self,
        contract: &'a str,
    ) -> impl Iterator<Item = (ExportKey, &'a ExportDef)> + 'a {
        self.exports().filter(move |(_, e)| e.contract == contract)
    }

    pub fn export_count(&self) -> usize {
        self.parts.iter().map(|p| p.exports.len()).sum()
    }

    /// Fully qualified type name, nested types joined with `+`
    pub fn type_name(&self, id: TypeId) -> String {
        let ty = self.type_def(id);
        let mut chain = vec![ty.name.as_str()];
        let mut parent = ty.parent;
        while let Some(p) = parent {
            let parent_ty = self.type_def(p);
            chain.push(parent_ty.name.as_str());
            parent = parent_ty.parent;
        }
        chain.reverse();
        if ty.namespace.is_empty() {
            chain.join("+")
        } else {
            format!("{}.{}", ty.namespace, chain.join("+"))
        }
    }

    /// Display name of an export target
    pub fn target_name(&self, target: ExportTarget) -> String {
        match target {
            ExportTarget::Type(t) => self.type_name(t),
            ExportTarget::Member(m) => {
                let member = self.member(m);
                format!("{}::{}", self.type_name(member.declaring_type), member.name)
            }
        }
    }

    /// Build the resolver's view of an export target.
    ///
    /// A type export is its own member; its enclosing type (if any) plays the
    /// declaring-type role. A member export also sees its accessor's declarations.
    pub fn candidate(&self, target: ExportTarget) -> Candidate<'_> {
        let (member_scopes, accessor_scopes, declaring_type, owner) = match target {
            ExportTarget::Type(t) => {
                let ty = self.type_def(t);
                (ty.scopes.as_slice(), &[] as &[ScopeDeclaration], ty.parent, t)
            }
            ExportTarget::Member(m) => {
                let member = self.member(m);
                (
                    member.scopes.as_slice(),
                    member.accessor_scopes.as_slice(),
                    Some(member.declaring_type),
                    member.declaring_type,
                )
            }
        };

        let owner_ty = self.type_def(owner);
        let mut candidate = Candidate::new()
            .with_member_scopes(member_scopes)
            .with_member_scopes(accessor_scopes)
            .with_namespace(&owner_ty.namespace)
            .with_assembly(self.assembly(owner_ty.assembly).scopes());

        if let Some(declaring) = declaring_type {
            candidate = candidate.with_type_scopes(&self.type_def(declaring).scopes);
        }

        candidate
    }

    /// Every scope name declared anywhere in the catalog
    pub fn scope_names(&self) -> BTreeSet<ScopeName> {
        let mut names = BTreeSet::new();
        for assembly in &self.assemblies {
            names.extend(assembly.scopes.iter().map(|d| d.scope.clone()));
            names.extend(assembly.namespace_scopes.iter().map(|d| d.scope().clone()));
        }
        for ty in &self.types {
            names.extend(ty.scopes.iter().map(|d| d.scope.clone()));
        }
        for member in &self.members {
            names.extend(member.scopes.iter().map(|d| d.scope.clone()));
            names.extend(member.accessor_scopes.iter().map(|d| d.scope.clone()));
        }
        names
    }

    /// Scoped view of this catalog, shared between callers while alive
    pub fn scoped(self: &Arc<Self>, scope: &ScopeName) -> Arc<ScopedCatalog> {
        self.scoped.get_or_build(self, scope)
    }

    #[cfg(test)]
    pub(crate) fn scoped_cache(&self) -> &ScopedCatalogCache {
        &self.scoped
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            assemblies: self.assemblies.len(),
            types: self.types.len(),
            members: self.members.len(),
            parts: self.parts.len(),
            exports: self.export_count(),
            scopes: self.scope_names().len(),
        }
    }
}

/// Statistics about a catalog
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub assemblies: usize,
    pub types: usize,
    pub members: usize,
    pub parts: usize,
    pub exports: usize,
    pub scopes: usize,
}

impl std::fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Catalog Statistics:")?;
        writeln!(f, "  Assemblies: {}", self.assemblies)?;
        writeln!(f, "  Types: {} (members: {})", self.types, self.members)?;
        writeln!(f, "  Parts: {} (exports: {})", self.parts, self.exports)?;
        writeln!(f, "  Scopes: {}", self.scopes)
    }
}
