//! Catalog manifests - TOML/JSON descriptions of assemblies and their exports
//!
//! A manifest is the explicit replacement for runtime metadata: it lists
//! assemblies, their types and members, what each exports, and every scope
//! declaration attached along the way. Loading validates everything and
//! reports all problems at once.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::scope::{NamespaceDeclaration, ScopeDeclaration, ScopeName};
use crate::{Error, Problems, Result};
use super::model::{
    AssemblyDef, AssemblyId, Catalog, ExportDef, ExportTarget, MemberDef, MemberId, MemberKind,
    PartDef, PartId, TypeDef, TypeId,
};

/// Root of a manifest file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, rename = "assembly")]
    pub assemblies: Vec<AssemblyEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyEntry {
    pub name: String,
    /// Assembly-wide declarations
    #[serde(default)]
    pub scopes: Vec<ScopeEntry>,
    #[serde(default)]
    pub namespace_scopes: Vec<NamespaceScopeEntry>,
    #[serde(default)]
    pub types: Vec<TypeEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeEntry {
    pub scope: String,
    #[serde(default)]
    pub excluded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceScopeEntry {
    pub scope: String,
    pub namespace: String,
    #[serde(default)]
    pub excluded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeEntry {
    pub name: String,
    /// Defaults to the enclosing type's namespace, or the global namespace
    #[serde(default)]
    pub namespace: Option<String>,
    /// Name of the enclosing type in the same assembly
    #[serde(default)]
    pub parent: Option<String>,
    /// Contract under which the type itself is exported
    #[serde(default)]
    pub export: Option<String>,
    #[serde(default)]
    pub scopes: Vec<ScopeEntry>,
    #[serde(default)]
    pub members: Vec<MemberEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberEntry {
    pub name: String,
    pub kind: MemberKind,
    #[serde(default)]
    pub export: Option<String>,
    #[serde(default)]
    pub scopes: Vec<ScopeEntry>,
    /// Declarations on a property's getter
    #[serde(default)]
    pub accessor_scopes: Vec<ScopeEntry>,
}

impl Manifest {
    /// Parse a manifest, choosing JSON or TOML by file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let manifest = if is_json {
            serde_json::from_str(&contents)?
        } else {
            toml::from_str(&contents)?
        };
        Ok(manifest)
    }
}

impl Catalog {
    /// Load and validate a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading catalog manifest {}", path.display());
        Self::from_manifest(Manifest::from_path(path)?)
    }

    /// Build a catalog, collecting every validation problem before failing
    pub fn from_manifest(manifest: Manifest) -> Result<Self> {
        let mut builder = CatalogBuilder::default();
        for assembly in &manifest.assemblies {
            builder.add_assembly(assembly);
        }
        builder.finish()
    }
}

#[derive(Default)]
struct CatalogBuilder {
    assemblies: Vec<AssemblyDef>,
    types: Vec<TypeDef>,
    members: Vec<MemberDef>,
    parts: Vec<PartDef>,
    problems: Problems,
}

impl CatalogBuilder {
    fn add_assembly(&mut self, entry: &AssemblyEntry) {
        let ctx = format!("assembly '{}'", entry.name);
        if entry.name.is_empty() {
            self.problems.push("assembly name must not be empty");
        }
        if self.assemblies.iter().any(|a| a.name == entry.name) {
            self.problems.push(format!("{}: declared more than once", ctx));
        }

        let scopes = self.scopes(&entry.scopes, &ctx);
        let namespace_scopes = entry
            .namespace_scopes
            .iter()
            .filter_map(|ns| {
                NamespaceDeclaration::new(ns.scope.clone(), &ns.namespace, ns.excluded)
                    .map_err(|e| self.problems.push(format!("{}: {}", ctx, e)))
                    .ok()
            })
            .collect();

        let assembly_id = AssemblyId(self.assemblies.len() as u32);
        self.assemblies.push(AssemblyDef {
            name: entry.name.clone(),
            scopes,
            namespace_scopes,
        });

        // Pass 1: assign ids so parents can be referenced in any order
        let first = self.types.len();
        let mut by_name: HashMap<&str, TypeId> = HashMap::new();
        for (i, ty) in entry.types.iter().enumerate() {
            let id = TypeId((first + i) as u32);
            if by_name.insert(ty.name.as_str(), id).is_some() {
                self.problems.push(format!("{}: type '{}' declared more than once", ctx, ty.name));
            }
        }

        // Pass 2: parents, then namespaces inherited through them
        let parents: Vec<Option<TypeId>> = entry
            .types
            .iter()
            .map(|ty| {
                let parent = ty.parent.as_deref()?;
                let found = by_name.get(parent).copied();
                if found.is_none() {
                    self.problems.push(format!(
                        "{}: type '{}' has unknown parent '{}'",
                        ctx, ty.name, parent
                    ));
                }
                found
            })
            .collect();

        let mut dropped = false;
        for (i, ty) in entry.types.iter().enumerate() {
            let type_ctx = format!("{}, type '{}'", ctx, ty.name);
            let Some(namespace) = inherited_namespace(&entry.types, &parents, first, i) else {
                self.problems.push(format!("{}: nested types form a cycle", type_ctx));
                dropped = true;
                continue;
            };
            let scopes = self.scopes(&ty.scopes, &type_ctx);
            self.types.push(TypeDef {
                name: ty.name.clone(),
                namespace,
                assembly: assembly_id,
                parent: parents[i],
                scopes,
            });
        }

        if dropped {
            // Ids are no longer dense; skip parts for this assembly
            warn!(assembly = %entry.name, "skipping parts of assembly with a nesting cycle");
            return;
        }

        for (i, ty) in entry.types.iter().enumerate() {
            self.add_part(TypeId((first + i) as u32), ty, &ctx);
        }
    }

    fn add_part(&mut self, type_id: TypeId, entry: &TypeEntry, ctx: &str) {
        let type_ctx = format!("{}, type '{}'", ctx, entry.name);
        let mut exports = Vec::new();

        if let Some(contract) = &entry.export {
            if contract.is_empty() {
                self.problems.push(format!("{}: export contract must not be empty", type_ctx));
            }
            exports.push(ExportDef {
                contract: contract.clone(),
                target: ExportTarget::Type(type_id),
            });
        }

        for member in &entry.members {
            let member_ctx = format!("{}, member '{}'", type_ctx, member.name);
            if !member.accessor_scopes.is_empty() && member.kind != MemberKind::Property {
                self.problems.push(format!(
                    "{}: accessor scopes are only valid on properties",
                    member_ctx
                ));
            }

            let member_id = MemberId(self.members.len() as u32);
            let scopes = self.scopes(&member.scopes, &member_ctx);
            let accessor_scopes = self.scopes(&member.accessor_scopes, &member_ctx);
            self.members.push(MemberDef {
                name: member.name.clone(),
                kind: member.kind,
                declaring_type: type_id,
                scopes,
                accessor_scopes,
            });

            if let Some(contract) = &member.export {
                if contract.is_empty() {
                    self.problems.push(format!("{}: export contract must not be empty", member_ctx));
                }
                exports.push(ExportDef {
                    contract: contract.clone(),
                    target: ExportTarget::Member(member_id),
                });
            }
        }

        if exports.is_empty() {
            return;
        }
        let id = PartId(self.parts.len() as u32);
        debug!(part = id.0, exports = exports.len(), "registered part {}", entry.name);
        self.parts.push(PartDef {
            id,
            part_type: type_id,
            exports,
        });
    }

    fn scopes(&mut self, entries: &[ScopeEntry], ctx: &str) -> Vec<ScopeDeclaration> {
        entries
            .iter()
            .filter_map(|entry| match ScopeName::new(entry.scope.clone()) {
                Ok(scope) => Some(ScopeDeclaration {
                    scope,
                    excluded: entry.excluded,
                }),
                Err(e) => {
                    self.problems.push(format!("{}: {}", ctx, e));
                    None
                }
            })
            .collect()
    }

    fn finish(self) -> Result<Catalog> {
        if !self.problems.is_empty() {
            return Err(Error::Manifest(self.problems));
        }
        Ok(Catalog::from_parts(
            self.assemblies,
            self.types,
            self.members,
            self.parts,
        ))
    }
}

/// Namespace of type `index`, walking up enclosing types. `None` on a cycle.
fn inherited_namespace(
    types: &[TypeEntry],
    parents: &[Option<TypeId>],
    first: usize,
    index: usize,
) -> Option<String> {
    let mut current = index;
    for _ in 0..=types.len() {
        if let Some(namespace) = &types[current].namespace {
            // Still check the rest of the chain for cycles
            return chain_is_acyclic(parents, first, current).then(|| namespace.clone());
        }
        match parents[current] {
            Some(parent) => current = parent.0 as usize - first,
            None => return Some(String::new()),
        }
    }
    None
}

fn chain_is_acyclic(parents: &[Option<TypeId>], first: usize, start: usize) -> bool {
    let mut current = start;
    for _ in 0..=parents.len() {
        match parents[current] {
            Some(parent) => current = parent.0 as usize - first,
            None => return true,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(toml_src: &str) -> Result<Catalog> {
        let manifest: Manifest = toml::from_str(toml_src)?;
        Catalog::from_manifest(manifest)
    }

    #[test]
    fn test_parts_group_type_and_member_exports() {
        let catalog = parse(
            r#"
[[assembly]]
name = "App"

[[assembly.types]]
name = "Widget"
namespace = "App.Ui"
export = "Widget"

[[assembly.types.members]]
name = "Factory"
kind = "method"
export = "WidgetFactory"

[[assembly.types.members]]
name = "NotExported"
kind = "field"

[[assembly.types]]
name = "Helper"
namespace = "App.Ui"
"#,
        )
        .unwrap();

        assert_eq!(catalog.parts().len(), 1);
        assert_eq!(catalog.parts()[0].exports.len(), 2);
        assert_eq!(catalog.stats().members, 2);
    }

    #[test]
    fn test_nested_type_inherits_namespace() {
        let catalog = parse(
            r#"
[[assembly]]
name = "App"

[[assembly.types]]
name = "Inner"
parent = "Outer"
export = "Inner"

[[assembly.types]]
name = "Outer"
namespace = "App.Core"
"#,
        )
        .unwrap();

        let inner = catalog.type_def(TypeId(0));
        assert_eq!(inner.namespace, "App.Core");
        assert_eq!(inner.parent, Some(TypeId(1)));
        assert_eq!(catalog.type_name(TypeId(0)), "App.Core.Outer+Inner");
    }

    #[test]
    fn test_all_problems_reported_together() {
        let err = parse(
            r#"
[[assembly]]
name = "App"
scopes = [{ scope = "" }]
namespace_scopes = [{ scope = "quoi", namespace = "" }]

[[assembly.types]]
name = "Widget"
namespace = "App"
parent = "Missing"
scopes = [{ scope = "" }]
"#,
        )
        .unwrap_err();

        match err {
            Error::Manifest(problems) => {
                assert_eq!(problems.len(), 4, "{}", problems);
                assert!(problems.iter().any(|p| p.contains("unknown parent 'Missing'")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_accessor_scopes_require_property() {
        let err = parse(
            r#"
[[assembly]]
name = "App"

[[assembly.types]]
name = "Widget"
namespace = "App"

[[assembly.types.members]]
name = "Run"
kind = "method"
export = "Run"
accessor_scopes = [{ scope = "foo" }]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("only valid on properties"));
    }

    #[test]
    fn test_nesting_cycle_rejected() {
        let err = parse(
            r#"
[[assembly]]
name = "App"

[[assembly.types]]
name = "A"
parent = "B"

[[assembly.types]]
name = "B"
parent = "A"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_load_json_manifest() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"assembly": [{{"name": "App", "scopes": [{{"scope": "bar"}}],
                "types": [{{"name": "Widget", "namespace": "App", "export": "Widget"}}]}}]}}"#
        )
        .unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.parts().len(), 1);
        assert_eq!(catalog.assembly(AssemblyId(0)).scopes.len(), 1);
    }

    #[test]
    fn test_demo_catalog_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/catalog.toml");
        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.parts().len(), 4);
        assert_eq!(catalog.export_count(), 6);
        assert_eq!(catalog.scope_names().len(), 4);
    }

    #[test]
    fn test_load_toml_manifest() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[[assembly]]\nname = \"App\"").unwrap();
        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.parts().len(), 0);
    }
}
