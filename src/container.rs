//! Composition containers - Scoped lookups with parent fallback
//!
//! A root container sees the whole catalog. A child container is built for
//! a scope name and only sees what that scope includes; with inheritance
//! enabled, contracts it cannot satisfy are looked up in its parent.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::catalog::{Catalog, ExportKey, ScopedCatalog};
use crate::scope::ScopeName;
use crate::{Error, Problems, Result};

/// An export handed out by a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRef {
    pub key: ExportKey,
    pub contract: String,
    /// Qualified name of the exported type or member
    pub target: String,
    /// Scope of the container that provided the export, `None` for the root
    pub provider: Option<ScopeName>,
}

#[derive(Debug)]
pub struct Container {
    catalog: Arc<Catalog>,
    /// Scoped views an export must pass, outermost first
    filters: Vec<Arc<ScopedCatalog>>,
    parent: Option<Arc<Container>>,
}

impl Container {
    /// Root container over a whole catalog
    pub fn new(catalog: Arc<Catalog>) -> Arc<Self> {
        Arc::new(Self {
            catalog,
            filters: Vec::new(),
            parent: None,
        })
    }

    /// Child container restricted to `scope`.
    ///
    /// With `inherit`, lookups the child cannot satisfy fall back to `self`.
    pub fn child(self: &Arc<Self>, scope: &ScopeName, inherit: bool) -> Arc<Container> {
        let mut filters = self.filters.clone();
        filters.push(self.catalog.scoped(scope));
        debug!(scope = %scope, inherit, depth = filters.len(), "created child container");

        Arc::new(Self {
            catalog: Arc::clone(&self.catalog),
            filters,
            parent: inherit.then(|| Arc::clone(self)),
        })
    }

    pub fn scope(&self) -> Option<&ScopeName> {
        self.scoped_catalog().map(|c| c.scope())
    }

    /// The scoped catalog this container was created for
    pub fn scoped_catalog(&self) -> Option<&Arc<ScopedCatalog>> {
        self.filters.last()
    }

    pub fn parent(&self) -> Option<&Arc<Container>> {
        self.parent.as_ref()
    }

    pub fn describe(&self) -> String {
        match self.scope() {
            Some(scope) => format!("container '{}'", scope),
            None => "root container".to_string(),
        }
    }

    fn is_visible(&self, key: ExportKey) -> bool {
        self.filters.iter().all(|f| f.contains(key))
    }

    /// Exports for `contract` visible in this container, ignoring the parent
    pub fn local_exports(&self, contract: &str) -> Vec<ExportRef> {
        self.catalog
            .exports_for(contract)
            .filter(|(key, _)| self.is_visible(*key))
            .map(|(key, export)| ExportRef {
                key,
                contract: export.contract.clone(),
                target: self.catalog.target_name(export.target),
                provider: self.scope().cloned(),
            })
            .collect()
    }

    /// The single export for `contract`, falling back to the parent when inheriting
    pub fn get_export(&self, contract: &str) -> Result<ExportRef> {
        let mut found = self.local_exports(contract);
        match found.len() {
            1 => Ok(found.remove(0)),
            0 => match &self.parent {
                Some(parent) => {
                    debug!(contract, "not in {}, asking parent", self.describe());
                    parent.get_export(contract)
                }
                None => Err(Error::ExportNotFound {
                    contract: contract.to_string(),
                    container: self.describe(),
                }),
            },
            count => Err(Error::AmbiguousExport {
                contract: contract.to_string(),
                container: self.describe(),
                count,
            }),
        }
    }

    /// Resolve several contracts, reporting every failure together
    pub fn get_exports<'c, I>(&self, contracts: I) -> Result<Vec<ExportRef>>
    where
        I: IntoIterator<Item = &'c str>,
    {
        let mut resolved = Vec::new();
        let mut problems = Problems::new();

        for contract in contracts {
            match self.get_export(contract) {
                Ok(export) => resolved.push(export),
                Err(e) => problems.push(e.to_string()),
            }
        }

        if problems.is_empty() {
            Ok(resolved)
        } else {
            Err(Error::Composition(problems))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Manifest;

    const FIXTURE: &str = r#"
[[assembly]]
name = "Fixture.Tests"
scopes = [{ scope = "bar" }]
namespace_scopes = [
    { scope = "quoi", namespace = "Fixture" },
    { scope = "quoi", namespace = "Fixture.Tests.TestNamespace", excluded = true },
]

[[assembly.types]]
name = "Suite"
namespace = "Fixture.Tests"

[[assembly.types]]
name = "TestType"
parent = "Suite"
export = "TestType"
scopes = [{ scope = "foo" }]

[[assembly.types.members]]
name = "ExcludedTestProp"
kind = "field"
export = "ExcludedTestPropName"
scopes = [
    { scope = "foo", excluded = true },
    { scope = "bar", excluded = true },
    { scope = "quoi", excluded = true },
]

[[assembly.types.members]]
name = "IncludedTestProp"
kind = "field"
export = "IncludedTestPropName"

[[assembly.types]]
name = "TestType2"
parent = "Suite"
export = "TestType2"
scopes = [{ scope = "bar", excluded = true }]

[[assembly.types]]
name = "ChildTestType"
parent = "TestType2"
export = "ChildTestType"

[[assembly.types]]
name = "NamespacedType"
namespace = "Fixture.Tests.TestNamespace"
export = "NamespacedType"
"#;

    fn root() -> Arc<Container> {
        let manifest: Manifest = toml::from_str(FIXTURE).unwrap();
        Container::new(Arc::new(Catalog::from_manifest(manifest).unwrap()))
    }

    fn scope(name: &str) -> ScopeName {
        ScopeName::new(name).unwrap()
    }

    /// Name of the scope that provided `contract`, `None` when it came from the root
    fn provider(container: &Container, contract: &str) -> Option<String> {
        container
            .get_export(contract)
            .unwrap()
            .provider
            .map(String::from)
    }

    #[test]
    fn test_member_scope_include_and_exclude() {
        let foo = root().child(&scope("foo"), true);
        assert_eq!(provider(&foo, "IncludedTestPropName").as_deref(), Some("foo"));
        assert_eq!(provider(&foo, "ExcludedTestPropName"), None);
    }

    #[test]
    fn test_namespace_scopes() {
        let quoi = root().child(&scope("quoi"), true);
        assert_eq!(provider(&quoi, "IncludedTestPropName").as_deref(), Some("quoi"));
        assert_eq!(provider(&quoi, "ExcludedTestPropName"), None);
        // The deeper, excluding namespace rule wins
        assert_eq!(provider(&quoi, "NamespacedType"), None);
    }

    #[test]
    fn test_assembly_scopes() {
        let bar = root().child(&scope("bar"), true);
        assert_eq!(provider(&bar, "IncludedTestPropName").as_deref(), Some("bar"));
        assert_eq!(provider(&bar, "ExcludedTestPropName"), None);
    }

    #[test]
    fn test_nested_type_inherits_enclosing_exclusion() {
        let bar = root().child(&scope("bar"), true);
        assert_eq!(provider(&bar, "ChildTestType"), None);
        assert_eq!(provider(&bar, "TestType").as_deref(), Some("bar"));
    }

    #[test]
    fn test_scoped_catalog_reuse() {
        let root = root();
        let first = root.child(&scope("foo"), true);
        let second = root.child(&scope("foo"), false);
        assert!(Arc::ptr_eq(
            first.scoped_catalog().unwrap(),
            second.scoped_catalog().unwrap()
        ));
    }

    #[test]
    fn test_without_inheritance_missing_exports_fail() {
        let foo = root().child(&scope("foo"), false);
        let err = foo.get_export("ExcludedTestPropName").unwrap_err();
        assert!(matches!(err, Error::ExportNotFound { .. }));
    }

    #[test]
    fn test_grandchild_sees_intersection() {
        let root = root();
        let bar = root.child(&scope("bar"), true);
        let foo_in_bar = bar.child(&scope("foo"), false);
        // TestType is in both scopes, IncludedTestProp only via foo's type rule and bar's assembly rule
        assert!(foo_in_bar.get_export("TestType").is_ok());
        assert!(foo_in_bar.get_export("IncludedTestPropName").is_ok());
        // NamespacedType is in bar but not foo
        assert!(foo_in_bar.get_export("NamespacedType").is_err());
    }

    #[test]
    fn test_failures_are_aggregated() {
        let foo = root().child(&scope("foo"), false);
        let err = foo
            .get_exports(["Missing", "ExcludedTestPropName", "TestType"])
            .unwrap_err();
        match err {
            Error::Composition(problems) => {
                assert_eq!(problems.len(), 2);
                assert!(problems.iter().all(|p| p.contains("container 'foo'")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_root_sees_everything() {
        let root = root();
        assert_eq!(root.describe(), "root container");
        assert!(root.get_exports(["TestType", "NamespacedType", "ChildTestType"]).is_ok());
    }
}
