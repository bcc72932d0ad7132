//! Scoped catalogs - The part of a catalog visible inside one scope
//!
//! Every export is run through the [`ScopeResolver`]; parts left without any
//! visible export disappear from the view. Views are cached per scope name
//! on their base catalog and shared for as long as someone holds them.

use std::collections::BTreeSet;
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::scope::{Resolution, ScopeName, ScopeResolver};
use super::model::{Catalog, ExportDef, ExportKey, PartDef, PartId};

/// A part with the subset of its exports that survived filtering
#[derive(Debug, Clone)]
pub struct ScopedPart {
    pub part: PartId,
    pub exports: Vec<ExportKey>,
}

/// Filtered, read-only view of a catalog for one scope.
#[derive(Debug)]
pub struct ScopedCatalog {
    base: Arc<Catalog>,
    scope: ScopeName,
    parts: Vec<ScopedPart>,
    visible: BTreeSet<ExportKey>,
}

impl ScopedCatalog {
    /// Filter `base` down to what `scope` can see
    pub fn new(base: Arc<Catalog>, scope: ScopeName) -> Self {
        let resolver = ScopeResolver::new(scope.clone());
        let mut parts = Vec::new();
        let mut visible = BTreeSet::new();

        for part in base.parts() {
            if let Some(scoped) = filter_part(&base, &resolver, part) {
                visible.extend(scoped.exports.iter().copied());
                parts.push(scoped);
            }
        }

        debug!(
            scope = %scope,
            parts = parts.len(),
            exports = visible.len(),
            total = base.export_count(),
            "built scoped catalog"
        );

        Self {
            base,
            scope,
            parts,
            visible,
        }
    }

    pub fn scope(&self) -> &ScopeName {
        &self.scope
    }

    pub fn base(&self) -> &Arc<Catalog> {
        &self.base
    }

    pub fn parts(&self) -> &[ScopedPart] {
        &self.parts
    }

    pub fn contains(&self, key: ExportKey) -> bool {
        self.visible.contains(&key)
    }

    pub fn export_count(&self) -> usize {
        self.visible.len()
    }

    /// Visible exports, in catalog order
    pub fn exports(&self) -> impl Iterator<Item = (ExportKey, &ExportDef)> {
        self.visible.iter().map(|key| (*key, self.base.export(*key)))
    }

    /// Visible exports published under `contract`
    pub fn exports_for<'a>(
        &'a self,
        contract: &'a str,
    ) -> impl Iterator<Item = (ExportKey, &'a ExportDef)> + 'a {
        self.exports().filter(move |(_, e)| e.contract == contract)
    }

    /// Explain the verdict for any export of the base catalog
    pub fn explain(&self, key: ExportKey) -> Resolution {
        let resolver = ScopeResolver::new(self.scope.clone());
        resolver.explain(&self.base.candidate(self.base.export(key).target))
    }
}

fn filter_part(catalog: &Catalog, resolver: &ScopeResolver, part: &PartDef) -> Option<ScopedPart> {
    let exports: Vec<ExportKey> = part
        .exports
        .iter()
        .enumerate()
        .filter(|(_, export)| {
            let included = resolver.resolve(&catalog.candidate(export.target));
            trace!(contract = %export.contract, included, "export filtered");
            included
        })
        .map(|(i, _)| ExportKey {
            part: part.id,
            index: i as u32,
        })
        .collect();

    if exports.is_empty() {
        None
    } else {
        Some(ScopedPart {
            part: part.id,
            exports,
        })
    }
}

/// Live scoped catalogs of one base catalog, keyed by scope name
#[derive(Debug, Default)]
pub(crate) struct ScopedCatalogCache {
    entries: DashMap<ScopeName, Weak<ScopedCatalog>>,
}

impl ScopedCatalogCache {
    pub(crate) fn get_or_build(&self, base: &Arc<Catalog>, scope: &ScopeName) -> Arc<ScopedCatalog> {
        // Drop entries whose catalogs are gone
        self.entries.retain(|_, catalog| catalog.strong_count() > 0);

        let mut entry = self.entries.entry(scope.clone()).or_default();
        if let Some(existing) = entry.upgrade() {
            trace!(scope = %scope, "reusing scoped catalog");
            return existing;
        }

        let catalog = Arc::new(ScopedCatalog::new(Arc::clone(base), scope.clone()));
        *entry = Arc::downgrade(&catalog);
        catalog
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::manifest::Manifest;
    use crate::scope::RuleGroup;

    const MANIFEST: &str = r#"
[[assembly]]
name = "App"

[[assembly.types]]
name = "Service"
namespace = "App.Services"
export = "Service"
scopes = [{ scope = "foo" }]

[[assembly.types.members]]
name = "Hidden"
kind = "field"
export = "Hidden"
scopes = [{ scope = "foo", excluded = true }]

[[assembly.types]]
name = "Unscoped"
namespace = "App.Services"
export = "Unscoped"
"#;

    fn catalog() -> Arc<Catalog> {
        let manifest: Manifest = toml::from_str(MANIFEST).unwrap();
        Arc::new(Catalog::from_manifest(manifest).unwrap())
    }

    fn scope(name: &str) -> ScopeName {
        ScopeName::new(name).unwrap()
    }

    #[test]
    fn test_filters_exports_and_drops_empty_parts() {
        let catalog = catalog();
        let scoped = ScopedCatalog::new(Arc::clone(&catalog), scope("foo"));

        let contracts: Vec<&str> = scoped.exports().map(|(_, e)| e.contract.as_str()).collect();
        assert_eq!(contracts, vec!["Service"]);
        assert_eq!(scoped.parts().len(), 1);
        assert_eq!(catalog.parts().len(), 2);
    }

    #[test]
    fn test_explain_reports_deciding_group() {
        let catalog = catalog();
        let scoped = ScopedCatalog::new(Arc::clone(&catalog), scope("foo"));
        let (hidden, _) = catalog.exports_for("Hidden").next().unwrap();
        let resolution = scoped.explain(hidden);
        assert_eq!(resolution.group, Some(RuleGroup::Member));
        assert!(!resolution.is_included());
        assert!(!scoped.contains(hidden));
    }

    #[test]
    fn test_cache_reuses_live_catalogs() {
        let catalog = catalog();
        let first = catalog.scoped(&scope("foo"));
        let second = catalog.scoped(&scope("foo"));
        assert!(Arc::ptr_eq(&first, &second));

        let other = catalog.scoped(&scope("bar"));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(other.export_count(), 0);
    }

    #[test]
    fn test_cache_shares_one_catalog_across_threads() {
        let catalog = catalog();
        let foo = scope("foo");
        let barrier = std::sync::Barrier::new(16);

        let views: Vec<Arc<ScopedCatalog>> = std::thread::scope(|s| {
            let (catalog, foo, barrier) = (&catalog, &foo, &barrier);
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    s.spawn(move || {
                        barrier.wait();
                        catalog.scoped(foo)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(views.iter().all(|view| Arc::ptr_eq(view, &views[0])));
        assert_eq!(views[0].export_count(), 1);
        assert_eq!(catalog_cache_len(&catalog), 1);
    }

    #[test]
    fn test_cache_evicts_dropped_catalogs() {
        let catalog = catalog();
        let first = catalog.scoped(&scope("foo"));
        drop(first);
        let _bar = catalog.scoped(&scope("bar"));
        assert_eq!(catalog_cache_len(&catalog), 1);
    }

    fn catalog_cache_len(catalog: &Catalog) -> usize {
        catalog.scoped_cache().len()
    }
}
