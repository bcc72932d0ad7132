//! Scope declarations - Immutable inclusion/exclusion rules
//!
//! A declaration names a scope and says whether the thing it is attached to
//! (member, type or assembly) belongs in that scope. Namespace declarations
//! live on assemblies and only apply to types under a given namespace.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::decision::Decision;
use super::namespace::Namespace;

/// Name of a container scope. Never empty, compared ordinally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScopeName(String);

impl ScopeName {
    /// Create a scope name, rejecting empty input
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidArgument("scope name must not be empty".to_string()));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ScopeName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ScopeName> for String {
    fn from(value: ScopeName) -> Self {
        value.0
    }
}

impl fmt::Display for ScopeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A scope rule attached to a member, a type, or a whole assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeDeclaration {
    /// The targeted scope
    pub scope: ScopeName,
    /// Whether the target is excluded from the scope
    #[serde(default)]
    pub excluded: bool,
}

impl ScopeDeclaration {
    /// Declare the target as part of `scope`
    pub fn include(scope: impl Into<String>) -> Result<Self> {
        Ok(Self {
            scope: ScopeName::new(scope)?,
            excluded: false,
        })
    }

    /// Declare the target as removed from `scope`
    pub fn exclude(scope: impl Into<String>) -> Result<Self> {
        Ok(Self {
            scope: ScopeName::new(scope)?,
            excluded: true,
        })
    }

    /// Whether this declaration targets the given scope
    pub fn targets(&self, scope: &ScopeName) -> bool {
        self.scope == *scope
    }

    /// The verdict of this declaration, ignoring scope matching
    pub fn decision(&self) -> Decision {
        Decision::from_excluded(self.excluded)
    }
}

/// A scope rule on an assembly restricted to one namespace and its descendants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNamespaceDeclaration", into = "RawNamespaceDeclaration")]
pub struct NamespaceDeclaration {
    scope: ScopeName,
    namespace: Namespace,
    excluded: bool,
}

impl NamespaceDeclaration {
    /// Create a namespace declaration. Both the scope and the namespace must be non-empty.
    pub fn new(scope: impl Into<String>, namespace: &str, excluded: bool) -> Result<Self> {
        let scope = ScopeName::new(scope)?;
        let namespace = Namespace::parse(namespace)?;
        Ok(Self {
            scope,
            namespace,
            excluded,
        })
    }

    pub fn scope(&self) -> &ScopeName {
        &self.scope
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn is_excluded(&self) -> bool {
        self.excluded
    }

    /// Depth of the declared namespace. Deeper rules win over shallower ones.
    pub fn priority(&self) -> usize {
        self.namespace.depth()
    }

    pub fn targets(&self, scope: &ScopeName) -> bool {
        self.scope == *scope
    }

    /// Verdict for a type living in `candidate_namespace`.
    ///
    /// Returns `NotApplicable` when the namespace is outside this rule.
    pub fn decide(&self, candidate_namespace: &str) -> Decision {
        if self.namespace.contains(candidate_namespace) {
            Decision::from_excluded(self.excluded)
        } else {
            Decision::NotApplicable
        }
    }
}

/// Wire form of a namespace declaration, validated on conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawNamespaceDeclaration {
    scope: String,
    namespace: String,
    #[serde(default)]
    excluded: bool,
}

impl TryFrom<RawNamespaceDeclaration> for NamespaceDeclaration {
    type Error = Error;

    fn try_from(raw: RawNamespaceDeclaration) -> Result<Self> {
        Self::new(raw.scope, &raw.namespace, raw.excluded)
    }
}

impl From<NamespaceDeclaration> for RawNamespaceDeclaration {
    fn from(decl: NamespaceDeclaration) -> Self {
        Self {
            scope: decl.scope.into(),
            namespace: decl.namespace.to_string(),
            excluded: decl.excluded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scope_name_rejected() {
        assert!(matches!(ScopeName::new(""), Err(Error::InvalidArgument(_))));
        assert!(ScopeDeclaration::include("").is_err());
        assert!(ScopeDeclaration::exclude("").is_err());
    }

    #[test]
    fn test_empty_namespace_rejected() {
        assert!(matches!(
            NamespaceDeclaration::new("foo", "", false),
            Err(Error::InvalidArgument(_))
        ));
        assert!(NamespaceDeclaration::new("", "App", false).is_err());
    }

    #[test]
    fn test_priority_is_namespace_depth() {
        let shallow = NamespaceDeclaration::new("quoi", "A", false).unwrap();
        let deep = NamespaceDeclaration::new("quoi", "A.B.C", false).unwrap();
        assert_eq!(shallow.priority(), 1);
        assert_eq!(deep.priority(), 3);
    }

    #[test]
    fn test_scope_names_are_case_sensitive() {
        let decl = ScopeDeclaration::include("Foo").unwrap();
        assert!(decl.targets(&ScopeName::new("Foo").unwrap()));
        assert!(!decl.targets(&ScopeName::new("foo").unwrap()));
    }

    #[test]
    fn test_namespace_decision() {
        let decl = NamespaceDeclaration::new("quoi", "A.B", true).unwrap();
        assert_eq!(decl.decide("A.B.C"), Decision::Exclude);
        assert_eq!(decl.decide("A.Bx"), Decision::NotApplicable);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: ScopeDeclaration = toml::from_str(r#"scope = "foo""#).unwrap();
        assert!(!ok.excluded);

        let bad: std::result::Result<ScopeDeclaration, _> = toml::from_str(r#"scope = """#);
        assert!(bad.is_err());

        let bad_ns: std::result::Result<NamespaceDeclaration, _> =
            toml::from_str("scope = \"foo\"\nnamespace = \"\"");
        assert!(bad_ns.is_err());
    }
}
