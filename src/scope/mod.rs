//! Container scopes - Named views over a component catalog
//!
//! Declarations attached to members, types and assemblies say which
//! scopes a part belongs to; the resolver turns them into a single verdict.

pub mod declaration;
pub mod decision;
pub mod namespace;
pub mod resolver;

pub use declaration::{NamespaceDeclaration, ScopeDeclaration, ScopeName};
pub use decision::Decision;
pub use namespace::Namespace;
pub use resolver::{AssemblyScopes, Candidate, Resolution, RuleGroup, ScopeResolver};
