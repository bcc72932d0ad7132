//! Scope Resolver - Decides whether a candidate is visible in a scope
//!
//! Resolution algorithm (first group with an opinion wins, groups never merge):
//! 1. Member declarations (including a sibling accessor's)
//! 2. Declaring type declarations
//! 3. Assembly namespace declarations, highest matching priority only
//! 4. Assembly-wide declarations
//!
//! Within a group, votes are conjoined: any exclusion excludes.
//! If no group has an opinion the candidate is excluded.

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use super::decision::Decision;
use super::declaration::{NamespaceDeclaration, ScopeDeclaration, ScopeName};

/// Scope declarations carried by one assembly.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyScopes<'a> {
    pub name: &'a str,
    /// Assembly-wide declarations, applying to every type
    pub local: &'a [ScopeDeclaration],
    /// Declarations restricted to a namespace
    pub namespaces: &'a [NamespaceDeclaration],
}

/// Plain-data view of a member being tested for inclusion.
///
/// Built once per export from the catalog metadata; the resolver never
/// looks anything up on its own.
#[derive(Debug, Clone, Default)]
pub struct Candidate<'a> {
    member: Vec<&'a ScopeDeclaration>,
    declaring_types: Vec<&'a ScopeDeclaration>,
    namespaces: Vec<&'a str>,
    assemblies: Vec<AssemblyScopes<'a>>,
}

impl<'a> Candidate<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add declarations found on the member itself or its sibling accessor
    pub fn with_member_scopes(mut self, scopes: &'a [ScopeDeclaration]) -> Self {
        self.member.extend(scopes);
        self
    }

    /// Add declarations found on a declaring type
    pub fn with_type_scopes(mut self, scopes: &'a [ScopeDeclaration]) -> Self {
        self.declaring_types.extend(scopes);
        self
    }

    /// Add the namespace of a type the candidate belongs to
    pub fn with_namespace(mut self, namespace: &'a str) -> Self {
        if !self.namespaces.contains(&namespace) {
            self.namespaces.push(namespace);
        }
        self
    }

    /// Add a declaring assembly. Assemblies already present are ignored.
    pub fn with_assembly(mut self, assembly: AssemblyScopes<'a>) -> Self {
        if !self.assemblies.iter().any(|a| a.name == assembly.name) {
            self.assemblies.push(assembly);
        }
        self
    }

    pub fn assembly_count(&self) -> usize {
        self.assemblies.len()
    }
}

/// Rule group that produced a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleGroup {
    Member,
    Type,
    Namespace,
    Assembly,
}

impl RuleGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Type => "type",
            Self::Namespace => "namespace",
            Self::Assembly => "assembly",
        }
    }
}

impl fmt::Display for RuleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving one candidate, with the group that decided it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub decision: Decision,
    /// `None` when no group had an opinion
    pub group: Option<RuleGroup>,
    /// Number of declarations that voted in the deciding group
    pub votes: usize,
}

impl Resolution {
    fn undecided() -> Self {
        Self {
            decision: Decision::NotApplicable,
            group: None,
            votes: 0,
        }
    }

    pub fn is_included(&self) -> bool {
        self.decision.is_included()
    }
}

/// Resolves candidates against one named scope.
#[derive(Debug, Clone)]
pub struct ScopeResolver {
    scope: ScopeName,
}

impl ScopeResolver {
    pub fn new(scope: ScopeName) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> &ScopeName {
        &self.scope
    }

    /// Whether the candidate is visible in this scope
    pub fn resolve(&self, candidate: &Candidate<'_>) -> bool {
        self.explain(candidate).is_included()
    }

    /// Resolve and report which group decided
    pub fn explain(&self, candidate: &Candidate<'_>) -> Resolution {
        let groups = [
            (RuleGroup::Member, self.local_group(&candidate.member)),
            (RuleGroup::Type, self.local_group(&candidate.declaring_types)),
            (RuleGroup::Namespace, self.namespace_group(candidate)),
            (RuleGroup::Assembly, self.assembly_group(candidate)),
        ];

        for (group, (decision, votes)) in groups {
            if decision.is_applicable() {
                debug!(scope = %self.scope, %group, %decision, votes, "scope resolved");
                return Resolution {
                    decision,
                    group: Some(group),
                    votes,
                };
            }
        }

        trace!(scope = %self.scope, "no declarations apply, excluding");
        Resolution::undecided()
    }

    fn local_group(&self, declarations: &[&ScopeDeclaration]) -> (Decision, usize) {
        let matching: Vec<Decision> = declarations
            .iter()
            .filter(|d| d.targets(&self.scope))
            .map(|d| d.decision())
            .collect();
        (Decision::all(matching.iter().copied()), matching.len())
    }

    fn namespace_group(&self, candidate: &Candidate<'_>) -> (Decision, usize) {
        // (priority, verdict) for every declaration that covers a candidate namespace
        let mut applicable: Vec<(usize, Decision)> = Vec::new();
        for assembly in &candidate.assemblies {
            for decl in assembly.namespaces.iter().filter(|d| d.targets(&self.scope)) {
                for namespace in &candidate.namespaces {
                    let decision = decl.decide(namespace);
                    trace!(namespace = %decl.namespace(), candidate = namespace, %decision, "namespace rule");
                    if decision.is_applicable() {
                        applicable.push((decl.priority(), decision));
                    }
                }
            }
        }

        let Some(top) = applicable.iter().map(|(priority, _)| *priority).max() else {
            return (Decision::NotApplicable, 0);
        };

        let winners: Vec<Decision> = applicable
            .into_iter()
            .filter(|(priority, _)| *priority == top)
            .map(|(_, decision)| decision)
            .collect();
        (Decision::all(winners.iter().copied()), winners.len())
    }

    fn assembly_group(&self, candidate: &Candidate<'_>) -> (Decision, usize) {
        let local: Vec<&ScopeDeclaration> = candidate
            .assemblies
            .iter()
            .flat_map(|a| a.local.iter())
            .collect();
        self.local_group(&local)
    }
}
