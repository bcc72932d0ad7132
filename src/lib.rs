//! # Partscope - Scoped views over component catalogs
//!
//! Partscope decides which exports of a component catalog are visible inside
//! a named container scope.
//!
//! Partscope provides:
//! - Validated scope declarations at member, type, namespace and assembly level
//! - A tri-state, group-precedence scope resolver
//! - An explicit catalog model loaded from TOML/JSON manifests
//! - Cached scoped catalogs and child containers with parent fallback

pub mod scope;
pub mod catalog;
pub mod container;
pub mod output;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use scope::{Decision, ScopeDeclaration, NamespaceDeclaration, ScopeName, ScopeResolver, Candidate};
pub use catalog::{Catalog, ScopedCatalog};
pub use container::{Container, ExportRef};

use std::fmt;

/// Result type alias for Partscope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Partscope operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid manifest:\n{0}")]
    Manifest(Problems),

    #[error("No export for contract '{contract}' in {container}")]
    ExportNotFound { contract: String, container: String },

    #[error("Contract '{contract}' has {count} exports in {container}, expected one")]
    AmbiguousExport {
        contract: String,
        container: String,
        count: usize,
    },

    #[error("Errors resolving components:\n{0}")]
    Composition(Problems),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Every independent failure of one operation, reported together.
#[derive(Debug, Default)]
pub struct Problems(Vec<String>);

impl Problems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, problem: impl Into<String>) {
        self.0.push(problem.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for Problems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, problem) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {}", problem)?;
        }
        Ok(())
    }
}
