//! Dotted namespaces and segment-wise prefix matching.

use crate::{Error, Result};
use std::fmt;

/// A parsed, non-empty dotted namespace such as `App.Core.Services`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    segments: Vec<String>,
}

impl Namespace {
    pub fn parse(namespace: &str) -> Result<Self> {
        if namespace.is_empty() {
            return Err(Error::InvalidArgument("namespace must not be empty".to_string()));
        }

        let segments: Vec<String> = namespace.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(Error::InvalidArgument(format!(
                "namespace '{}' contains an empty segment",
                namespace
            )));
        }

        Ok(Self { segments })
    }

    /// Number of segments
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Whether `candidate` equals this namespace or is nested beneath it.
    ///
    /// `A.B` contains `A.B` and `A.B.C`, but not `A.Bx` or `A`.
    pub fn contains(&self, candidate: &str) -> bool {
        let mut candidate_segments = candidate.split('.');
        self.segments
            .iter()
            .all(|declared| candidate_segments.next() == Some(declared.as_str()))
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns(s: &str) -> Namespace {
        Namespace::parse(s).unwrap()
    }

    #[test]
    fn test_exact_and_descendant_match() {
        assert!(ns("A.B").contains("A.B"));
        assert!(ns("A.B").contains("A.B.C"));
        assert!(ns("A").contains("A.B.C"));
    }

    #[test]
    fn test_segment_prefix_is_not_a_match() {
        assert!(!ns("A.B").contains("A.Bx"));
        assert!(!ns("Foo.Bar").contains("Foo.Barn"));
    }

    #[test]
    fn test_shorter_candidate_does_not_match() {
        assert!(!ns("A.B.C").contains("A.B"));
        assert!(!ns("A.B").contains(""));
    }

    #[test]
    fn test_ordinal_comparison() {
        assert!(!ns("App.Core").contains("app.core"));
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert!(Namespace::parse("").is_err());
        assert!(Namespace::parse("A..B").is_err());
        assert!(Namespace::parse(".A").is_err());
        assert_eq!(ns("A.B.C").depth(), 3);
        assert_eq!(ns("A.B.C").to_string(), "A.B.C");
    }
}
