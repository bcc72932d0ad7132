//! Tri-state scope verdicts
//!
//! Every declaration votes `Include`, `Exclude`, or has no opinion
//! (`NotApplicable`). Votes within a rule group are combined with
//! [`Decision::conjoin`]: no opinion is the identity, and exclusion wins.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict of one declaration or one rule group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Include,
    Exclude,
    #[default]
    NotApplicable,
}

impl Decision {
    pub fn from_excluded(excluded: bool) -> Self {
        if excluded {
            Decision::Exclude
        } else {
            Decision::Include
        }
    }

    /// Three-valued AND over "should include".
    pub fn conjoin(self, other: Decision) -> Decision {
        match (self, other) {
            (Decision::NotApplicable, other) => other,
            (this, Decision::NotApplicable) => this,
            (Decision::Include, Decision::Include) => Decision::Include,
            _ => Decision::Exclude,
        }
    }

    /// Conjoin every verdict, starting from `NotApplicable`.
    pub fn all<I>(decisions: I) -> Decision
    where
        I: IntoIterator<Item = Decision>,
    {
        decisions
            .into_iter()
            .fold(Decision::NotApplicable, Decision::conjoin)
    }

    pub fn is_applicable(&self) -> bool {
        !matches!(self, Decision::NotApplicable)
    }

    /// Collapse to a boolean, with the default-exclude policy.
    pub fn is_included(&self) -> bool {
        matches!(self, Decision::Include)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Include => "include",
            Decision::Exclude => "exclude",
            Decision::NotApplicable => "n/a",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Decision; 3] = [Decision::Include, Decision::Exclude, Decision::NotApplicable];

    #[test]
    fn test_not_applicable_is_identity() {
        for d in ALL {
            assert_eq!(Decision::NotApplicable.conjoin(d), d);
            assert_eq!(d.conjoin(Decision::NotApplicable), d);
        }
    }

    #[test]
    fn test_exclude_wins() {
        assert_eq!(Decision::Include.conjoin(Decision::Exclude), Decision::Exclude);
        assert_eq!(Decision::Exclude.conjoin(Decision::Include), Decision::Exclude);
        assert_eq!(Decision::Include.conjoin(Decision::Include), Decision::Include);
    }

    #[test]
    fn test_conjoin_is_commutative() {
        for a in ALL {
            for b in ALL {
                assert_eq!(a.conjoin(b), b.conjoin(a));
            }
        }
    }

    #[test]
    fn test_all_of_empty_is_not_applicable() {
        assert_eq!(Decision::all(std::iter::empty()), Decision::NotApplicable);
        assert_eq!(
            Decision::all([Decision::Include, Decision::NotApplicable, Decision::Exclude]),
            Decision::Exclude
        );
    }

    #[test]
    fn test_not_applicable_is_not_included() {
        assert!(!Decision::NotApplicable.is_included());
        assert!(!Decision::Exclude.is_included());
        assert!(Decision::Include.is_included());
    }
}
