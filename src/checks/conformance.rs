//! Text-artifact conformance.
//!
//! Artifacts are matched by literal substring containment, not parsed. A key
//! such as `runAsNonRoot: true` satisfies its requirement wherever it appears
//! in the file.

use crate::platform::fs;
use crate::{CheckFailure, MissingField};
use std::fmt;
use std::path::Path;

/// A condition a text artifact must satisfy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Case-sensitive literal substring
    Contains(String),
    /// Substring after lowercasing both sides
    ContainsIgnoreCase(String),
    /// At least one alternative holds
    AnyOf(Vec<Requirement>),
    /// If `marker` is present, every requirement in `then` must hold
    When {
        marker: String,
        then: Vec<Requirement>,
    },
}

impl Requirement {
    pub fn contains(needle: impl Into<String>) -> Self {
        Requirement::Contains(needle.into())
    }

    pub fn contains_ignore_case(needle: impl Into<String>) -> Self {
        Requirement::ContainsIgnoreCase(needle.into())
    }

    pub fn any_of(alternatives: Vec<Requirement>) -> Self {
        Requirement::AnyOf(alternatives)
    }

    pub fn when(marker: impl Into<String>, then: Vec<Requirement>) -> Self {
        Requirement::When {
            marker: marker.into(),
            then,
        }
    }

    /// Convenience for a list of literal substrings
    pub fn all_literal(needles: &[&str]) -> Vec<Requirement> {
        needles.iter().map(|n| Requirement::contains(*n)).collect()
    }

    pub fn is_met(&self, content: &str) -> bool {
        self.unmet(content).is_empty()
    }

    /// Descriptions of everything this requirement leaves unsatisfied
    pub fn unmet(&self, content: &str) -> Vec<String> {
        match self {
            Requirement::Contains(needle) => {
                if content.contains(needle.as_str()) {
                    vec![]
                } else {
                    vec![self.to_string()]
                }
            }
            Requirement::ContainsIgnoreCase(needle) => {
                if content.to_lowercase().contains(&needle.to_lowercase()) {
                    vec![]
                } else {
                    vec![self.to_string()]
                }
            }
            Requirement::AnyOf(alternatives) => {
                if alternatives.iter().any(|alt| alt.is_met(content)) {
                    vec![]
                } else {
                    vec![self.to_string()]
                }
            }
            Requirement::When { marker, then } => {
                if !content.contains(marker.as_str()) {
                    return vec![];
                }
                then.iter()
                    .flat_map(|req| req.unmet(content))
                    .map(|missing| format!("{} (required by `{}`)", missing, marker))
                    .collect()
            }
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Contains(needle) => write!(f, "`{}`", needle),
            Requirement::ContainsIgnoreCase(needle) => write!(f, "`{}` (any case)", needle),
            Requirement::AnyOf(alternatives) => {
                let parts: Vec<String> = alternatives.iter().map(|a| a.to_string()).collect();
                write!(f, "{}", parts.join(" or "))
            }
            Requirement::When { marker, then } => {
                let parts: Vec<String> = then.iter().map(|r| r.to_string()).collect();
                write!(f, "{} when `{}`", parts.join(", "), marker)
            }
        }
    }
}

/// Check one artifact against its requirements
pub fn check_text_artifact(
    root: &Path,
    path: &str,
    requirements: &[Requirement],
) -> Result<(), CheckFailure> {
    check_artifact_rules(root, &[(path, requirements)]).map(|_| ())
}

/// Apply the same requirements to every path.
///
/// Returns the number of artifacts inspected.
pub fn check_multi_file(
    root: &Path,
    paths: &[&str],
    requirements: &[Requirement],
) -> Result<usize, CheckFailure> {
    let rules: Vec<(&str, &[Requirement])> = paths.iter().map(|p| (*p, requirements)).collect();
    check_artifact_rules(root, &rules)
}

/// Check each artifact against its own requirement list.
///
/// Unmet requirements across all artifacts are reported together; the first
/// unreadable artifact aborts the check.
pub fn check_artifact_rules(
    root: &Path,
    rules: &[(&str, &[Requirement])],
) -> Result<usize, CheckFailure> {
    let mut missing = Vec::new();

    for (path, requirements) in rules {
        let content = fs::read_artifact(root, path).map_err(|e| CheckFailure::ArtifactUnreadable {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        for requirement in requirements.iter() {
            for unmet in requirement.unmet(&content) {
                missing.push(MissingField {
                    path: path.to_string(),
                    requirement: unmet,
                });
            }
        }
    }

    if missing.is_empty() {
        Ok(rules.len())
    } else {
        tracing::debug!(count = missing.len(), "artifact requirements unmet");
        Err(CheckFailure::MissingRequiredField { missing })
    }
}
