//! What `pipecheck version` prints.
//!
//! The crate version always appears. `build.rs` stamps the target triple and,
//! when git, date and rustc were available at build time, the short commit,
//! a UTC build timestamp and the compiler version. Missing values are left
//! out of the output rather than printed as placeholders.

use std::fmt;

/// Provenance of the running binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReport {
    pub version: &'static str,
    pub target: &'static str,
    pub commit: Option<&'static str>,
    pub built_at: Option<&'static str>,
    pub rustc: Option<&'static str>,
}

impl VersionReport {
    /// Values baked in at compile time
    pub fn current() -> Self {
        VersionReport {
            version: env!("CARGO_PKG_VERSION"),
            target: env!("PIPECHECK_TARGET"),
            commit: option_env!("PIPECHECK_GIT_HASH"),
            built_at: option_env!("PIPECHECK_BUILD_DATE"),
            rustc: option_env!("PIPECHECK_RUSTC_VERSION"),
        }
    }

    /// Labelled lines after the headline, in print order
    fn details(&self) -> Vec<(&'static str, &'static str)> {
        [
            ("Commit", self.commit),
            ("Built", self.built_at),
            ("Target", Some(self.target)),
            ("Rustc", self.rustc),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| (label, v)))
        .collect()
    }
}

impl fmt::Display for VersionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pipecheck {}", self.version)?;
        for (label, value) in self.details() {
            write!(f, "\n{}: {}", label, value)?;
        }
        Ok(())
    }
}
