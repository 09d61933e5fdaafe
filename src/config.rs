//! Target and scanner configuration.
//!
//! Values resolve in order: command line, environment (`BACKEND_URL`,
//! `FRONTEND_URL`, via clap), TOML config file, built-in defaults.
//!
//! ```toml
//! [targets]
//! backend_url = "http://localhost:8001"
//! frontend_url = "http://localhost:3000"
//! root = "."
//!
//! [scanners]
//! policy = "strict"
//!
//! [scanners.dependencies]
//! program = "safety"
//! args = ["check", "--json"]
//! working_dir = "backend"
//! ```

use crate::checks::security::{ScanPolicy, Scanner, ScannerSet};
use crate::platform::http::join_url;
use crate::PipecheckError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8001";
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

/// Where the checks point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targets {
    pub backend_url: String,
    pub frontend_url: String,
    /// Directory containing Dockerfiles, k8s/, argocd/ and Jenkinsfile
    pub root: PathBuf,
}

impl Targets {
    pub fn backend(&self, path: &str) -> String {
        join_url(&self.backend_url, path)
    }

    pub fn frontend(&self, path: &str) -> String {
        join_url(&self.frontend_url, path)
    }
}

impl Default for Targets {
    fn default() -> Self {
        Targets {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            root: PathBuf::from("."),
        }
    }
}

/// Config file contents
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub targets: TargetsSection,
    pub scanners: ScannersSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetsSection {
    pub backend_url: Option<String>,
    pub frontend_url: Option<String>,
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScannersSection {
    pub policy: Option<ScanPolicy>,
    pub static_analysis: Option<ScannerOverride>,
    pub dependencies: Option<ScannerOverride>,
}

/// Replaces how a scanner is invoked; report parsing stays fixed
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScannerOverride {
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
    pub working_dir: Option<PathBuf>,
}

impl ScannerOverride {
    fn apply(&self, scanner: &mut Scanner) {
        if let Some(ref program) = self.program {
            scanner.program = program.clone();
        }
        if let Some(ref args) = self.args {
            scanner.args = args.clone();
        }
        if let Some(ref dir) = self.working_dir {
            scanner.working_dir = dir.clone();
        }
    }
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, PipecheckError> {
        let content = fs::read_to_string(path).map_err(|source| PipecheckError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| PipecheckError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct TargetOverrides {
    pub backend_url: Option<String>,
    pub frontend_url: Option<String>,
    pub root: Option<PathBuf>,
    pub lenient_scans: bool,
}

/// Fully resolved settings for a run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub targets: Targets,
    pub scanners: ScannerSet,
    pub scan_policy: ScanPolicy,
}

impl Settings {
    pub fn resolve(overrides: &TargetOverrides, file: Option<FileConfig>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Targets::default();

        let targets = Targets {
            backend_url: overrides
                .backend_url
                .clone()
                .or(file.targets.backend_url)
                .unwrap_or(defaults.backend_url),
            frontend_url: overrides
                .frontend_url
                .clone()
                .or(file.targets.frontend_url)
                .unwrap_or(defaults.frontend_url),
            root: overrides
                .root
                .clone()
                .or(file.targets.root)
                .unwrap_or(defaults.root),
        };

        let mut scanners = ScannerSet::default();
        if let Some(ref o) = file.scanners.static_analysis {
            o.apply(&mut scanners.static_analysis);
        }
        if let Some(ref o) = file.scanners.dependencies {
            o.apply(&mut scanners.dependencies);
        }

        let scan_policy = if overrides.lenient_scans {
            ScanPolicy::Lenient
        } else {
            file.scanners.policy.unwrap_or_default()
        };

        tracing::debug!(
            backend = %targets.backend_url,
            frontend = %targets.frontend_url,
            root = %targets.root.display(),
            ?scan_policy,
            "resolved settings"
        );

        Settings {
            targets,
            scanners,
            scan_policy,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(&TargetOverrides::default(), None)
    }
}
