//! pipecheck library
//!
//! Validation runner for the artifacts that surround a deployment pipeline:
//! - Integration checks against a running backend/frontend pair (HTTP health, API contract, CORS)
//! - Security checks (static-analysis and dependency scanners, Dockerfile hygiene)
//! - Kubernetes, ArgoCD and Jenkins definition conformance
//!
//! # Example
//!
//! ```no_run
//! use pipecheck::checks::CheckContext;
//! use pipecheck::config::{Settings, TargetOverrides};
//! use pipecheck::{run_checks, PipecheckConfig};
//!
//! let settings = Settings::resolve(&TargetOverrides::default(), None);
//! let context = CheckContext::new(settings);
//! let report = run_checks(&PipecheckConfig::default(), &context);
//! println!("Checks passed: {}", report.summary().passed);
//! ```

pub mod checks;
pub mod cli;
pub mod config;
pub mod engine;
pub mod platform;
pub mod version;

use checks::CheckContext;
use cli::args::Args;
use engine::orchestrator::{create_all_checks, CheckOrchestrator, OrchestratorConfig};
use engine::result::ValidationReport;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// Re-exports for public API
pub use engine::orchestrator::CheckOrchestrator as Orchestrator;
pub use engine::result::{ResultSummary, ValidationReport as Report};

/// Outcome of a single executed check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckResult {
    /// Check passed successfully
    Pass { message: String, duration_ms: u64 },
    /// Check failed
    Fail {
        message: String,
        details: String,
        duration_ms: u64,
    },
    /// Check was not evaluated
    Skip { reason: String },
}

impl CheckResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, CheckResult::Fail { .. })
    }

    pub fn duration_ms(&self) -> u64 {
        match self {
            CheckResult::Pass { duration_ms, .. } | CheckResult::Fail { duration_ms, .. } => {
                *duration_ms
            }
            CheckResult::Skip { .. } => 0,
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckResult::Pass { message, .. } => write!(f, "PASS: {}", message),
            CheckResult::Fail {
                message, details, ..
            } => {
                write!(f, "FAIL: {} ({})", message, details)
            }
            CheckResult::Skip { reason } => write!(f, "SKIP: {}", reason),
        }
    }
}

/// What a check function decides, before the orchestrator attaches timing.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Pass(String),
    Fail(CheckFailure),
    Skip(String),
}

impl Verdict {
    /// Attach the measured duration and produce the reported result
    pub fn into_result(self, duration_ms: u64) -> CheckResult {
        match self {
            Verdict::Pass(message) => CheckResult::Pass {
                message,
                duration_ms,
            },
            Verdict::Fail(failure) => CheckResult::Fail {
                message: failure.to_string(),
                details: failure.details(),
                duration_ms,
            },
            Verdict::Skip(reason) => CheckResult::Skip { reason },
        }
    }
}

impl From<Result<String, CheckFailure>> for Verdict {
    fn from(outcome: Result<String, CheckFailure>) -> Self {
        match outcome {
            Ok(message) => Verdict::Pass(message),
            Err(failure) => Verdict::Fail(failure),
        }
    }
}

/// Check category for grouping related checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckCategory {
    /// Live backend/frontend HTTP checks
    Integration,
    /// Scanner findings and Dockerfile hygiene
    Security,
    /// Kubernetes manifests under k8s/base
    Kubernetes,
    /// ArgoCD applications and projects
    ArgoCd,
    /// Jenkins pipeline definition
    Jenkins,
}

impl CheckCategory {
    /// All categories in execution and report order
    pub const ALL: [CheckCategory; 5] = [
        CheckCategory::Integration,
        CheckCategory::Security,
        CheckCategory::Kubernetes,
        CheckCategory::ArgoCd,
        CheckCategory::Jenkins,
    ];

    /// Lowercase identifier used for JUnit suites and serialization
    pub fn slug(&self) -> &'static str {
        match self {
            CheckCategory::Integration => "integration",
            CheckCategory::Security => "security",
            CheckCategory::Kubernetes => "kubernetes",
            CheckCategory::ArgoCd => "argocd",
            CheckCategory::Jenkins => "jenkins",
        }
    }
}

impl fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckCategory::Integration => write!(f, "Integration"),
            CheckCategory::Security => write!(f, "Security"),
            CheckCategory::Kubernetes => write!(f, "Kubernetes"),
            CheckCategory::ArgoCd => write!(f, "ArgoCD"),
            CheckCategory::Jenkins => write!(f, "Jenkins"),
        }
    }
}

/// A validation check with its result.
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    /// Unique identifier (e.g., "K8S-002")
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Check category
    pub category: CheckCategory,
    /// Description of what this check validates
    pub description: String,
    /// Result of the check (None if not yet executed)
    pub result: Option<CheckResult>,
}

/// Why a single check failed.
///
/// The `Display` text is the one-line result message; [`CheckFailure::details`]
/// carries the literal unmet condition(s).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckFailure {
    #[error("service at {url} is unreachable")]
    UnreachableService { url: String, reason: String },

    #[error("unexpected response shape from {url}")]
    UnexpectedResponseShape { url: String, detail: String },

    #[error("contract violation on {method} {url}")]
    ContractViolation {
        method: String,
        url: String,
        detail: String,
    },

    #[error("content type mismatch at {url}")]
    ContentTypeMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("CORS preflight to {url} was rejected")]
    CorsMisconfigured { url: String, detail: String },

    #[error("{} required field(s) missing", missing.len())]
    MissingRequiredField { missing: Vec<MissingField> },

    #[error("cannot read {path}")]
    ArtifactUnreadable { path: String, reason: String },

    #[error("{scanner} reported {} finding(s) at or above {threshold}", findings.len())]
    FindingsAboveThreshold {
        scanner: String,
        threshold: String,
        findings: Vec<String>,
    },

    #[error("{scanner} could not be evaluated")]
    ScannerFailed { scanner: String, reason: String },
}

impl CheckFailure {
    /// The literal condition that was not met
    pub fn details(&self) -> String {
        match self {
            CheckFailure::UnreachableService { reason, .. } => reason.clone(),
            CheckFailure::UnexpectedResponseShape { detail, .. }
            | CheckFailure::ContractViolation { detail, .. }
            | CheckFailure::CorsMisconfigured { detail, .. } => detail.clone(),
            CheckFailure::ContentTypeMismatch {
                expected, actual, ..
            } => format!("expected content-type containing '{}', got '{}'", expected, actual),
            CheckFailure::MissingRequiredField { missing } => missing
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join("; "),
            CheckFailure::ArtifactUnreadable { reason, .. } => reason.clone(),
            CheckFailure::FindingsAboveThreshold { findings, .. } => findings.join(", "),
            CheckFailure::ScannerFailed { reason, .. } => reason.clone(),
        }
    }
}

/// One requirement that a text artifact did not satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingField {
    pub path: String,
    pub requirement: String,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: missing {}", self.path, self.requirement)
    }
}

/// Errors that stop pipecheck outside of individual checks.
#[derive(Debug, Error)]
pub enum PipecheckError {
    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("output format '{0}' is not available in this build")]
    FormatUnavailable(String),

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Which checks to run and how.
#[derive(Debug, Clone, Default)]
pub struct PipecheckConfig {
    /// Categories to run (None = all)
    pub categories: Option<Vec<CheckCategory>>,
    /// Specific checks to skip (by ID)
    pub skip_checks: Vec<String>,
    /// Specific checks to run (by ID)
    pub only_checks: Vec<String>,
    /// Stop on first failure
    pub fail_fast: bool,
}

impl PipecheckConfig {
    /// Create configuration from command line arguments
    pub fn from_args(args: &Args) -> Self {
        PipecheckConfig {
            categories: args.categories(),
            skip_checks: args.skip.clone(),
            only_checks: args.only.clone(),
            fail_fast: args.fail_fast,
        }
    }

    /// Whether a check with this id and category is selected
    pub fn selects(&self, id: &str, category: CheckCategory) -> bool {
        if let Some(ref categories) = self.categories {
            if !categories.is_empty() && !categories.contains(&category) {
                return false;
            }
        }
        if !self.only_checks.is_empty() && !self.only_checks.iter().any(|o| o == id) {
            return false;
        }
        !self.skip_checks.iter().any(|s| s == id)
    }
}

/// Run validation checks.
///
/// Executes every registered check that `config` selects, sequentially and in
/// declaration order, against the targets and seams held by `context`.
pub fn run_checks(config: &PipecheckConfig, context: &CheckContext) -> ValidationReport {
    let mut orchestrator = CheckOrchestrator::new(OrchestratorConfig {
        fail_fast: config.fail_fast,
    });
    orchestrator.register_checks(create_all_checks());
    orchestrator.run_filtered(config, context)
}
