//! Security checks (SEC-001 through SEC-003).
//!
//! Runs the static-analysis and dependency-vulnerability scanners and checks
//! Dockerfiles for a non-root user and a health check.
//!
//! # Scan policy
//!
//! A scanner that cannot be evaluated (missing binary, tool error exit,
//! unparsable output) fails the check under [`ScanPolicy::Strict`] and is
//! skipped under [`ScanPolicy::Lenient`]. Neither policy lets such a scanner
//! pass.

use super::conformance::{check_artifact_rules, Requirement};
use super::CheckContext;
use crate::platform::process::CommandRunner;
use crate::{CheckFailure, Verdict};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// How scanner tool errors are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanPolicy {
    /// Tool errors fail the check
    #[default]
    Strict,
    /// Tool errors skip the check
    Lenient,
}

/// What the scanner's exit status means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitContract {
    /// Exit 0 carries findings; any other exit is a tool error
    FindingsOnSuccess,
    /// Exit 0 means clean; a non-zero exit carries findings
    FindingsOnFailure,
}

/// Which findings block the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeverityPredicate {
    /// Severity equals this string exactly
    Equals(String),
    /// Lowercased severity contains this lowercase fragment
    ContainsIgnoreCase(String),
}

impl SeverityPredicate {
    pub fn matches(&self, severity: &str) -> bool {
        match self {
            SeverityPredicate::Equals(expected) => severity == expected,
            SeverityPredicate::ContainsIgnoreCase(fragment) => {
                severity.to_lowercase().contains(&fragment.to_lowercase())
            }
        }
    }
}

impl fmt::Display for SeverityPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeverityPredicate::Equals(s) => write!(f, "severity {}", s),
            SeverityPredicate::ContainsIgnoreCase(s) => write!(f, "severity ~{}", s),
        }
    }
}

/// An external scanner and how to read its JSON report
#[derive(Debug, Clone, PartialEq)]
pub struct Scanner {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    /// Relative to the project root
    pub working_dir: PathBuf,
    pub exit_contract: ExitContract,
    /// JSON pointers tried in order for the findings array ("" = document root)
    pub findings_pointers: Vec<String>,
    pub id_pointer: String,
    pub severity_pointer: String,
    pub predicate: SeverityPredicate,
    /// Only findings with a non-empty identifier count
    pub require_id: bool,
}

impl Scanner {
    /// Static analysis with the security-audit ruleset
    pub fn semgrep() -> Self {
        Scanner {
            name: "semgrep".to_string(),
            program: "semgrep".to_string(),
            args: vec![
                "--config=p/security-audit".to_string(),
                "--json".to_string(),
                "--quiet".to_string(),
                ".".to_string(),
            ],
            working_dir: PathBuf::from("."),
            exit_contract: ExitContract::FindingsOnSuccess,
            findings_pointers: vec!["/results".to_string()],
            id_pointer: "/check_id".to_string(),
            severity_pointer: "/extra/severity".to_string(),
            predicate: SeverityPredicate::Equals("ERROR".to_string()),
            require_id: false,
        }
    }

    /// Python dependency vulnerabilities, run inside backend/
    pub fn safety() -> Self {
        Scanner {
            name: "safety".to_string(),
            program: "safety".to_string(),
            args: vec!["check".to_string(), "--json".to_string()],
            working_dir: PathBuf::from("backend"),
            exit_contract: ExitContract::FindingsOnFailure,
            findings_pointers: vec![String::new(), "/vulnerabilities".to_string()],
            id_pointer: "/vulnerability_id".to_string(),
            severity_pointer: "/severity".to_string(),
            predicate: SeverityPredicate::ContainsIgnoreCase("critical".to_string()),
            require_id: true,
        }
    }

    /// The first configured pointer that resolves to an array
    fn findings<'a>(&self, report: &'a Value) -> Option<&'a Vec<Value>> {
        self.findings_pointers
            .iter()
            .find_map(|pointer| report.pointer(pointer).and_then(Value::as_array))
    }

    /// Split a parsed report into (total findings, blocking finding ids).
    ///
    /// Returns `None` when no findings array is present.
    pub fn classify(&self, report: &Value) -> Option<(usize, Vec<String>)> {
        let findings = self.findings(report)?;

        let mut blocking = Vec::new();
        for finding in findings {
            let id = finding
                .pointer(&self.id_pointer)
                .map(value_label)
                .unwrap_or_default();
            if self.require_id && id.is_empty() {
                continue;
            }
            let severity = finding
                .pointer(&self.severity_pointer)
                .and_then(Value::as_str)
                .unwrap_or("");
            if self.predicate.matches(severity) {
                blocking.push(if id.is_empty() { "<unnamed>".to_string() } else { id });
            }
        }

        Some((findings.len(), blocking))
    }
}

/// The two scanners the security checks run
#[derive(Debug, Clone, PartialEq)]
pub struct ScannerSet {
    pub static_analysis: Scanner,
    pub dependencies: Scanner,
}

impl Default for ScannerSet {
    fn default() -> Self {
        ScannerSet {
            static_analysis: Scanner::semgrep(),
            dependencies: Scanner::safety(),
        }
    }
}

fn value_label(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Run a scanner and fail if any finding meets its severity predicate
pub fn external_scan(
    scanner: &Scanner,
    root: &Path,
    policy: ScanPolicy,
    runner: &dyn CommandRunner,
) -> Verdict {
    let cwd = root.join(&scanner.working_dir);
    info!(scanner = %scanner.name, cwd = %cwd.display(), "running scanner");

    let output = match runner.run(&scanner.program, &scanner.args, &cwd) {
        Ok(output) => output,
        Err(e) => {
            let reason = format!("failed to run {}: {}", scanner.program, e);
            return tool_error(scanner, policy, reason);
        }
    };

    match scanner.exit_contract {
        ExitContract::FindingsOnSuccess if !output.success => {
            let stderr = output.stderr.lines().next().unwrap_or("").trim();
            let mut reason = format!("{} exited with {}", scanner.program, output.describe_exit());
            if !stderr.is_empty() {
                reason.push_str(&format!(": {}", stderr));
            }
            return tool_error(scanner, policy, reason);
        }
        ExitContract::FindingsOnFailure if output.success => {
            return Verdict::Pass(format!("{}: no vulnerabilities reported", scanner.name));
        }
        _ => {}
    }

    let report: Value = match serde_json::from_str(&output.stdout) {
        Ok(report) => report,
        Err(e) => {
            let reason = format!("unparsable {} output: {}", scanner.name, e);
            return tool_error(scanner, policy, reason);
        }
    };

    // A non-zero exit already announced findings, so an unrecognised report
    // cannot be read as clean.
    let (total, blocking) = match (scanner.classify(&report), scanner.exit_contract) {
        (Some(classified), _) => classified,
        (None, ExitContract::FindingsOnSuccess) => (0, Vec::new()),
        (None, ExitContract::FindingsOnFailure) => {
            let reason = format!(
                "{} exited with {} but its output has no findings list",
                scanner.program,
                output.describe_exit()
            );
            return tool_error(scanner, policy, reason);
        }
    };
    if blocking.is_empty() {
        Verdict::Pass(format!(
            "{}: {} finding(s), none at {}",
            scanner.name, total, scanner.predicate
        ))
    } else {
        warn!(scanner = %scanner.name, count = blocking.len(), "blocking findings");
        Verdict::Fail(CheckFailure::FindingsAboveThreshold {
            scanner: scanner.name.clone(),
            threshold: scanner.predicate.to_string(),
            findings: blocking,
        })
    }
}

fn tool_error(scanner: &Scanner, policy: ScanPolicy, reason: String) -> Verdict {
    match policy {
        ScanPolicy::Strict => Verdict::Fail(CheckFailure::ScannerFailed {
            scanner: scanner.name.clone(),
            reason,
        }),
        ScanPolicy::Lenient => {
            warn!(scanner = %scanner.name, %reason, "scanner not evaluated, lenient policy");
            Verdict::Skip(format!("{} not evaluated: {}", scanner.name, reason))
        }
    }
}

pub const BACKEND_DOCKERFILE: &str = "Dockerfile.backend";
pub const FRONTEND_DOCKERFILE: &str = "Dockerfile.frontend";

/// Requirements for the backend image
pub fn backend_dockerfile_rules() -> Vec<Requirement> {
    vec![
        Requirement::any_of(vec![
            Requirement::contains("USER app"),
            Requirement::contains("USER nginx"),
        ]),
        Requirement::contains("HEALTHCHECK"),
    ]
}

/// Requirements for the frontend image
pub fn frontend_dockerfile_rules() -> Vec<Requirement> {
    Requirement::all_literal(&["USER", "HEALTHCHECK"])
}

/// Execute SEC-001: Static Analysis Scan
pub fn run_sec001(ctx: &CheckContext) -> Verdict {
    external_scan(
        &ctx.scanners.static_analysis,
        &ctx.targets.root,
        ctx.scan_policy,
        ctx.runner.as_ref(),
    )
}

/// Execute SEC-002: Dependency Vulnerability Scan
pub fn run_sec002(ctx: &CheckContext) -> Verdict {
    external_scan(
        &ctx.scanners.dependencies,
        &ctx.targets.root,
        ctx.scan_policy,
        ctx.runner.as_ref(),
    )
}

/// Execute SEC-003: Dockerfile Best Practices
pub fn run_sec003(ctx: &CheckContext) -> Verdict {
    let backend = backend_dockerfile_rules();
    let frontend = frontend_dockerfile_rules();
    let rules: [(&str, &[Requirement]); 2] = [
        (BACKEND_DOCKERFILE, backend.as_slice()),
        (FRONTEND_DOCKERFILE, frontend.as_slice()),
    ];

    check_artifact_rules(&ctx.targets.root, &rules)
        .map(|_| "Dockerfiles run as non-root and declare health checks".to_string())
        .into()
}
