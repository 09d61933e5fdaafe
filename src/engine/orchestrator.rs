//! Check execution orchestrator.
//!
//! Manages check registration, selection and sequential execution.
//!
//! # Failure Isolation
//!
//! - Check panics: Caught via std::panic::catch_unwind, converted to Fail result
//! - Failed check: Remaining checks still run unless fail_fast
//! - Unknown check ID in a selection: Logged and ignored
//! - Empty selection: Returns empty report (not an error)
//!
//! Checks run one at a time in registration order. No function in this
//! module will panic.

use crate::checks::{argocd, integration, jenkins, kubernetes, security, CheckContext};
use crate::engine::result::{ResultAggregator, ValidationReport};
use crate::{Check, CheckCategory, CheckResult, PipecheckConfig, Verdict};
use std::time::Instant;
use tracing::{debug, warn};

/// Orchestrator configuration
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub fail_fast: bool,
}

/// Signature of a check body
pub type CheckFn = Box<dyn Fn(&CheckContext) -> Verdict + Send + Sync>;

/// A registered check with its execution function
pub struct RegisteredCheck {
    pub id: String,
    pub name: String,
    pub category: CheckCategory,
    pub description: String,
    pub check_fn: CheckFn,
}

impl RegisteredCheck {
    pub fn new(
        id: &str,
        name: &str,
        category: CheckCategory,
        description: &str,
        check_fn: impl Fn(&CheckContext) -> Verdict + Send + Sync + 'static,
    ) -> Self {
        RegisteredCheck {
            id: id.to_string(),
            name: name.to_string(),
            category,
            description: description.to_string(),
            check_fn: Box::new(check_fn),
        }
    }

    /// Report entry without a result
    pub fn describe(&self) -> Check {
        Check {
            id: self.id.clone(),
            name: self.name.clone(),
            category: self.category,
            description: self.description.clone(),
            result: None,
        }
    }
}

/// Check orchestrator
pub struct CheckOrchestrator {
    config: OrchestratorConfig,
    checks: Vec<RegisteredCheck>,
}

impl CheckOrchestrator {
    /// Create a new orchestrator with the given configuration
    pub fn new(config: OrchestratorConfig) -> Self {
        CheckOrchestrator {
            config,
            checks: Vec::new(),
        }
    }

    /// Register checks for execution
    pub fn register_checks(&mut self, checks: Vec<RegisteredCheck>) {
        self.checks.extend(checks);
    }

    /// Register a single check
    pub fn register_check(&mut self, check: RegisteredCheck) {
        self.checks.push(check);
    }

    pub fn checks(&self) -> &[RegisteredCheck] {
        &self.checks
    }

    /// Run all registered checks
    pub fn run_all(&self, ctx: &CheckContext) -> ValidationReport {
        self.run_where(ctx, |_| true)
    }

    /// Run checks in a specific category
    pub fn run_category(&self, category: CheckCategory, ctx: &CheckContext) -> ValidationReport {
        self.run_where(ctx, |c| c.category == category)
    }

    /// Run checks in multiple categories
    pub fn run_categories(
        &self,
        categories: &[CheckCategory],
        ctx: &CheckContext,
    ) -> ValidationReport {
        self.run_where(ctx, |c| categories.contains(&c.category))
    }

    /// Run specific checks by ID, in registration order
    pub fn run_specific(&self, check_ids: &[String], ctx: &CheckContext) -> ValidationReport {
        self.warn_unknown(check_ids);
        self.run_where(ctx, |c| check_ids.contains(&c.id))
    }

    /// Run all checks except specified IDs
    pub fn run_excluding(&self, skip_ids: &[String], ctx: &CheckContext) -> ValidationReport {
        self.warn_unknown(skip_ids);
        self.run_where(ctx, |c| !skip_ids.contains(&c.id))
    }

    /// Run whatever a [`PipecheckConfig`] selects
    pub fn run_filtered(&self, config: &PipecheckConfig, ctx: &CheckContext) -> ValidationReport {
        self.warn_unknown(&config.only_checks);
        self.warn_unknown(&config.skip_checks);
        self.run_where(ctx, |c| config.selects(&c.id, c.category))
    }

    fn warn_unknown(&self, ids: &[String]) {
        for id in ids {
            if !self.checks.iter().any(|c| &c.id == id) {
                warn!(check = %id, "unknown check id ignored");
            }
        }
    }

    /// Execute the selected checks sequentially
    fn run_where(
        &self,
        ctx: &CheckContext,
        selected: impl Fn(&RegisteredCheck) -> bool,
    ) -> ValidationReport {
        let start = Instant::now();
        let mut aggregator = ResultAggregator::new(&ctx.targets);

        for check in &self.checks {
            if !selected(check) {
                continue;
            }

            let result = self.execute_check(check, ctx);
            let failed = result.is_failure();

            let mut entry = check.describe();
            entry.result = Some(result);
            aggregator.add_result(entry);

            if self.config.fail_fast && failed {
                debug!(check = %check.id, "fail-fast: stopping after first failure");
                break;
            }
        }

        aggregator.into_report(start.elapsed().as_millis() as u64)
    }

    /// Execute a single check, timing it and containing panics
    fn execute_check(&self, check: &RegisteredCheck, ctx: &CheckContext) -> CheckResult {
        debug!(check = %check.id, name = %check.name, "running check");
        let start = Instant::now();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            (check.check_fn)(ctx)
        }));
        let duration_ms = start.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(verdict) => verdict.into_result(duration_ms),
            Err(_) => CheckResult::Fail {
                message: "Check panicked during execution".to_string(),
                details: "An unexpected error occurred".to_string(),
                duration_ms,
            },
        };

        match &result {
            CheckResult::Fail { message, details, .. } => {
                warn!(check = %check.id, %message, %details, "check failed")
            }
            CheckResult::Pass { .. } => debug!(check = %check.id, duration_ms, "check passed"),
            CheckResult::Skip { reason } => debug!(check = %check.id, %reason, "check skipped"),
        }

        result
    }
}

/// Create all registered checks with their execution functions
pub fn create_all_checks() -> Vec<RegisteredCheck> {
    vec![
        // Integration checks
        RegisteredCheck::new(
            "INT-001",
            "Backend Health",
            CheckCategory::Integration,
            "Backend /api/ answers 200 with a 'message' field",
            integration::run_int001,
        ),
        RegisteredCheck::new(
            "INT-002",
            "Status Listing",
            CheckCategory::Integration,
            "GET /api/status returns a JSON array",
            integration::run_int002,
        ),
        RegisteredCheck::new(
            "INT-003",
            "Status Creation",
            CheckCategory::Integration,
            "POST /api/status echoes the submitted client_name",
            integration::run_int003,
        ),
        RegisteredCheck::new(
            "INT-004",
            "Frontend Accessibility",
            CheckCategory::Integration,
            "Frontend root serves text/html",
            integration::run_int004,
        ),
        RegisteredCheck::new(
            "INT-005",
            "CORS Preflight",
            CheckCategory::Integration,
            "OPTIONS /api/ from the frontend origin answers 200 or 204",
            integration::run_int005,
        ),
        // Security checks
        RegisteredCheck::new(
            "SEC-001",
            "Static Analysis Scan",
            CheckCategory::Security,
            "Static analysis reports no ERROR findings",
            security::run_sec001,
        ),
        RegisteredCheck::new(
            "SEC-002",
            "Dependency Vulnerability Scan",
            CheckCategory::Security,
            "Backend dependencies have no critical vulnerabilities",
            security::run_sec002,
        ),
        RegisteredCheck::new(
            "SEC-003",
            "Dockerfile Best Practices",
            CheckCategory::Security,
            "Images run as a non-root user and declare a HEALTHCHECK",
            security::run_sec003,
        ),
        // Kubernetes checks
        RegisteredCheck::new(
            "K8S-001",
            "Required Fields",
            CheckCategory::Kubernetes,
            "Manifests declare metadata and name; Deployments declare spec, selector and template",
            kubernetes::run_k8s001,
        ),
        RegisteredCheck::new(
            "K8S-002",
            "Security Contexts",
            CheckCategory::Kubernetes,
            "Deployments set securityContext with runAsNonRoot: true",
            kubernetes::run_k8s002,
        ),
        RegisteredCheck::new(
            "K8S-003",
            "Resource Limits",
            CheckCategory::Kubernetes,
            "Deployments declare resource requests and limits",
            kubernetes::run_k8s003,
        ),
        // ArgoCD checks
        RegisteredCheck::new(
            "ARGO-001",
            "Application Manifests",
            CheckCategory::ArgoCd,
            "Applications define source, destination and syncPolicy",
            argocd::run_argo001,
        ),
        RegisteredCheck::new(
            "ARGO-002",
            "Project Configuration",
            CheckCategory::ArgoCd,
            "AppProject declares sourceRepos and destinations",
            argocd::run_argo002,
        ),
        // Jenkins checks
        RegisteredCheck::new(
            "JNK-001",
            "Pipeline Structure",
            CheckCategory::Jenkins,
            "Jenkinsfile is a declarative pipeline with agent, stages and steps",
            jenkins::run_jnk001,
        ),
        RegisteredCheck::new(
            "JNK-002",
            "Required Stages",
            CheckCategory::Jenkins,
            "Jenkinsfile declares all six required stages",
            jenkins::run_jnk002,
        ),
        RegisteredCheck::new(
            "JNK-003",
            "Security Stages",
            CheckCategory::Jenkins,
            "Jenkinsfile wires in SonarQube, Semgrep, OWASP ZAP and Trivy",
            jenkins::run_jnk003,
        ),
    ]
}
