//! Validation check modules.
//!
//! This module contains all validation checks organized by category:
//! - Integration: live HTTP requests against the backend and frontend
//! - Security: scanner findings and Dockerfile hygiene
//! - Kubernetes: manifests under k8s/base
//! - ArgoCD: application and project definitions
//! - Jenkins: pipeline definition
//!
//! # Failure Isolation
//!
//! Every check is independent and stateless:
//! - Network errors: Fail only the check that made the request
//! - Missing artifacts: Fail with `ArtifactUnreadable` for that check
//! - Scanner tool errors: Fail (strict policy) or Skip (lenient policy)
//! - No manifests to inspect: Skip with reason
//!
//! Checks never panic. All error conditions are converted to a [`Verdict`]
//! for the orchestrator to time and record.
//!
//! [`Verdict`]: crate::Verdict

pub mod argocd;
pub mod conformance;
pub mod integration;
pub mod jenkins;
pub mod kubernetes;
pub mod security;

use crate::config::{Settings, Targets};
use crate::platform::http::{HttpTransport, UreqTransport};
use crate::platform::process::{CommandRunner, SystemRunner};
use security::{ScanPolicy, ScannerSet};

/// Everything a check may consult: resolved targets plus the I/O seams.
pub struct CheckContext {
    pub targets: Targets,
    pub scanners: ScannerSet,
    pub scan_policy: ScanPolicy,
    pub http: Box<dyn HttpTransport>,
    pub runner: Box<dyn CommandRunner>,
}

impl CheckContext {
    /// Context backed by the real HTTP client and process runner
    pub fn new(settings: Settings) -> Self {
        CheckContext {
            targets: settings.targets,
            scanners: settings.scanners,
            scan_policy: settings.scan_policy,
            http: Box::new(UreqTransport::new()),
            runner: Box::new(SystemRunner),
        }
    }

    pub fn with_transport(mut self, http: impl HttpTransport + 'static) -> Self {
        self.http = Box::new(http);
        self
    }

    pub fn with_runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }
}
