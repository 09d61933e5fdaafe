//! Result aggregation and reporting.
//!
//! Collects check results and produces the final report and its summary.

use crate::config::Targets;
use crate::{Check, CheckCategory, CheckResult};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub total: u32,
    pub total_duration_ms: u64,
}

/// Validation report containing all check results
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub timestamp: DateTime<Utc>,
    pub root: String,
    pub backend_url: String,
    pub frontend_url: String,
    pub checks: Vec<Check>,
    pub total_duration_ms: u64,
}

impl ValidationReport {
    /// Create a new empty report for the given targets
    pub fn new(targets: &Targets) -> Self {
        ValidationReport {
            timestamp: Utc::now(),
            root: targets.root.display().to_string(),
            backend_url: targets.backend_url.clone(),
            frontend_url: targets.frontend_url.clone(),
            checks: Vec::new(),
            total_duration_ms: 0,
        }
    }

    /// Calculate summary statistics
    pub fn summary(&self) -> ResultSummary {
        let mut summary = ResultSummary::default();

        for check in &self.checks {
            summary.total += 1;

            match &check.result {
                Some(CheckResult::Pass { duration_ms, .. }) => {
                    summary.passed += 1;
                    summary.total_duration_ms += duration_ms;
                }
                Some(CheckResult::Fail { duration_ms, .. }) => {
                    summary.failed += 1;
                    summary.total_duration_ms += duration_ms;
                }
                Some(CheckResult::Skip { .. }) | None => {
                    summary.skipped += 1;
                }
            }
        }

        summary
    }

    pub fn has_failures(&self) -> bool {
        self.checks
            .iter()
            .any(|c| c.result.as_ref().is_some_and(CheckResult::is_failure))
    }

    /// Get checks by category, in execution order
    pub fn by_category(&self, category: CheckCategory) -> Vec<&Check> {
        self.checks
            .iter()
            .filter(|c| c.category == category)
            .collect()
    }

    /// Get only failed checks
    pub fn failures(&self) -> Vec<&Check> {
        self.checks
            .iter()
            .filter(|c| c.result.as_ref().is_some_and(CheckResult::is_failure))
            .collect()
    }

    /// Process exit code: 0 when nothing failed, 1 otherwise
    pub fn exit_code(&self) -> u8 {
        if self.has_failures() {
            1
        } else {
            0
        }
    }
}

/// Result aggregator for collecting check results
#[derive(Debug)]
pub struct ResultAggregator {
    report: ValidationReport,
}

impl ResultAggregator {
    pub fn new(targets: &Targets) -> Self {
        ResultAggregator {
            report: ValidationReport::new(targets),
        }
    }

    /// Add a completed check result
    pub fn add_result(&mut self, check: Check) {
        self.report.checks.push(check);
    }

    pub fn has_failures(&self) -> bool {
        self.report.has_failures()
    }

    /// Create final validation report
    pub fn into_report(mut self, total_duration_ms: u64) -> ValidationReport {
        self.report.total_duration_ms = total_duration_ms;
        self.report
    }
}
