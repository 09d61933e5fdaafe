//! Jenkins pipeline checks (JNK-001 through JNK-003).
//!
//! Stage names are matched as literal `stage('<name>')` declarations, so a
//! stage declared with double quotes does not count.

use super::conformance::{check_text_artifact, Requirement};
use super::CheckContext;
use crate::Verdict;

pub const JENKINSFILE: &str = "Jenkinsfile";

pub const REQUIRED_STAGES: [&str; 6] = [
    "Checkout",
    "Install Dependencies",
    "Code Quality & Security",
    "Unit Tests",
    "Build Docker Images",
    "Container Security Scan",
];

pub fn structure_rules() -> Vec<Requirement> {
    Requirement::all_literal(&["pipeline {", "agent any", "stages {", "steps {"])
}

pub fn stage_rules() -> Vec<Requirement> {
    REQUIRED_STAGES
        .iter()
        .map(|stage| Requirement::contains(format!("stage('{}')", stage)))
        .collect()
}

/// SAST, DAST and container scanning tools
pub fn security_tool_rules() -> Vec<Requirement> {
    vec![
        Requirement::contains("SonarQube"),
        Requirement::contains("Semgrep"),
        Requirement::any_of(vec![
            Requirement::contains("OWASP ZAP"),
            Requirement::contains_ignore_case("zap"),
        ]),
        Requirement::contains_ignore_case("trivy"),
    ]
}

/// Execute JNK-001: Pipeline Structure
pub fn run_jnk001(ctx: &CheckContext) -> Verdict {
    check_text_artifact(&ctx.targets.root, JENKINSFILE, &structure_rules())
        .map(|_| "Declarative pipeline with agent, stages and steps".to_string())
        .into()
}

/// Execute JNK-002: Required Stages
pub fn run_jnk002(ctx: &CheckContext) -> Verdict {
    check_text_artifact(&ctx.targets.root, JENKINSFILE, &stage_rules())
        .map(|_| format!("All {} required stages declared", REQUIRED_STAGES.len()))
        .into()
}

/// Execute JNK-003: Security Stages
pub fn run_jnk003(ctx: &CheckContext) -> Verdict {
    check_text_artifact(&ctx.targets.root, JENKINSFILE, &security_tool_rules())
        .map(|_| "SonarQube, Semgrep, ZAP and Trivy are wired in".to_string())
        .into()
}
