//! ArgoCD definition checks (ARGO-001, ARGO-002).

use super::conformance::{check_multi_file, check_text_artifact, Requirement};
use super::CheckContext;
use crate::Verdict;

pub const APPLICATIONS: [&str; 2] = [
    "argocd/applications/app-dev.yaml",
    "argocd/applications/app-hml.yaml",
];

pub const PROJECT: &str = "argocd/projects/app-project.yaml";

pub fn application_rules() -> Vec<Requirement> {
    Requirement::all_literal(&[
        "kind: Application",
        "spec:",
        "source:",
        "destination:",
        "syncPolicy:",
    ])
}

pub fn project_rules() -> Vec<Requirement> {
    Requirement::all_literal(&["kind: AppProject", "sourceRepos:", "destinations:"])
}

/// Execute ARGO-001: Application Manifests
pub fn run_argo001(ctx: &CheckContext) -> Verdict {
    check_multi_file(&ctx.targets.root, &APPLICATIONS, &application_rules())
        .map(|count| format!("{} application(s) define source, destination and sync policy", count))
        .into()
}

/// Execute ARGO-002: Project Configuration
pub fn run_argo002(ctx: &CheckContext) -> Verdict {
    check_text_artifact(&ctx.targets.root, PROJECT, &project_rules())
        .map(|_| "AppProject restricts source repos and destinations".to_string())
        .into()
}
