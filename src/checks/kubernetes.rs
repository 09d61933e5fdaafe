//! Kubernetes manifest checks (K8S-001 through K8S-003).

use super::conformance::{check_multi_file, Requirement};
use super::CheckContext;
use crate::platform::fs;
use crate::Verdict;

pub const MANIFEST_GLOB: &str = "k8s/base/*.yaml";

pub const DEPLOYMENTS: [&str; 2] = [
    "k8s/base/backend-deployment.yaml",
    "k8s/base/frontend-deployment.yaml",
];

/// Fields every manifest needs, plus the Deployment essentials
pub fn required_field_rules() -> Vec<Requirement> {
    vec![
        Requirement::contains("metadata:"),
        Requirement::contains("name:"),
        Requirement::when(
            "kind: Deployment",
            Requirement::all_literal(&["spec:", "selector:", "template:"]),
        ),
    ]
}

pub fn security_context_rules() -> Vec<Requirement> {
    Requirement::all_literal(&["securityContext:", "runAsNonRoot: true"])
}

pub fn resource_limit_rules() -> Vec<Requirement> {
    Requirement::all_literal(&["resources:", "requests:", "limits:"])
}

/// Execute K8S-001: Required Fields
pub fn run_k8s001(ctx: &CheckContext) -> Verdict {
    let manifests = match fs::expand_glob(&ctx.targets.root, MANIFEST_GLOB) {
        Ok(manifests) => manifests,
        Err(e) => return Verdict::Skip(format!("invalid manifest pattern: {}", e)),
    };

    if manifests.is_empty() {
        return Verdict::Skip(format!("no manifests matched {}", MANIFEST_GLOB));
    }

    let paths: Vec<&str> = manifests.iter().map(String::as_str).collect();
    check_multi_file(&ctx.targets.root, &paths, &required_field_rules())
        .map(|count| format!("{} manifest(s) declare metadata and name", count))
        .into()
}

/// Execute K8S-002: Security Contexts
pub fn run_k8s002(ctx: &CheckContext) -> Verdict {
    check_multi_file(&ctx.targets.root, &DEPLOYMENTS, &security_context_rules())
        .map(|_| "Deployments enforce runAsNonRoot".to_string())
        .into()
}

/// Execute K8S-003: Resource Limits
pub fn run_k8s003(ctx: &CheckContext) -> Verdict {
    check_multi_file(&ctx.targets.root, &DEPLOYMENTS, &resource_limit_rules())
        .map(|_| "Deployments declare resource requests and limits".to_string())
        .into()
}
