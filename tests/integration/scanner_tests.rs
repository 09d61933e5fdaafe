//! External scanner integration tests.
//!
//! SEC-001 and SEC-002 against fake scanner binaries under both scan policies.

use crate::mocks::*;
use pipecheck::checks::security::ScanPolicy;
use pipecheck::config::{FileConfig, Settings, TargetOverrides};
use pipecheck::{run_checks, CheckResult, PipecheckConfig};
use serde_json::json;

fn security_only() -> PipecheckConfig {
    PipecheckConfig {
        only_checks: vec!["SEC-001".to_string(), "SEC-002".to_string()],
        ..Default::default()
    }
}

fn result<'a>(report: &'a pipecheck::Report, id: &str) -> &'a CheckResult {
    report
        .checks
        .iter()
        .find(|c| c.id == id)
        .and_then(|c| c.result.as_ref())
        .unwrap()
}

#[test]
fn test_clean_scanners_pass() {
    let project = ProjectFixture::healthy();
    let runner = FakeRunner::clean();
    let invocations = runner.invocations();

    let report = run_checks(&security_only(), &project.context(FakeTransport::new(), runner));
    assert_eq!(report.summary().passed, 2);

    let calls = invocations.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].program, "semgrep");
    assert_eq!(
        calls[0].args,
        vec!["--config=p/security-audit", "--json", "--quiet", "."]
    );
    assert_eq!(calls[0].cwd, project.root().join("."));
    assert_eq!(calls[1].program, "safety");
    assert_eq!(calls[1].args, vec!["check", "--json"]);
    assert_eq!(calls[1].cwd, project.root().join("backend"));
}

#[test]
fn test_semgrep_error_severity_fails() {
    let project = ProjectFixture::healthy();
    let output = json!({
        "results": [
            {"check_id": "python.flask.security.injection.tainted-sql", "extra": {"severity": "ERROR"}},
            {"check_id": "python.lang.best-practice.logging", "extra": {"severity": "WARNING"}},
            {"check_id": "javascript.browser.security.eval", "extra": {"severity": "ERROR"}}
        ]
    });
    let runner = FakeRunner::clean().program("semgrep", FakeProgram::exits(0, output.to_string()));

    let report = run_checks(&security_only(), &project.context(FakeTransport::new(), runner));

    match result(&report, "SEC-001") {
        CheckResult::Fail { message, details, .. } => {
            assert_eq!(message, "semgrep reported 2 finding(s) at or above severity ERROR");
            assert_eq!(
                details,
                "python.flask.security.injection.tainted-sql, javascript.browser.security.eval"
            );
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(!result(&report, "SEC-002").is_failure());
}

#[test]
fn test_safety_critical_vulnerability_fails() {
    let project = ProjectFixture::healthy();
    let output = json!([
        {"package_name": "jinja2", "vulnerability_id": "70612", "severity": "Critical"},
        {"package_name": "requests", "vulnerability_id": "58755", "severity": "medium"},
        {"package_name": "urllib3", "severity": "critical"}
    ]);
    let runner = FakeRunner::clean().program("safety", FakeProgram::exits(64, output.to_string()));

    let report = run_checks(&security_only(), &project.context(FakeTransport::new(), runner));

    match result(&report, "SEC-002") {
        CheckResult::Fail { details, .. } => assert_eq!(details, "70612"),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn test_safety_object_report_critical_fails() {
    let project = ProjectFixture::healthy();
    let output = json!({
        "report_meta": {"scan_target": "environment", "vulnerabilities_found": 1},
        "vulnerabilities": [
            {"package_name": "jinja2", "vulnerability_id": "70612", "severity": "critical"}
        ]
    });
    let runner = FakeRunner::clean().program("safety", FakeProgram::exits(64, output.to_string()));

    let report = run_checks(&security_only(), &project.context(FakeTransport::new(), runner));

    match result(&report, "SEC-002") {
        CheckResult::Fail { details, .. } => assert_eq!(details, "70612"),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn test_safety_findings_exit_without_findings_list_fails() {
    let project = ProjectFixture::healthy();
    let output = json!({"report_meta": {"vulnerabilities_found": 2}});
    let runner = FakeRunner::clean().program("safety", FakeProgram::exits(64, output.to_string()));

    let report = run_checks(&security_only(), &project.context(FakeTransport::new(), runner));

    match result(&report, "SEC-002") {
        CheckResult::Fail { message, details, .. } => {
            assert_eq!(message, "safety could not be evaluated");
            assert!(details.contains("no findings list"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn test_safety_without_critical_passes() {
    let project = ProjectFixture::healthy();
    let output = json!([
        {"package_name": "requests", "vulnerability_id": "58755", "severity": "high"},
        {"package_name": "urllib3", "severity": "critical"}
    ]);
    let runner = FakeRunner::clean().program("safety", FakeProgram::exits(64, output.to_string()));

    let report = run_checks(&security_only(), &project.context(FakeTransport::new(), runner));
    assert!(!report.has_failures());
}

#[test]
fn test_strict_policy_fails_missing_scanner() {
    let project = ProjectFixture::healthy();
    let runner = FakeRunner::clean().program("semgrep", FakeProgram::NotFound);

    let report = run_checks(&security_only(), &project.context(FakeTransport::new(), runner));

    match result(&report, "SEC-001") {
        CheckResult::Fail { message, details, .. } => {
            assert_eq!(message, "semgrep could not be evaluated");
            assert!(details.starts_with("failed to run semgrep"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn test_lenient_policy_skips_missing_scanner() {
    let project = ProjectFixture::healthy();
    let overrides = TargetOverrides {
        backend_url: Some(BACKEND.to_string()),
        frontend_url: Some(FRONTEND.to_string()),
        root: Some(project.root().to_path_buf()),
        lenient_scans: true,
    };
    let settings = Settings::resolve(&overrides, None);
    assert_eq!(settings.scan_policy, ScanPolicy::Lenient);

    let ctx = pipecheck::checks::CheckContext::new(settings)
        .with_transport(FakeTransport::new())
        .with_runner(FakeRunner::new());

    let report = run_checks(&security_only(), &ctx);

    assert!(matches!(result(&report, "SEC-001"), CheckResult::Skip { .. }));
    assert!(matches!(result(&report, "SEC-002"), CheckResult::Skip { .. }));
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn test_unparsable_output_is_tool_error() {
    let project = ProjectFixture::healthy();
    let runner = FakeRunner::clean().program(
        "safety",
        FakeProgram::exits(1, "Traceback (most recent call last):"),
    );

    let report = run_checks(&security_only(), &project.context(FakeTransport::new(), runner));

    match result(&report, "SEC-002") {
        CheckResult::Fail { message, .. } => assert_eq!(message, "safety could not be evaluated"),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn test_semgrep_nonzero_exit_is_tool_error() {
    let project = ProjectFixture::healthy();
    let runner = FakeRunner::clean().program(
        "semgrep",
        FakeProgram::Exits {
            code: 2,
            stdout: String::new(),
            stderr: "invalid configuration\n".to_string(),
        },
    );

    let report = run_checks(&security_only(), &project.context(FakeTransport::new(), runner));

    match result(&report, "SEC-001") {
        CheckResult::Fail { details, .. } => {
            assert_eq!(details, "semgrep exited with exit code 2: invalid configuration")
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn test_config_file_overrides_scanner_invocation() {
    let project = ProjectFixture::healthy();
    let file = FileConfig::parse(
        r#"
[scanners.static_analysis]
program = "/opt/semgrep/bin/semgrep"
args = ["scan", "--json"]
"#,
    )
    .unwrap();
    let settings = Settings::resolve(
        &TargetOverrides {
            root: Some(project.root().to_path_buf()),
            ..Default::default()
        },
        Some(file),
    );
    let runner = FakeRunner::clean().program(
        "/opt/semgrep/bin/semgrep",
        FakeProgram::exits(0, r#"{"results": []}"#),
    );
    let invocations = runner.invocations();
    let ctx = pipecheck::checks::CheckContext::new(settings)
        .with_transport(FakeTransport::new())
        .with_runner(runner);

    let report = run_checks(&security_only(), &ctx);

    assert!(!report.has_failures());
    assert_eq!(invocations.lock().unwrap()[0].args, vec!["scan", "--json"]);
}
