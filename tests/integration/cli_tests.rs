//! CLI integration tests.
//!
//! Tests for argument parsing and how arguments become a run configuration.

use clap::error::ErrorKind;
use clap::Parser;
use pipecheck::cli::args::{Args, Command, OutputFormat};
use pipecheck::{CheckCategory, PipecheckConfig};
use std::path::PathBuf;

fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
    Args::try_parse_from(std::iter::once("pipecheck").chain(argv.iter().copied()))
}

#[test]
fn test_default_args() {
    let args = parse(&[]).unwrap();
    assert_eq!(args.command(), Command::Check);
    assert_eq!(args.format, OutputFormat::Text);
    assert!(!args.quiet);
    assert!(!args.verbose);
    assert!(!args.fail_fast);
    assert!(!args.lenient_scans);
    assert!(args.only.is_empty());
    assert!(args.skip.is_empty());
}

#[test]
fn test_flags_after_subcommand() {
    let args = parse(&["check", "--security", "--fail-fast", "--format=json"]).unwrap();
    assert_eq!(args.categories(), Some(vec![CheckCategory::Security]));
    assert!(args.fail_fast);
    assert_eq!(args.format, OutputFormat::Json);
}

#[test]
fn test_flags_before_subcommand() {
    let args = parse(&["--argocd", "check"]).unwrap();
    assert_eq!(args.categories(), Some(vec![CheckCategory::ArgoCd]));
}

#[test]
fn test_config_from_args() {
    let args = parse(&[
        "--integration",
        "--jenkins",
        "--only",
        "JNK-002",
        "--skip=INT-005",
        "--fail-fast",
    ])
    .unwrap();

    let config = PipecheckConfig::from_args(&args);
    assert_eq!(
        config.categories,
        Some(vec![CheckCategory::Integration, CheckCategory::Jenkins])
    );
    assert_eq!(config.only_checks, vec!["JNK-002"]);
    assert_eq!(config.skip_checks, vec!["INT-005"]);
    assert!(config.fail_fast);

    assert!(config.selects("JNK-002", CheckCategory::Jenkins));
    assert!(!config.selects("JNK-001", CheckCategory::Jenkins));
}

#[test]
fn test_target_options() {
    let args = parse(&[
        "--backend-url",
        "http://api.staging:8001",
        "--frontend-url",
        "http://web.staging",
        "--root",
        "/srv/app",
        "--config",
        "pipecheck.toml",
    ])
    .unwrap();

    let overrides = args.target_overrides();
    assert_eq!(overrides.backend_url.as_deref(), Some("http://api.staging:8001"));
    assert_eq!(overrides.frontend_url.as_deref(), Some("http://web.staging"));
    assert_eq!(overrides.root, Some(PathBuf::from("/srv/app")));
    assert_eq!(args.config, Some(PathBuf::from("pipecheck.toml")));
}

#[test]
fn test_short_flags() {
    let quiet = parse(&["-q"]).unwrap();
    assert!(quiet.quiet);

    let verbose = parse(&["list", "-v"]).unwrap();
    assert!(verbose.verbose);
    assert_eq!(verbose.command(), Command::List);
}

#[test]
fn test_help_and_version_are_not_failures() {
    assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
    assert_eq!(parse(&["-V"]).unwrap_err().kind(), ErrorKind::DisplayVersion);
    assert!(!parse(&["--help"]).unwrap_err().use_stderr());
}

#[test]
fn test_invalid_arguments() {
    assert_eq!(parse(&["--unknown"]).unwrap_err().kind(), ErrorKind::UnknownArgument);
    assert_eq!(parse(&["--format", "yaml"]).unwrap_err().kind(), ErrorKind::InvalidValue);
    assert!(parse(&["--only"]).is_err());
    assert!(parse(&["deploy"]).is_err());
}
