//! pipecheck CLI entry point
//!
//! Validation runner for a deployment pipeline's services, scans and manifests.

use clap::Parser;
use pipecheck::checks::CheckContext;
use pipecheck::cli::args::{Args, Command};
use pipecheck::cli::output::get_formatter;
use pipecheck::config::{FileConfig, Settings};
use pipecheck::engine::orchestrator::create_all_checks;
use pipecheck::version::VersionReport;
use pipecheck::{run_checks, CheckCategory, PipecheckConfig, PipecheckError};

use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version are reported as errors by clap but are not failures
            let code = if e.use_stderr() { 3 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    let no_color = args.no_color || std::env::var_os("NO_COLOR").is_some();
    init_logging(args.verbose, no_color);

    match args.command() {
        Command::Version => {
            println!("{}", VersionReport::current());
            ExitCode::SUCCESS
        }
        Command::List => {
            print_check_list();
            ExitCode::SUCCESS
        }
        Command::Check => match check(&args, no_color) {
            Ok(code) => ExitCode::from(code),
            Err(e) => {
                tracing::error!("{}", e);
                eprintln!("Error: {}", e);
                ExitCode::from(3)
            }
        },
    }
}

/// Logs go to stderr so stdout carries only the report
fn init_logging(verbose: bool, no_color: bool) {
    let log_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .init();
}

fn print_check_list() {
    let checks = create_all_checks();

    println!("Available checks:");
    for category in CheckCategory::ALL {
        println!();
        println!("{} CHECKS:", category.to_string().to_uppercase());
        for check in checks.iter().filter(|c| c.category == category) {
            println!("  {:<9}{:<32}{}", check.id, check.name, check.description);
        }
    }
}

fn check(args: &Args, no_color: bool) -> Result<u8, PipecheckError> {
    // Resolve the formatter first so an unavailable format fails before any check runs
    let formatter = get_formatter(args.format, no_color, args.verbose, args.quiet)?;

    let file = args.config.as_deref().map(FileConfig::load).transpose()?;
    let settings = Settings::resolve(&args.target_overrides(), file);
    let context = CheckContext::new(settings);

    let report = run_checks(&PipecheckConfig::from_args(args), &context);

    println!("{}", formatter.format(&report)?);
    Ok(report.exit_code())
}
