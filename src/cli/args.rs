//! Command line argument model for pipecheck.

use crate::config::TargetOverrides;
use crate::CheckCategory;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command to execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Subcommand)]
pub enum Command {
    /// Run validation checks (default)
    #[default]
    Check,
    /// List all available checks
    List,
    /// Print version information
    Version,
}

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal output
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
    /// JUnit XML for CI/CD integration
    Junit,
}

/// Parsed command line arguments
#[derive(Debug, Clone, Parser)]
#[command(name = "pipecheck")]
#[command(about = "Validate a deployment pipeline's services, scans and manifests")]
#[command(version)]
#[command(after_help = "EXIT CODES:\n    0   All executed checks passed\n    1   One or more checks failed\n    3   Runtime error")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Run integration checks
    #[arg(long, global = true)]
    pub integration: bool,

    /// Run security checks
    #[arg(long, global = true)]
    pub security: bool,

    /// Run Kubernetes manifest checks
    #[arg(long, global = true)]
    pub kubernetes: bool,

    /// Run ArgoCD checks
    #[arg(long, global = true)]
    pub argocd: bool,

    /// Run Jenkins pipeline checks
    #[arg(long, global = true)]
    pub jenkins: bool,

    /// Run only this check ID (repeatable)
    #[arg(long, value_name = "ID", global = true)]
    pub only: Vec<String>,

    /// Skip this check ID (repeatable)
    #[arg(long, value_name = "ID", global = true)]
    pub skip: Vec<String>,

    /// Backend base URL
    #[arg(long, env = "BACKEND_URL", global = true)]
    pub backend_url: Option<String>,

    /// Frontend base URL
    #[arg(long, env = "FRONTEND_URL", global = true)]
    pub frontend_url: Option<String>,

    /// Project directory holding Dockerfiles, k8s/, argocd/ and Jenkinsfile
    #[arg(long, value_name = "DIR", global = true)]
    pub root: Option<PathBuf>,

    /// Load configuration from TOML file
    #[arg(short, long, value_name = "FILE", env = "PIPECHECK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Stop on first failure
    #[arg(long, global = true)]
    pub fail_fast: bool,

    /// Skip, instead of fail, scans whose tool could not run
    #[arg(long, global = true)]
    pub lenient_scans: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Only output failures
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Include failure details and timings, and debug logs on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl Args {
    pub fn command(&self) -> Command {
        self.command.unwrap_or_default()
    }

    /// Categories selected by flags; None when no category flag was given
    pub fn categories(&self) -> Option<Vec<CheckCategory>> {
        let flags = [
            (self.integration, CheckCategory::Integration),
            (self.security, CheckCategory::Security),
            (self.kubernetes, CheckCategory::Kubernetes),
            (self.argocd, CheckCategory::ArgoCd),
            (self.jenkins, CheckCategory::Jenkins),
        ];

        let selected: Vec<CheckCategory> = flags
            .into_iter()
            .filter_map(|(on, category)| on.then_some(category))
            .collect();

        if selected.is_empty() {
            None
        } else {
            Some(selected)
        }
    }

    pub fn target_overrides(&self) -> TargetOverrides {
        TargetOverrides {
            backend_url: self.backend_url.clone(),
            frontend_url: self.frontend_url.clone(),
            root: self.root.clone(),
            lenient_scans: self.lenient_scans,
        }
    }
}
