//! External process execution.
//!
//! Scanners are spawned through [`CommandRunner`]; [`SystemRunner`] is the
//! `std::process` implementation. Spawn failures (program missing, working
//! directory absent) surface as `io::Error` for the caller to classify.

use std::io;
use std::path::Path;
use std::process::Command;

/// Captured output of a finished process
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, None if terminated by a signal
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Exit description for messages ("exit code 2", "terminated by signal")
    pub fn describe_exit(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Something that can run a program to completion
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<CommandOutput>;
}

/// Runs programs on the host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<CommandOutput> {
        tracing::debug!(program, ?args, cwd = %cwd.display(), "spawning process");

        let output = Command::new(program).args(args).current_dir(cwd).output()?;

        Ok(CommandOutput {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
