//! Build script for pipecheck.
//!
//! Embeds git commit, build date and rustc version for `pipecheck version`.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");

    println!(
        "cargo:rustc-env=PIPECHECK_TARGET={}",
        env::var("TARGET").unwrap_or_else(|_| "unknown".to_string())
    );

    if let Some(hash) = capture(&["git", "rev-parse", "--short", "HEAD"]) {
        println!("cargo:rustc-env=PIPECHECK_GIT_HASH={}", hash);
    }

    if let Some(date) = capture(&["date", "-u", "+%Y-%m-%dT%H:%M:%SZ"]) {
        println!("cargo:rustc-env=PIPECHECK_BUILD_DATE={}", date);
    }

    // "rustc 1.75.0 (..." -> "1.75.0"
    if let Some(version) = capture(&["rustc", "--version"])
        .and_then(|s| s.split_whitespace().nth(1).map(|v| v.to_string()))
    {
        println!("cargo:rustc-env=PIPECHECK_RUSTC_VERSION={}", version);
    }
}

/// Run a command and return its trimmed stdout if it succeeded
fn capture(argv: &[&str]) -> Option<String> {
    let (program, args) = argv.split_first()?;
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout)
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            } else {
                None
            }
        })
}
