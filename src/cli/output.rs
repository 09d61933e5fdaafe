//! Output formatting for pipecheck.
//!
//! Provides terminal, JSON, and JUnit XML output formatters.
//!
//! # Graceful Degradation
//!
//! - Non-TTY output: Color disabled via NO_COLOR or --no-color
//! - Empty reports: Produces valid output with zero checks
//! - Formatter compiled out (`json`/`junit` features): `PipecheckError::FormatUnavailable`
//!
//! All formatters produce valid output for any ValidationReport input.

use crate::cli::args::OutputFormat;
use crate::engine::result::ValidationReport;
use crate::{Check, CheckCategory, CheckResult, PipecheckError};

const RULE: &str =
    "--------------------------------------------------------------------------------";

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a validation report into a string
    fn format(&self, report: &ValidationReport) -> Result<String, PipecheckError>;
}

/// Terminal (human-readable) formatter
pub struct TerminalFormatter {
    color: bool,
    verbose: bool,
    quiet: bool,
}

impl TerminalFormatter {
    pub fn new(color: bool, verbose: bool, quiet: bool) -> Self {
        TerminalFormatter {
            color,
            verbose,
            quiet,
        }
    }

    fn colorize(&self, text: &str, color_code: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", color_code, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.colorize(text, "32")
    }

    fn red(&self, text: &str) -> String {
        self.colorize(text, "31")
    }

    fn gray(&self, text: &str) -> String {
        self.colorize(text, "90")
    }

    fn format_check(&self, check: &Check) -> String {
        let (status, message) = match &check.result {
            Some(CheckResult::Pass {
                message,
                duration_ms,
            }) => {
                let msg = if self.verbose {
                    format!("{} ({}ms)", message, duration_ms)
                } else {
                    message.clone()
                };
                (self.green("[PASS]"), msg)
            }
            Some(CheckResult::Fail {
                message,
                details,
                duration_ms,
            }) => {
                let msg = if self.verbose {
                    format!("{} - {} ({}ms)", message, details, duration_ms)
                } else {
                    message.clone()
                };
                (self.red("[FAIL]"), msg)
            }
            Some(CheckResult::Skip { reason }) => (self.gray("[SKIP]"), reason.clone()),
            None => (self.gray("[----]"), "Not executed".to_string()),
        };

        format!("  {} {}: {} ({})\n", status, check.id, check.name, message)
    }
}

impl OutputFormatter for TerminalFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String, PipecheckError> {
        let mut output = String::new();

        // Header
        output.push_str(RULE);
        output.push('\n');
        output.push_str("pipecheck validation report\n");
        output.push_str(&format!("Root: {}\n", report.root));
        output.push_str(&format!("Backend: {}\n", report.backend_url));
        output.push_str(&format!("Frontend: {}\n", report.frontend_url));
        output.push_str(&format!(
            "Timestamp: {}\n",
            report.timestamp.format("%Y-%m-%dT%H:%M:%SZ")
        ));
        output.push_str(RULE);
        output.push_str("\n\n");

        for category in CheckCategory::ALL {
            let category_checks = report.by_category(category);
            if category_checks.is_empty() {
                continue;
            }

            let shown: Vec<&Check> = if self.quiet {
                category_checks
                    .into_iter()
                    .filter(|c| c.result.as_ref().is_some_and(CheckResult::is_failure))
                    .collect()
            } else {
                category_checks
            };
            if shown.is_empty() {
                continue;
            }

            output.push_str(&format!("{} CHECKS\n", category.to_string().to_uppercase()));
            for check in shown {
                output.push_str(&self.format_check(check));
            }
            output.push('\n');
        }

        // Summary
        let summary = report.summary();
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&format!(
            "SUMMARY: {} passed, {} failed, {} skipped\n",
            summary.passed, summary.failed, summary.skipped
        ));
        output.push_str(&format!(
            "Total time: {:.1}s\n",
            report.total_duration_ms as f64 / 1000.0
        ));

        let exit_desc = if summary.failed > 0 {
            "failures detected"
        } else {
            "all checks passed"
        };
        output.push_str(&format!(
            "Exit code: {} ({})\n",
            report.exit_code(),
            exit_desc
        ));
        output.push_str(RULE);

        Ok(output)
    }
}

/// JSON formatter
#[cfg(feature = "json")]
pub struct JsonFormatter {
    pretty: bool,
}

#[cfg(feature = "json")]
impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        JsonFormatter { pretty }
    }
}

#[cfg(feature = "json")]
#[derive(serde::Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a ValidationReport,
    summary: crate::engine::result::ResultSummary,
}

#[cfg(feature = "json")]
impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String, PipecheckError> {
        let document = JsonReport {
            report,
            summary: report.summary(),
        };
        let output = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(output)
    }
}

/// JUnit XML formatter
#[cfg(feature = "junit")]
#[derive(Default)]
pub struct JunitFormatter;

#[cfg(feature = "junit")]
impl JunitFormatter {
    pub fn new() -> Self {
        JunitFormatter
    }

    fn escape_xml(s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '&' => result.push_str("&amp;"),
                '<' => result.push_str("&lt;"),
                '>' => result.push_str("&gt;"),
                '"' => result.push_str("&quot;"),
                '\'' => result.push_str("&apos;"),
                // Not representable in XML 1.0, even as character references
                '\t' | '\n' | '\r' => result.push(c),
                c if c < ' ' || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
                c => result.push(c),
            }
        }
        result
    }

    fn seconds(duration_ms: u64) -> f64 {
        duration_ms as f64 / 1000.0
    }
}

#[cfg(feature = "junit")]
impl OutputFormatter for JunitFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String, PipecheckError> {
        let mut output = String::new();
        output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

        let summary = report.summary();
        output.push_str(&format!(
            "<testsuites name=\"pipecheck\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"{}\" time=\"{:.3}\">\n",
            summary.total,
            summary.failed,
            summary.skipped,
            Self::seconds(report.total_duration_ms)
        ));

        // One suite per category
        for category in CheckCategory::ALL {
            let category_checks = report.by_category(category);
            if category_checks.is_empty() {
                continue;
            }

            let suite_name = category.slug();
            let suite_failures = category_checks
                .iter()
                .filter(|c| matches!(&c.result, Some(CheckResult::Fail { .. })))
                .count();
            let suite_skipped = category_checks
                .iter()
                .filter(|c| matches!(&c.result, Some(CheckResult::Skip { .. }) | None))
                .count();
            let suite_time: u64 = category_checks
                .iter()
                .filter_map(|c| c.result.as_ref().map(CheckResult::duration_ms))
                .sum();

            output.push_str(&format!(
                "  <testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"{}\" time=\"{:.3}\">\n",
                suite_name,
                category_checks.len(),
                suite_failures,
                suite_skipped,
                Self::seconds(suite_time)
            ));

            for check in category_checks {
                let time = check.result.as_ref().map_or(0, CheckResult::duration_ms);
                output.push_str(&format!(
                    "    <testcase name=\"{}: {}\" classname=\"pipecheck.{}\" time=\"{:.3}\"",
                    Self::escape_xml(&check.id),
                    Self::escape_xml(&check.name),
                    suite_name,
                    Self::seconds(time)
                ));

                match &check.result {
                    Some(CheckResult::Pass { message, .. }) => {
                        output.push_str(">\n");
                        output.push_str(&format!(
                            "      <system-out>{}</system-out>\n",
                            Self::escape_xml(message)
                        ));
                        output.push_str("    </testcase>\n");
                    }
                    Some(CheckResult::Fail {
                        message, details, ..
                    }) => {
                        output.push_str(">\n");
                        output.push_str(&format!(
                            "      <failure message=\"{}\">{}</failure>\n",
                            Self::escape_xml(message),
                            Self::escape_xml(details)
                        ));
                        output.push_str("    </testcase>\n");
                    }
                    Some(CheckResult::Skip { reason }) => {
                        output.push_str(">\n");
                        output.push_str(&format!(
                            "      <skipped message=\"{}\" />\n",
                            Self::escape_xml(reason)
                        ));
                        output.push_str("    </testcase>\n");
                    }
                    None => {
                        output.push_str(">\n      <skipped message=\"not executed\" />\n");
                        output.push_str("    </testcase>\n");
                    }
                }
            }

            output.push_str("  </testsuite>\n");
        }

        output.push_str("</testsuites>");
        Ok(output)
    }
}

/// Get a formatter based on the output format
pub fn get_formatter(
    format: OutputFormat,
    no_color: bool,
    verbose: bool,
    quiet: bool,
) -> Result<Box<dyn OutputFormatter>, PipecheckError> {
    match format {
        OutputFormat::Text => Ok(Box::new(TerminalFormatter::new(!no_color, verbose, quiet))),
        #[cfg(feature = "json")]
        OutputFormat::Json => Ok(Box::new(JsonFormatter::new(true))),
        #[cfg(not(feature = "json"))]
        OutputFormat::Json => Err(PipecheckError::FormatUnavailable("json".to_string())),
        #[cfg(feature = "junit")]
        OutputFormat::Junit => Ok(Box::new(JunitFormatter::new())),
        #[cfg(not(feature = "junit"))]
        OutputFormat::Junit => Err(PipecheckError::FormatUnavailable("junit".to_string())),
    }
}
