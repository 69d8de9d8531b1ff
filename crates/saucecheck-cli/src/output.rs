//! Console output for runs and syncs

use console::{style, Style, Term};
use saucecheck::{ReportSuite, TestReport};
use std::time::Duration;

/// Writes progress and results to stderr
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
    /// Also list passing specs
    pub verbose: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(true, false, false)
    }
}

impl Reporter {
    /// Create a new reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool, verbose: bool) -> Self {
        Self {
            term: Term::stderr(),
            use_color,
            quiet,
            verbose,
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }

    /// Print one suite's specs: failures always, passes when verbose
    pub fn suite(&self, suite: &ReportSuite) {
        self.header(&suite.title);
        for group in &suite.suites {
            for spec in &group.specs {
                let line = format!("{} > {}", group.title, spec.title);
                if spec.ok {
                    if self.verbose {
                        self.success(&line);
                    }
                } else {
                    self.failure(&line);
                    if let Some(error) = &spec.error {
                        for detail in error.lines() {
                            let _ = self.term.write_line(&format!("    {detail}"));
                        }
                    }
                }
            }
        }
    }

    /// Print the run summary
    pub fn summary(&self, report: &TestReport, duration: Duration) {
        let passed = report.passed_count();
        let failed = report.failed_count();
        if self.quiet && failed == 0 {
            return;
        }

        let _ = self.term.write_line("");

        let total = report.total();
        let duration_secs = duration.as_secs_f64();

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();

            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };

            let _ = self.term.write_line(&format!(
                "{} {} specs in {:.2}s ({} passed, {} failed)",
                status,
                total,
                duration_secs,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} specs in {duration_secs:.2}s ({passed} passed, {failed} failed)"
            ));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use saucecheck::ReportSpec;

    fn report() -> TestReport {
        let mut group = ReportSuite::new("LOGIN PAGE");
        group.specs = vec![
            ReportSpec::pass("TC-001: Login page is displayed"),
            ReportSpec::fail("TC-002: Login with valid users", "Assertion failed: x\nsecond line"),
        ];
        let mut suite = ReportSuite::new("ui.spec");
        suite.suites.push(group);
        let mut report = TestReport::new();
        report.push(suite);
        report
    }

    #[test]
    fn test_new_reporter() {
        let reporter = Reporter::new(true, false, true);
        assert!(reporter.use_color);
        assert!(!reporter.quiet);
        assert!(reporter.verbose);
    }

    #[test]
    fn test_default_reporter() {
        let reporter = Reporter::default();
        assert!(reporter.use_color);
        assert!(!reporter.verbose);
    }

    #[test]
    fn test_suite_and_summary() {
        let reporter = Reporter::new(false, false, true);
        let report = report();
        reporter.suite(&report.suites[0]);
        reporter.summary(&report, Duration::from_millis(1500));
        // No panic = success
    }

    #[test]
    fn test_quiet_mode_suppresses_output() {
        let reporter = Reporter::new(false, true, false);
        reporter.success("hidden");
        reporter.info("hidden");
        reporter.header("hidden");
        // Failure is still printed
        reporter.failure("shown");
        // No panic = success
    }
}
