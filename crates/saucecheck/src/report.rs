//! Structured test report.
//!
//! Shape: `{suites: [{title, suites: [{title, specs: [{title, ok}]}]}]}`.
//! Suites nest to any depth; readers that only need the specs use
//! [`TestReport::specs`], which flattens the tree depth-first.

use crate::result::SauceResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One executed case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSpec {
    /// Case title, e.g. `TC-001: Successful`
    pub title: String,
    /// Whether the case passed
    pub ok: bool,
    /// Failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReportSpec {
    /// Passing spec
    #[must_use]
    pub fn pass(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ok: true,
            error: None,
        }
    }

    /// Failing spec
    #[must_use]
    pub fn fail(title: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// Group of specs and nested groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSuite {
    /// Group title
    #[serde(default)]
    pub title: String,
    /// Nested groups
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suites: Vec<ReportSuite>,
    /// Specs directly in this group
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specs: Vec<ReportSpec>,
}

impl ReportSuite {
    /// Empty group
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a ReportSpec>) {
        out.extend(self.specs.iter());
        for child in &self.suites {
            child.collect(out);
        }
    }
}

/// Whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestReport {
    /// Top-level suites
    #[serde(default)]
    pub suites: Vec<ReportSuite>,
}

impl TestReport {
    /// Empty report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a top-level suite
    pub fn push(&mut self, suite: ReportSuite) {
        self.suites.push(suite);
    }

    /// Every spec, depth-first
    #[must_use]
    pub fn specs(&self) -> Vec<&ReportSpec> {
        let mut out = Vec::new();
        for suite in &self.suites {
            suite.collect(&mut out);
        }
        out
    }

    /// Number of specs
    #[must_use]
    pub fn total(&self) -> usize {
        self.specs().len()
    }

    /// Number of passing specs
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.specs().iter().filter(|s| s.ok).count()
    }

    /// Number of failing specs
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.total() - self.passed_count()
    }

    /// Whether every spec passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.specs().iter().all(|s| s.ok)
    }

    /// Parse from JSON text
    ///
    /// # Errors
    ///
    /// Returns error on malformed JSON
    pub fn from_json(text: &str) -> SauceResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Pretty JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> SauceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a report file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn read(path: impl AsRef<Path>) -> SauceResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Write a report file, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn write(&self, path: impl AsRef<Path>) -> SauceResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample() -> TestReport {
        let mut login = ReportSuite::new("LOGIN");
        login.specs.push(ReportSpec::pass("TC-001: Login with valid user"));
        login.specs.push(ReportSpec::fail("TC-002: Login with locked user", "boom"));
        let mut file = ReportSuite::new("ui.spec");
        file.suites.push(login);
        let mut report = TestReport::new();
        report.push(file);
        report
    }

    #[test]
    fn test_counts() {
        let report = sample();
        assert_eq!(report.total(), 2);
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(!report.all_passed());
    }

    #[test]
    fn test_reads_playwright_shape_with_extra_fields() {
        let json = r#"{
            "config": {"workers": 1},
            "suites": [{
                "title": "api.spec.js",
                "file": "api.spec.js",
                "suites": [{
                    "title": "GET - SINGLE USER",
                    "specs": [{"title": "TC-001: Successful", "ok": true, "tests": []}]
                }]
            }]
        }"#;
        let report = TestReport::from_json(json).unwrap();
        let specs = report.specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].title, "TC-001: Successful");
    }

    #[test]
    fn test_flattens_three_levels() {
        let mut inner = ReportSuite::new("inner");
        inner.specs.push(ReportSpec::pass("deep"));
        let mut middle = ReportSuite::new("middle");
        middle.specs.push(ReportSpec::pass("shallow"));
        middle.suites.push(inner);
        let mut outer = ReportSuite::new("outer");
        outer.suites.push(middle);
        let report = TestReport { suites: vec![outer] };
        let titles: Vec<&str> = report.specs().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["shallow", "deep"]);
    }

    #[test]
    fn test_write_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("results.json");
        sample().write(&path).unwrap();
        assert_eq!(TestReport::read(&path).unwrap(), sample());
    }

    #[test]
    fn test_error_omitted_when_passing() {
        let json = serde_json::to_string(&ReportSpec::pass("x")).unwrap();
        assert_eq!(json, r#"{"title":"x","ok":true}"#);
    }
}
