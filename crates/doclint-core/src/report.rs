//! Rule outcomes and the aggregated lint report.

use crate::rules::DocRule;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::PathBuf;

/// One failed expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Human-readable explanation naming the violated expectation.
    pub reason: String,

    /// 1-based document line, when the violation has a location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,

    /// The offending substring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

impl Violation {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            line: None,
            excerpt: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }
}

/// Result of evaluating one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub rule: DocRule,
    pub passed: bool,
    pub violations: Vec<Violation>,
}

impl RuleOutcome {
    pub fn from_violations(rule: DocRule, violations: Vec<Violation>) -> Self {
        Self {
            rule,
            passed: violations.is_empty(),
            violations,
        }
    }
}

/// Overall status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LintStatus {
    Passed,
    Failed,
    /// The document was absent; nothing was checked.
    Skipped,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintReport {
    pub run_id: String,
    pub document: PathBuf,
    /// Empty when skipped.
    pub document_digest: String,
    pub status: LintStatus,
    pub outcomes: Vec<RuleOutcome>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl LintReport {
    /// Build a report whose status is derived from the outcomes.
    pub fn completed(
        document: PathBuf,
        document_digest: String,
        outcomes: Vec<RuleOutcome>,
        started_at: DateTime<Utc>,
        duration_ms: u64,
    ) -> Self {
        let status = if outcomes.iter().all(|o| o.passed) {
            LintStatus::Passed
        } else {
            LintStatus::Failed
        };
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            document,
            document_digest,
            status,
            outcomes,
            started_at,
            duration_ms,
        }
    }

    /// Report for a document that does not exist.
    pub fn skipped(document: PathBuf, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            document,
            document_digest: String::new(),
            status: LintStatus::Skipped,
            outcomes: Vec::new(),
            started_at,
            duration_ms: 0,
        }
    }

    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed).count()
    }

    /// Outcome for a specific rule, if it was evaluated.
    pub fn outcome(&self, rule: DocRule) -> Option<&RuleOutcome> {
        self.outcomes.iter().find(|o| o.rule == rule)
    }

    /// Plain-text rendering used by the CLI.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        if self.status == LintStatus::Skipped {
            let _ = writeln!(out, "SKIPPED {} (document not found)", self.document.display());
            return out;
        }

        for outcome in &self.outcomes {
            let mark = if outcome.passed { "ok  " } else { "FAIL" };
            let _ = writeln!(out, "{} {}", mark, outcome.rule.name());
            for v in &outcome.violations {
                match v.line {
                    Some(line) => {
                        let _ = writeln!(out, "       line {}: {}", line, v.reason);
                    }
                    None => {
                        let _ = writeln!(out, "       {}", v.reason);
                    }
                }
            }
        }

        let _ = writeln!(
            out,
            "\n{}: {} passed, {} failed ({} ms)",
            self.document.display(),
            self.passed_count(),
            self.failed_count(),
            self.duration_ms
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(rule: DocRule, violations: Vec<Violation>) -> RuleOutcome {
        RuleOutcome::from_violations(rule, violations)
    }

    #[test]
    fn test_report_passes_when_all_outcomes_pass() {
        let report = LintReport::completed(
            PathBuf::from("docs/troubleshooting.md"),
            "abc".to_string(),
            vec![
                outcome(DocRule::NoTabs, vec![]),
                outcome(DocRule::FencesBalanced, vec![]),
            ],
            Utc::now(),
            5,
        );

        assert_eq!(report.status, LintStatus::Passed);
        assert_eq!(report.passed_count(), 2);
        assert_eq!(report.failed_count(), 0);
        assert!(!report.run_id.is_empty());
    }

    #[test]
    fn test_report_fails_with_any_violation() {
        let report = LintReport::completed(
            PathBuf::from("docs/troubleshooting.md"),
            "abc".to_string(),
            vec![
                outcome(DocRule::NoTabs, vec![]),
                outcome(
                    DocRule::CurlProtocol,
                    vec![Violation::new("Curl command missing protocol").at_line(12)],
                ),
            ],
            Utc::now(),
            5,
        );

        assert_eq!(report.status, LintStatus::Failed);
        assert_eq!(report.failed_count(), 1);
        assert!(!report.outcome(DocRule::CurlProtocol).expect("outcome").passed);
        assert!(report.outcome(DocRule::ShellSyntax).is_none());

        let text = report.render_text();
        assert!(text.contains("FAIL curl_protocol"));
        assert!(text.contains("line 12: Curl command missing protocol"));
    }

    #[test]
    fn test_skipped_report() {
        let report = LintReport::skipped(PathBuf::from("missing.md"), Utc::now());
        assert_eq!(report.status, LintStatus::Skipped);
        assert!(report.outcomes.is_empty());
        assert!(report.render_text().starts_with("SKIPPED missing.md"));
    }

    #[test]
    fn test_violation_json_omits_empty_fields() {
        let json = serde_json::to_value(Violation::new("x")).expect("json");
        assert_eq!(json, serde_json::json!({ "reason": "x" }));

        let json = serde_json::to_value(LintStatus::Skipped).expect("json");
        assert_eq!(json, "skipped");
    }
}
