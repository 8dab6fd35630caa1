//! Lint run orchestration.

use crate::document::Document;
use crate::error::{DocLintError, Result};
use crate::profile::CheckProfile;
use crate::report::{LintReport, RuleOutcome};
use crate::rules::{evaluate_rule, DocRule, RuleContext, RuleSet};
use crate::shell::ShellSyntaxValidator;
use chrono::Utc;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Runbook linter.
pub struct DocLinter {
    profile: CheckProfile,
    rules: RuleSet,
}

impl DocLinter {
    pub fn new(profile: CheckProfile, rules: RuleSet) -> Self {
        Self { profile, rules }
    }

    pub fn profile(&self) -> &CheckProfile {
        &self.profile
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Load and lint the document at `path`.
    ///
    /// A missing document produces a skipped report, not an error.
    pub async fn lint_path(&self, path: &Path) -> Result<LintReport> {
        match Document::load(path) {
            Ok(doc) => Ok(self.lint_document(&doc).await),
            Err(DocLintError::DocumentNotFound(missing)) => {
                info!(document = %missing.display(), "Document not found, skipping");
                Ok(LintReport::skipped(missing, Utc::now()))
            }
            Err(e) => Err(e),
        }
    }

    /// Evaluate every rule in the set against `doc`.
    ///
    /// Outcomes follow rule-set order. Rules run sequentially and independently.
    pub async fn lint_document(&self, doc: &Document) -> LintReport {
        let started_at = Utc::now();
        let start = Instant::now();
        let ctx = RuleContext::new(doc, &self.profile);

        info!(
            document = %doc.path.display(),
            blocks = ctx.blocks.len(),
            rules = self.rules.rules.len(),
            "Starting runbook lint"
        );

        let mut outcomes = Vec::with_capacity(self.rules.rules.len());
        for rule in &self.rules.rules {
            let outcome = match evaluate_rule(*rule, &ctx) {
                Some(outcome) => outcome,
                None => self.evaluate_external(*rule, &ctx).await,
            };
            debug!(
                rule = %outcome.rule,
                passed = outcome.passed,
                violations = outcome.violations.len(),
                "Rule evaluated"
            );
            outcomes.push(outcome);
        }

        let report = LintReport::completed(
            doc.path.clone(),
            doc.digest.clone(),
            outcomes,
            started_at,
            start.elapsed().as_millis() as u64,
        );

        info!(
            run_id = %report.run_id,
            passed = report.passed_count(),
            failed = report.failed_count(),
            "Runbook lint finished"
        );
        report
    }

    async fn evaluate_external(&self, rule: DocRule, ctx: &RuleContext<'_>) -> RuleOutcome {
        match rule {
            DocRule::ShellSyntax => {
                let validator = ShellSyntaxValidator::new(self.profile.shell.clone());
                let violations = validator.validate_blocks(&ctx.blocks).await;
                RuleOutcome::from_violations(rule, violations)
            }
            other => RuleOutcome::from_violations(other, Vec::new()),
        }
    }
}

impl Default for DocLinter {
    fn default() -> Self {
        Self::new(CheckProfile::dsp(), RuleSet::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::LintStatus;

    #[tokio::test]
    async fn test_missing_document_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let linter = DocLinter::default();

        let report = linter
            .lint_path(&dir.path().join("troubleshooting.md"))
            .await
            .expect("lint");
        assert_eq!(report.status, LintStatus::Skipped);
        assert!(report.outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_outcomes_follow_rule_order() {
        let rules = RuleSet {
            rules: vec![DocRule::PlaceholderText, DocRule::NoTabs, DocRule::FencesBalanced],
        };
        let linter = DocLinter::new(CheckProfile::dsp(), rules);
        let doc = Document::from_text("TODO\n```bash\n\tdocker ps\n```\n");

        let report = linter.lint_document(&doc).await;
        let order: Vec<_> = report.outcomes.iter().map(|o| o.rule).collect();
        assert_eq!(
            order,
            vec![DocRule::PlaceholderText, DocRule::NoTabs, DocRule::FencesBalanced]
        );
        assert_eq!(report.status, LintStatus::Failed);
        assert!(!report.outcomes[0].passed);
        // The block is trimmed, so its leading tab is gone.
        assert!(report.outcomes[1].passed);
        assert!(report.outcomes[2].passed);
        assert_eq!(report.document_digest, doc.digest);
    }
}
