//! Runbook consistency rules.
//!
//! Each [`DocRule`] is an independent predicate over the document text or its
//! bash blocks. Rules never short-circuit each other: a rule set is always
//! evaluated in full and every violation is reported.

mod blocks;
mod document;

use crate::document::Document;
use crate::extract::CodeBlock;
use crate::profile::CheckProfile;
use crate::report::{RuleOutcome, Violation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single consistency rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocRule {
    // ---- document level ----
    /// At least `min_code_blocks` bash blocks, none empty.
    CodeBlocksPresent,
    /// Every required heading text occurs.
    RequiredSections,
    /// `:<port>` and `# <Service>` occur for each documented service.
    ServicePorts,
    /// Every container name occurs.
    Containers,
    /// Every helper script path occurs.
    ScriptPaths,
    /// Dangerous commands sit near a caution marker.
    DangerousCommandWarnings,
    /// Every Problem section has Diagnosis and Solutions markers.
    ProblemSectionsComplete,
    /// Every health endpoint URL occurs.
    HealthEndpoints,
    /// Every required environment variable name occurs.
    EnvironmentVariables,
    /// Backslash continuations anywhere in the document end their line.
    DocumentLineContinuations,
    /// Opening bash fences match extracted blocks; total fences are double.
    FencesBalanced,
    /// All `-f ...docker-compose.yml` paths are identical and rooted.
    ComposePathsConsistent,
    /// No known typo strings.
    KnownTypos,
    /// No TODO/FIXME/TBD markers.
    PlaceholderText,

    // ---- block level ----
    /// Inline comments are preceded by a space.
    InlineCommentSpacing,
    /// `$( )` and `${ }` are not blank.
    VariableExpansions,
    /// No tab characters in blocks.
    NoTabs,
    /// `curl` lines carry an explicit scheme.
    CurlProtocol,
    /// A trailing backslash is the last character and is followed by content.
    BlockLineContinuations,
    /// Lines past the width limit use a continuation marker.
    LongLinesWrapped,
    /// `docker-compose` invocations pin the compose file.
    ComposeFileFlag,

    // ---- external ----
    /// Blocks parse under the shell's syntax-check mode.
    ShellSyntax,
}

impl DocRule {
    /// Every rule, in report order.
    pub const ALL: [DocRule; 22] = [
        DocRule::CodeBlocksPresent,
        DocRule::RequiredSections,
        DocRule::ServicePorts,
        DocRule::Containers,
        DocRule::ScriptPaths,
        DocRule::DangerousCommandWarnings,
        DocRule::ProblemSectionsComplete,
        DocRule::HealthEndpoints,
        DocRule::EnvironmentVariables,
        DocRule::DocumentLineContinuations,
        DocRule::FencesBalanced,
        DocRule::ComposePathsConsistent,
        DocRule::KnownTypos,
        DocRule::PlaceholderText,
        DocRule::InlineCommentSpacing,
        DocRule::VariableExpansions,
        DocRule::NoTabs,
        DocRule::CurlProtocol,
        DocRule::BlockLineContinuations,
        DocRule::LongLinesWrapped,
        DocRule::ComposeFileFlag,
        DocRule::ShellSyntax,
    ];

    /// Stable snake_case name used in reports and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            DocRule::CodeBlocksPresent => "code_blocks_present",
            DocRule::RequiredSections => "required_sections",
            DocRule::ServicePorts => "service_ports",
            DocRule::Containers => "containers",
            DocRule::ScriptPaths => "script_paths",
            DocRule::DangerousCommandWarnings => "dangerous_command_warnings",
            DocRule::ProblemSectionsComplete => "problem_sections_complete",
            DocRule::HealthEndpoints => "health_endpoints",
            DocRule::EnvironmentVariables => "environment_variables",
            DocRule::DocumentLineContinuations => "document_line_continuations",
            DocRule::FencesBalanced => "fences_balanced",
            DocRule::ComposePathsConsistent => "compose_paths_consistent",
            DocRule::KnownTypos => "known_typos",
            DocRule::PlaceholderText => "placeholder_text",
            DocRule::InlineCommentSpacing => "inline_comment_spacing",
            DocRule::VariableExpansions => "variable_expansions",
            DocRule::NoTabs => "no_tabs",
            DocRule::CurlProtocol => "curl_protocol",
            DocRule::BlockLineContinuations => "block_line_continuations",
            DocRule::LongLinesWrapped => "long_lines_wrapped",
            DocRule::ComposeFileFlag => "compose_file_flag",
            DocRule::ShellSyntax => "shell_syntax",
        }
    }

    /// Whether the rule needs an external process.
    pub fn is_external(&self) -> bool {
        matches!(self, DocRule::ShellSyntax)
    }
}

impl fmt::Display for DocRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DocRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocRule::ALL
            .iter()
            .copied()
            .find(|rule| rule.name() == s)
            .ok_or_else(|| format!("unknown rule '{}'", s))
    }
}

/// An ordered set of rules to evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    pub rules: Vec<DocRule>,
}

impl RuleSet {
    /// Every rule, including the shell syntax check.
    pub fn standard() -> Self {
        Self {
            rules: DocRule::ALL.to_vec(),
        }
    }

    /// Every rule that runs in-process.
    pub fn text_only() -> Self {
        Self::standard().without(DocRule::ShellSyntax)
    }

    /// Drop a rule.
    pub fn without(mut self, rule: DocRule) -> Self {
        self.rules.retain(|r| *r != rule);
        self
    }

    /// Append a rule if absent.
    pub fn with_rule(mut self, rule: DocRule) -> Self {
        if !self.rules.contains(&rule) {
            self.rules.push(rule);
        }
        self
    }

    pub fn contains(&self, rule: DocRule) -> bool {
        self.rules.contains(&rule)
    }
}

/// Inputs shared by every rule in a run.
pub struct RuleContext<'a> {
    pub document: &'a Document,
    pub blocks: Vec<CodeBlock<'a>>,
    pub profile: &'a CheckProfile,
}

impl<'a> RuleContext<'a> {
    /// Extract blocks once for the whole run.
    pub fn new(document: &'a Document, profile: &'a CheckProfile) -> Self {
        Self {
            document,
            blocks: document.bash_blocks().collect(),
            profile,
        }
    }

    pub fn text(&self) -> &'a str {
        &self.document.text
    }
}

/// Evaluate an in-process rule.
///
/// Returns `None` for rules that need an external process; those are driven
/// by the engine.
pub fn evaluate_rule(rule: DocRule, ctx: &RuleContext<'_>) -> Option<RuleOutcome> {
    let violations = match rule {
        DocRule::CodeBlocksPresent => document::code_blocks_present(ctx),
        DocRule::RequiredSections => document::required_sections(ctx),
        DocRule::ServicePorts => document::service_ports(ctx),
        DocRule::Containers => document::containers(ctx),
        DocRule::ScriptPaths => document::script_paths(ctx),
        DocRule::DangerousCommandWarnings => document::dangerous_command_warnings(ctx),
        DocRule::ProblemSectionsComplete => document::problem_sections_complete(ctx),
        DocRule::HealthEndpoints => document::health_endpoints(ctx),
        DocRule::EnvironmentVariables => document::environment_variables(ctx),
        DocRule::DocumentLineContinuations => document::document_line_continuations(ctx),
        DocRule::FencesBalanced => document::fences_balanced(ctx),
        DocRule::ComposePathsConsistent => document::compose_paths_consistent(ctx),
        DocRule::KnownTypos => document::known_typos(ctx),
        DocRule::PlaceholderText => document::placeholder_text(ctx),
        DocRule::InlineCommentSpacing => blocks::inline_comment_spacing(ctx),
        DocRule::VariableExpansions => blocks::variable_expansions(ctx),
        DocRule::NoTabs => blocks::no_tabs(ctx),
        DocRule::CurlProtocol => blocks::curl_protocol(ctx),
        DocRule::BlockLineContinuations => blocks::block_line_continuations(ctx),
        DocRule::LongLinesWrapped => blocks::long_lines_wrapped(ctx),
        DocRule::ComposeFileFlag => blocks::compose_file_flag(ctx),
        DocRule::ShellSyntax => return None,
    };
    Some(RuleOutcome::from_violations(rule, violations))
}

/// Shorthand for rules that report a missing expected string.
fn require_all<'p>(
    text: &str,
    expected: impl IntoIterator<Item = &'p String>,
    describe: impl Fn(&str) -> String,
) -> Vec<Violation> {
    expected
        .into_iter()
        .filter(|item| !text.contains(item.as_str()))
        .map(|item| Violation::new(describe(item.as_str())).with_excerpt(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_names_roundtrip() {
        for rule in DocRule::ALL {
            assert_eq!(rule.name().parse::<DocRule>(), Ok(rule));
            let json = serde_json::to_value(rule).expect("json");
            assert_eq!(json, rule.name());
        }
    }

    #[test]
    fn test_unknown_rule_name() {
        let err = "no_such_rule".parse::<DocRule>().unwrap_err();
        assert!(err.contains("no_such_rule"));
    }

    #[test]
    fn test_rule_sets() {
        let standard = RuleSet::standard();
        assert_eq!(standard.rules.len(), DocRule::ALL.len());
        assert!(standard.contains(DocRule::ShellSyntax));

        let text_only = RuleSet::text_only();
        assert!(!text_only.contains(DocRule::ShellSyntax));
        assert!(text_only.rules.iter().all(|r| !r.is_external()));

        let restored = text_only.with_rule(DocRule::ShellSyntax).with_rule(DocRule::ShellSyntax);
        assert_eq!(restored.rules.len(), DocRule::ALL.len());
    }

    #[test]
    fn test_external_rule_not_evaluated_in_process() {
        let doc = Document::from_text("");
        let profile = CheckProfile::dsp();
        let ctx = RuleContext::new(&doc, &profile);
        assert!(evaluate_rule(DocRule::ShellSyntax, &ctx).is_none());
        assert!(evaluate_rule(DocRule::NoTabs, &ctx).is_some());
    }
}
