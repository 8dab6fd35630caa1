//! doclint core library
//!
//! Consistency checks for the DSP troubleshooting runbook:
//! - Extracts fenced bash blocks and inline patterns from the markdown
//! - Evaluates independent structural rules against a [`CheckProfile`]
//! - Validates block syntax with the shell's parse-only mode

pub mod document;
pub mod engine;
pub mod error;
pub mod extract;
pub mod profile;
pub mod report;
pub mod rules;
pub mod shell;
pub mod telemetry;

// Re-export key types
pub use document::{Document, ProblemSection, DEFAULT_DOC_PATH};
pub use engine::DocLinter;
pub use error::{DocLintError, Result};
pub use extract::{bash_blocks, CodeBlock};
pub use profile::{CheckProfile, ServicePort, ShellSettings};
pub use report::{LintReport, LintStatus, RuleOutcome, Violation};
pub use rules::{evaluate_rule, DocRule, RuleContext, RuleSet};
pub use shell::{ShellSyntaxValidator, SyntaxCheck};
pub use telemetry::init_tracing;
