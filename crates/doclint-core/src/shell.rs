//! Shell syntax validation of extracted blocks.
//!
//! Each block is written to its own temporary `.sh` file behind a strict-mode
//! prelude and handed to the interpreter's parse-only mode (`bash -n`). Nothing
//! is executed. The temporary file is removed when the check returns,
//! whatever the outcome.

use crate::error::{DocLintError, Result};
use crate::extract::CodeBlock;
use crate::profile::ShellSettings;
use crate::report::Violation;
use std::io::Write;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, warn};

/// Result of checking one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxCheck {
    /// Index of the block in the document.
    pub block_index: usize,

    /// Interpreter exit code (-1 when killed by a signal).
    pub exit_code: i32,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,

    /// Non-zero exit, but stderr matched a tolerated phrase.
    pub tolerated: bool,
}

impl SyntaxCheck {
    /// Whether this block is acceptable.
    pub fn passed(&self) -> bool {
        self.exit_code == 0 || self.tolerated
    }
}

/// Runs the interpreter's syntax-check mode over blocks.
#[derive(Debug, Clone)]
pub struct ShellSyntaxValidator {
    settings: ShellSettings,
}

impl ShellSyntaxValidator {
    pub fn new(settings: ShellSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ShellSettings {
        &self.settings
    }

    /// Check a single block.
    pub async fn check_block(&self, block: &CodeBlock<'_>) -> Result<SyntaxCheck> {
        let start = Instant::now();

        let mut script = tempfile::Builder::new()
            .prefix("doclint-block-")
            .suffix(".sh")
            .tempfile()?;
        script.write_all(self.settings.prelude.as_bytes())?;
        script.write_all(block.text.as_bytes())?;
        script.write_all(b"\n")?;
        script.flush()?;

        let child = Command::new(&self.settings.program)
            .args(&self.settings.args)
            .arg(script.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DocLintError::ShellSpawn {
                program: self.settings.program.clone(),
                source,
            })?;

        let output = if self.settings.timeout_secs > 0 {
            tokio::time::timeout(
                std::time::Duration::from_secs(self.settings.timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| DocLintError::ShellTimeout(self.settings.timeout_secs))??
        } else {
            child.wait_with_output().await?
        };

        // `script` is dropped after the interpreter has exited, which deletes it.
        drop(script);

        let exit_code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let tolerated = exit_code != 0 && self.is_tolerated(&stderr);

        if tolerated {
            warn!(block = block.index, "Tolerating missing-tool error from shell: {}", stderr.trim());
        }
        debug!(block = block.index, exit_code, "Shell syntax check finished");

        Ok(SyntaxCheck {
            block_index: block.index,
            exit_code,
            stderr,
            duration_ms: start.elapsed().as_millis() as u64,
            tolerated,
        })
    }

    /// Check every block and turn failures into violations.
    ///
    /// A block whose check could not run (spawn failure, timeout) is reported
    /// as a violation rather than aborting the remaining blocks.
    pub async fn validate_blocks(&self, blocks: &[CodeBlock<'_>]) -> Vec<Violation> {
        let mut violations = Vec::new();

        for block in blocks {
            match self.check_block(block).await {
                Ok(check) if check.passed() => {}
                Ok(check) => violations.push(
                    Violation::new(format!(
                        "Bash syntax error in block #{}:\n{}",
                        block.index,
                        check.stderr.trim()
                    ))
                    .at_line(block.line)
                    .with_excerpt(block.text),
                ),
                Err(e) => {
                    warn!(block = block.index, error = %e, "Shell syntax check could not run");
                    violations.push(
                        Violation::new(format!(
                            "Bash syntax check for block #{} could not run: {}",
                            block.index, e
                        ))
                        .at_line(block.line),
                    );
                }
            }
        }

        violations
    }

    fn is_tolerated(&self, stderr: &str) -> bool {
        self.settings
            .tolerated_errors
            .iter()
            .any(|phrase| stderr.contains(phrase.as_str()))
    }
}

impl Default for ShellSyntaxValidator {
    fn default() -> Self {
        Self::new(ShellSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(text: &str) -> CodeBlock<'_> {
        CodeBlock {
            index: 0,
            line: 1,
            text,
        }
    }

    #[test]
    fn test_syntax_check_passed() {
        let check = SyntaxCheck {
            block_index: 0,
            exit_code: 0,
            stderr: String::new(),
            duration_ms: 3,
            tolerated: false,
        };
        assert!(check.passed());

        let failed = SyntaxCheck {
            exit_code: 2,
            stderr: "syntax error near unexpected token".to_string(),
            ..check.clone()
        };
        assert!(!failed.passed());

        let tolerated = SyntaxCheck {
            exit_code: 127,
            stderr: "docker: command not found".to_string(),
            tolerated: true,
            ..check
        };
        assert!(tolerated.passed());
    }

    #[test]
    fn test_tolerated_phrases() {
        let validator = ShellSyntaxValidator::default();
        assert!(validator.is_tolerated("line 3: docker-compose: not found"));
        assert!(validator.is_tolerated("bash: curl: command not found"));
        assert!(!validator.is_tolerated("syntax error: unexpected end of file"));
    }

    #[tokio::test]
    async fn test_valid_block_passes() {
        let validator = ShellSyntaxValidator::default();
        let check = validator
            .check_block(&block("docker ps --filter \"name=dsp\"\nif true; then echo ok; fi"))
            .await
            .expect("check failed");
        assert_eq!(check.exit_code, 0);
        assert!(check.passed());
    }

    #[tokio::test]
    async fn test_unterminated_if_fails() {
        let validator = ShellSyntaxValidator::default();
        let check = validator
            .check_block(&block("if true; then\n  echo ok"))
            .await
            .expect("check failed");
        assert_ne!(check.exit_code, 0);
        assert!(!check.passed());
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_spawn_error() {
        let validator = ShellSyntaxValidator::new(ShellSettings {
            program: "doclint-no-such-shell".to_string(),
            ..ShellSettings::default()
        });
        let err = validator.check_block(&block("echo hi")).await.unwrap_err();
        assert!(matches!(err, DocLintError::ShellSpawn { .. }));

        let violations = validator.validate_blocks(&[block("echo hi")]).await;
        assert_eq!(violations.len(), 1);
        assert!(violations[0].reason.contains("could not run"));
    }
}
