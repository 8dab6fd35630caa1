//! Error taxonomy for doclint.
//!
//! Rule violations are never errors; they are reported as
//! [`Violation`](crate::report::Violation) data. These variants cover the
//! operational failures around a run: loading inputs and driving the shell.

use std::path::PathBuf;

/// Errors produced while loading documents, profiles or running the shell.
#[derive(Debug, thiserror::Error)]
pub enum DocLintError {
    #[error("document not found: {0}")]
    DocumentNotFound(PathBuf),

    #[error("invalid check profile: {0}")]
    InvalidProfile(String),

    #[error("failed to spawn shell '{program}': {source}")]
    ShellSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("shell syntax check timed out after {0} seconds")]
    ShellTimeout(u64),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("toml serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for doclint operations.
pub type Result<T> = std::result::Result<T, DocLintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DocLintError::DocumentNotFound(PathBuf::from("docs/troubleshooting.md"));
        assert!(err.to_string().contains("document not found"));
        assert!(err.to_string().contains("troubleshooting.md"));

        let err = DocLintError::InvalidProfile("max_line_width must be positive".to_string());
        assert!(err.to_string().contains("invalid check profile"));

        let err = DocLintError::ShellTimeout(10);
        assert!(err.to_string().contains("10 seconds"));
    }

    #[test]
    fn test_shell_spawn_keeps_source() {
        let err = DocLintError::ShellSpawn {
            program: "bash".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("'bash'"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
