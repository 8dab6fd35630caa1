//! Check profile: the expected strings and limits every rule compares against.
//!
//! [`CheckProfile::dsp`] describes the DSP troubleshooting runbook. A TOML file
//! can override any subset of fields; omitted fields keep the DSP values.

use crate::error::{DocLintError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A documented service port and the comment label that must accompany it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePort {
    pub port: u16,
    pub service: String,
}

impl ServicePort {
    pub fn new(port: u16, service: &str) -> Self {
        Self {
            port,
            service: service.to_string(),
        }
    }
}

/// Shell interpreter settings for the syntax check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSettings {
    /// Interpreter executable.
    pub program: String,

    /// Arguments placed before the script path (`-n` parses without running).
    pub args: Vec<String>,

    /// Text written ahead of each block.
    pub prelude: String,

    /// Stderr phrases that mean "missing tool", not "bad syntax".
    pub tolerated_errors: Vec<String>,

    /// Per-block timeout in seconds; 0 disables it.
    pub timeout_secs: u64,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            program: "bash".to_string(),
            args: vec!["-n".to_string()],
            prelude: "#!/usr/bin/env bash\nset -e\n".to_string(),
            tolerated_errors: strings(&[
                "command not found",
                "No such file or directory",
                "docker-compose: not found",
                "docker: not found",
                "curl: not found",
            ]),
            timeout_secs: 10,
        }
    }
}

/// Expected content of the runbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckProfile {
    pub required_sections: Vec<String>,
    pub service_ports: Vec<ServicePort>,
    pub containers: Vec<String>,
    pub script_paths: Vec<String>,
    pub health_endpoints: Vec<String>,
    pub environment_variables: Vec<String>,

    pub dangerous_commands: Vec<String>,
    pub caution_markers: Vec<String>,
    /// Characters inspected on each side of a dangerous command.
    pub caution_window: usize,

    pub placeholder_markers: Vec<String>,
    pub known_typos: Vec<String>,

    /// The single compose file every invocation must pin.
    pub compose_file: String,
    /// Directory compose paths must be rooted in.
    pub compose_root: String,

    pub min_code_blocks: usize,
    pub max_line_width: usize,

    pub problem_marker: String,
    pub diagnosis_marker: String,
    pub solutions_marker: String,

    pub shell: ShellSettings,
}

impl Default for CheckProfile {
    fn default() -> Self {
        Self::dsp()
    }
}

impl CheckProfile {
    /// Profile for the DSP deployment runbook.
    pub fn dsp() -> Self {
        Self {
            required_sections: strings(&[
                "Docker Container Issues",
                "Network & Port Issues",
                "API Key & Authentication Issues",
                "Performance Troubleshooting",
                "Emergency Recovery",
                "Monitoring & Maintenance",
            ]),
            service_ports: vec![
                ServicePort::new(3001, "Agent"),
                ServicePort::new(3002, "RAG"),
                ServicePort::new(3004, "Search"),
                ServicePort::new(6333, "Qdrant"),
            ],
            containers: strings(&["dsp-qdrant", "dsp-mcp-ragdocs", "dsp-mcp-search"]),
            script_paths: strings(&[
                "./restart.sh",
                "./start.sh",
                "./docker/validate-infrastructure.sh",
            ]),
            health_endpoints: strings(&[
                "http://localhost:3001/health",
                "http://localhost:3002/health",
                "http://localhost:3004/health",
                "http://localhost:6333/",
            ]),
            environment_variables: strings(&["OPENAI_API_KEY", "BRAVE_API_KEY"]),
            dangerous_commands: strings(&[
                "rm -rf docker/qdrant_storage/*",
                "docker system prune -f",
                "docker-compose -f docker/docker-compose.yml down --volumes",
            ]),
            caution_markers: strings(&["CAUTION", "WARNING", "NUCLEAR OPTION", "DELETES"]),
            caution_window: 300,
            placeholder_markers: strings(&["TODO", "FIXME", "TBD"]),
            known_typos: strings(&["Ofne-command"]),
            compose_file: "docker/docker-compose.yml".to_string(),
            compose_root: "docker/".to_string(),
            min_code_blocks: 20,
            max_line_width: 120,
            problem_marker: crate::document::PROBLEM_MARKER.to_string(),
            diagnosis_marker: "# Diagnosis".to_string(),
            solutions_marker: "# Solutions".to_string(),
            shell: ShellSettings::default(),
        }
    }

    /// Parse a profile from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let profile: Self = toml::from_str(text)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load a profile from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values that would make rules meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.max_line_width == 0 {
            return Err(DocLintError::InvalidProfile(
                "max_line_width must be positive".to_string(),
            ));
        }
        if self.problem_marker.trim().is_empty() {
            return Err(DocLintError::InvalidProfile(
                "problem_marker must not be empty".to_string(),
            ));
        }
        if self.shell.program.trim().is_empty() {
            return Err(DocLintError::InvalidProfile(
                "shell.program must not be empty".to_string(),
            ));
        }
        if !self.compose_file.is_empty() && !self.compose_file.starts_with(&self.compose_root) {
            return Err(DocLintError::InvalidProfile(format!(
                "compose_file '{}' is not under compose_root '{}'",
                self.compose_file, self.compose_root
            )));
        }
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dsp_profile_values() {
        let profile = CheckProfile::dsp();
        assert_eq!(profile.required_sections.len(), 6);
        assert_eq!(profile.service_ports[1], ServicePort::new(3002, "RAG"));
        assert_eq!(profile.max_line_width, 120);
        assert_eq!(profile.min_code_blocks, 20);
        assert_eq!(profile.caution_window, 300);
        assert_eq!(profile.shell.args, vec!["-n".to_string()]);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let profile = CheckProfile::from_toml_str(
            r#"
            min_code_blocks = 3
            containers = ["dsp-qdrant"]

            [shell]
            timeout_secs = 2
            "#,
        )
        .expect("parse");

        assert_eq!(profile.min_code_blocks, 3);
        assert_eq!(profile.containers, vec!["dsp-qdrant".to_string()]);
        assert_eq!(profile.shell.timeout_secs, 2);
        assert_eq!(profile.shell.program, "bash");
        assert_eq!(profile.max_line_width, 120);
        assert_eq!(profile.required_sections, CheckProfile::dsp().required_sections);
    }

    #[test]
    fn test_toml_roundtrip_of_dsp_profile() {
        let text = CheckProfile::dsp().to_toml_string().expect("serialize");
        let parsed = CheckProfile::from_toml_str(&text).expect("parse");
        assert_eq!(parsed, CheckProfile::dsp());
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let err = CheckProfile::from_toml_str("max_line_width = 0").unwrap_err();
        assert!(matches!(err, DocLintError::InvalidProfile(_)));

        let err = CheckProfile::from_toml_str("compose_file = \"ops/docker-compose.yml\"")
            .unwrap_err();
        assert!(err.to_string().contains("compose_root"));
    }

    #[test]
    fn test_malformed_toml_is_error() {
        let err = CheckProfile::from_toml_str("min_code_blocks = \"many\"").unwrap_err();
        assert!(matches!(err, DocLintError::Toml(_)));
    }
}
