//! Probe targets for the DSP deployment.

use crate::error::{ProbeError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the documented services live and how long to wait for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Agent UI base URL
    pub agent_url: String,
    /// MCP RAG bridge base URL
    pub rag_url: String,
    /// MCP search bridge base URL
    pub search_url: String,
    /// Qdrant base URL
    pub qdrant_url: String,
    /// Containers that must be running
    pub containers: Vec<String>,
    /// Claudable client config declaring the MCP server URLs
    pub client_config: PathBuf,
    /// Compose file validated with `config`
    pub compose_file: PathBuf,
    /// Docker CLI executable
    pub docker_program: String,
    /// Compose CLI executable
    pub compose_program: String,
    /// Queries sent to the RAG bridge in end-to-end mode
    pub rag_queries: Vec<String>,
    /// Queries sent to the search bridge in end-to-end mode
    pub search_queries: Vec<String>,
    /// Per-probe timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::dsp()
    }
}

impl ProbeConfig {
    /// Local DSP deployment defaults.
    pub fn dsp() -> Self {
        ProbeConfig {
            agent_url: "http://localhost:3001".to_string(),
            rag_url: "http://localhost:3002".to_string(),
            search_url: "http://localhost:3004".to_string(),
            qdrant_url: "http://localhost:6333".to_string(),
            containers: vec![
                "dsp-mcp-ragdocs".to_string(),
                "dsp-mcp-search".to_string(),
                "dsp-qdrant".to_string(),
            ],
            client_config: PathBuf::from("claudable/config.json"),
            compose_file: PathBuf::from("docker/docker-compose.yml"),
            docker_program: "docker".to_string(),
            compose_program: "docker-compose".to_string(),
            rag_queries: vec![
                "Critical Photons".to_string(),
                "Dyson Sphere construction".to_string(),
                "Antimatter production".to_string(),
                "Space Warper technology".to_string(),
            ],
            search_queries: vec![
                "Dyson sphere physics".to_string(),
                "antimatter propulsion physics".to_string(),
                "stellar engineering physics".to_string(),
                "megastructure orbital mechanics".to_string(),
            ],
            timeout_secs: 5,
        }
    }

    /// DSP defaults with base URLs overridden from the environment
    /// (`DOCLINT_AGENT_URL`, `DOCLINT_RAG_URL`, `DOCLINT_SEARCH_URL`,
    /// `DOCLINT_QDRANT_URL`).
    pub fn from_env() -> Self {
        let mut config = Self::dsp();
        if let Ok(url) = std::env::var("DOCLINT_AGENT_URL") {
            config.agent_url = url;
        }
        if let Ok(url) = std::env::var("DOCLINT_RAG_URL") {
            config.rag_url = url;
        }
        if let Ok(url) = std::env::var("DOCLINT_SEARCH_URL") {
            config.search_url = url;
        }
        if let Ok(url) = std::env::var("DOCLINT_QDRANT_URL") {
            config.qdrant_url = url;
        }
        config
    }

    /// Resolve relative file paths against a project root.
    pub fn rooted_at(mut self, root: &std::path::Path) -> Self {
        if self.client_config.is_relative() {
            self.client_config = root.join(&self.client_config);
        }
        if self.compose_file.is_relative() {
            self.compose_file = root.join(&self.compose_file);
        }
        self
    }

    /// Reject configurations no probe could use.
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("agent", &self.agent_url),
            ("rag", &self.rag_url),
            ("search", &self.search_url),
            ("qdrant", &self.qdrant_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ProbeError::InvalidConfig(format!(
                    "{} URL must be http(s): '{}'",
                    name, url
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ProbeError::InvalidConfig("timeout must be positive".into()));
        }
        Ok(())
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Join a base URL and a path without doubling slashes.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
