//! Claudable client config check.

use crate::error::{ProbeError, Result};
use crate::probe::{Probe, ProbeResult};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Instant;

/// Verifies that the client config points `mcp_servers.rag` and
/// `mcp_servers.search` at the documented URLs.
pub struct ClientConfigProbe {
    path: PathBuf,
    expected: Vec<(String, String)>,
}

impl ClientConfigProbe {
    pub fn new(path: PathBuf, rag_url: &str, search_url: &str) -> Self {
        Self {
            path,
            expected: vec![
                ("rag".to_string(), rag_url.to_string()),
                ("search".to_string(), search_url.to_string()),
            ],
        }
    }

    async fn check(&self) -> Result<()> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let config: Value = serde_json::from_str(&raw)?;

        let servers = config
            .get("mcp_servers")
            .and_then(Value::as_object)
            .ok_or_else(|| ProbeError::UnexpectedPayload("missing mcp_servers in config".into()))?;

        for (server, url) in &self.expected {
            match servers.get(server).and_then(Value::as_str) {
                Some(actual) if actual == url => {}
                Some(actual) => {
                    return Err(ProbeError::UnexpectedPayload(format!(
                        "wrong {} URL: expected {}, got {}",
                        server, url, actual
                    )))
                }
                None => {
                    return Err(ProbeError::UnexpectedPayload(format!(
                        "missing {} server config",
                        server
                    )))
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Probe for ClientConfigProbe {
    fn name(&self) -> &str {
        "config:claudable"
    }

    async fn run(&self) -> ProbeResult {
        let start = Instant::now();
        if !self.path.exists() {
            return ProbeResult::fail(
                self.name(),
                format!("client config not found at {}", self.path.display()),
                0,
            );
        }

        let result = self.check().await;
        let elapsed = start.elapsed().as_millis() as u64;
        match result {
            Ok(()) => ProbeResult::pass(self.name(), "client config valid", elapsed),
            Err(e) => ProbeResult::fail(self.name(), e.to_string(), elapsed),
        }
    }
}
