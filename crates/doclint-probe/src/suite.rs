//! Probe suite assembly and aggregate report.

use crate::client_config::ClientConfigProbe;
use crate::command::{ComposeConfigProbe, ContainerProbe};
use crate::config::ProbeConfig;
use crate::error::Result;
use crate::http::{build_client, HttpProbe, SearchProbe};
use crate::probe::{Probe, ProbeResult};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

/// Aggregate of one suite run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeReport {
    /// Whether every probe passed.
    pub passed: bool,

    /// Results in declaration order.
    pub results: Vec<ProbeResult>,

    /// Wall-clock duration of the whole suite in milliseconds.
    pub duration_ms: u64,
}

impl ProbeReport {
    pub fn from_results(results: Vec<ProbeResult>, duration_ms: u64) -> Self {
        Self {
            passed: results.iter().all(|r| r.passed),
            results,
            duration_ms,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    /// Human-readable summary, one line per probe.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for result in &self.results {
            let mark = if result.passed { "ok  " } else { "FAIL" };
            out.push_str(&format!("{} {}: {}\n", mark, result.name, result.detail));
        }
        let failed = self.failures().count();
        out.push_str(&format!(
            "\n{} probes, {} passed, {} failed ({} ms)\n",
            self.results.len(),
            self.results.len() - failed,
            failed,
            self.duration_ms
        ));
        out
    }
}

/// A set of probes run concurrently.
pub struct ProbeSuite {
    probes: Vec<Box<dyn Probe>>,
}

impl ProbeSuite {
    pub fn new() -> Self {
        Self { probes: Vec::new() }
    }

    pub fn with_probe(mut self, probe: impl Probe + 'static) -> Self {
        self.probes.push(Box::new(probe));
        self
    }

    /// Standard suite for a deployment: health endpoints, containers,
    /// client config and compose file. `e2e` adds real search round-trips.
    pub fn from_config(config: &ProbeConfig, e2e: bool) -> Result<Self> {
        config.validate()?;
        let client = build_client(config.timeout_secs)?;

        let mut suite = Self::new()
            .with_probe(HttpProbe::new("agent", &config.agent_url, "/", client.clone()))
            .with_probe(HttpProbe::new("rag", &config.rag_url, "/health", client.clone()))
            .with_probe(HttpProbe::new("search", &config.search_url, "/health", client.clone()))
            .with_probe(HttpProbe::new("qdrant", &config.qdrant_url, "/", client.clone()));

        for container in &config.containers {
            suite = suite.with_probe(ContainerProbe::new(
                container,
                &config.docker_program,
                config.timeout_secs,
            ));
        }

        suite = suite
            .with_probe(ClientConfigProbe::new(
                config.client_config.clone(),
                &config.rag_url,
                &config.search_url,
            ))
            .with_probe(ComposeConfigProbe::new(
                config.compose_file.clone(),
                &config.compose_program,
                config.timeout_secs,
            ));

        if e2e {
            suite = suite
                .with_probe(SearchProbe::new(
                    "rag",
                    &config.rag_url,
                    config.rag_queries.clone(),
                    client.clone(),
                ))
                .with_probe(SearchProbe::new(
                    "search",
                    &config.search_url,
                    config.search_queries.clone(),
                    client,
                ));
        }

        Ok(suite)
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.probes.iter().map(|p| p.name()).collect()
    }

    /// Run all probes concurrently.
    pub async fn run(&self) -> ProbeReport {
        let start = Instant::now();
        info!(probes = self.probes.len(), "Starting probe suite");

        let results = join_all(self.probes.iter().map(|p| p.run())).await;
        for result in results.iter().filter(|r| !r.passed) {
            warn!(probe = %result.name, "Probe failed: {}", result.detail);
        }

        let report = ProbeReport::from_results(results, start.elapsed().as_millis() as u64);
        info!(
            passed = report.passed,
            failed = report.failures().count(),
            "Probe suite finished"
        );
        report
    }
}

impl Default for ProbeSuite {
    fn default() -> Self {
        Self::new()
    }
}
