//! Probe trait and result type.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of a single probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Probe name, e.g. `http:rag`.
    pub name: String,

    /// Whether the target looked healthy.
    pub passed: bool,

    /// What was observed, or why it failed.
    pub detail: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl ProbeResult {
    pub fn pass(name: &str, detail: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            detail: detail.into(),
            duration_ms,
        }
    }

    pub fn fail(name: &str, detail: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            detail: detail.into(),
            duration_ms,
        }
    }
}

/// A black-box check against running infrastructure.
///
/// Probes never return errors: an unreachable or misbehaving target is a
/// failed [`ProbeResult`].
#[async_trait]
pub trait Probe: Send + Sync {
    /// Stable name used in reports.
    fn name(&self) -> &str;

    /// Run the probe once.
    async fn run(&self) -> ProbeResult;
}
