//! HTTP reachability and search round-trip probes.

use crate::config::join_url;
use crate::error::{ProbeError, Result};
use crate::probe::{Probe, ProbeResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

/// Build the shared client with a per-request timeout.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .map_err(ProbeError::from)
}

/// GETs an endpoint and passes on any status below 500.
pub struct HttpProbe {
    name: String,
    url: String,
    client: Client,
}

impl HttpProbe {
    pub fn new(service: &str, base_url: &str, path: &str, client: Client) -> Self {
        Self {
            name: format!("http:{}", service),
            url: join_url(base_url, path),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Probe for HttpProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> ProbeResult {
        let start = Instant::now();
        let result = self.client.get(&self.url).send().await;
        let elapsed = start.elapsed().as_millis() as u64;

        match result {
            Ok(resp) if resp.status().as_u16() < 500 => ProbeResult::pass(
                &self.name,
                format!("{} -> {}", self.url, resp.status()),
                elapsed,
            ),
            Ok(resp) => ProbeResult::fail(
                &self.name,
                format!("{} returned {}", self.url, resp.status()),
                elapsed,
            ),
            Err(e) if e.is_timeout() => {
                ProbeResult::fail(&self.name, format!("{} timed out", self.url), elapsed)
            }
            Err(e) => ProbeResult::fail(
                &self.name,
                format!("{} unreachable: {}", self.url, ProbeError::from(e)),
                elapsed,
            ),
        }
    }
}

/// Sends real queries to a `/search` endpoint and validates the payload shape.
///
/// Every query must answer 200 with `query`, `results` and `status` fields,
/// echo the query back, and return at least one result carrying `title`,
/// `content` and `source`.
pub struct SearchProbe {
    name: String,
    url: String,
    queries: Vec<String>,
    client: Client,
}

impl SearchProbe {
    pub fn new(service: &str, base_url: &str, queries: Vec<String>, client: Client) -> Self {
        Self {
            name: format!("search:{}", service),
            url: join_url(base_url, "/search"),
            queries,
            client,
        }
    }

    async fn query(&self, query: &str) -> Result<usize> {
        let resp = self
            .client
            .get(&self.url)
            .query(&[("query", query)])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ProbeError::Http(format!(
                "search for '{}' returned {}",
                query,
                resp.status()
            )));
        }

        let body: Value = resp.json().await?;
        check_search_payload(query, &body)
    }
}

/// Validate one search response, returning the number of results.
pub fn check_search_payload(query: &str, body: &Value) -> Result<usize> {
    for field in ["query", "results", "status"] {
        if body.get(field).is_none() {
            return Err(ProbeError::UnexpectedPayload(format!(
                "missing '{}' field in response for '{}'",
                field, query
            )));
        }
    }

    let echoed = body["query"].as_str().unwrap_or_default();
    if echoed != query {
        return Err(ProbeError::UnexpectedPayload(format!(
            "query mismatch: expected '{}', got '{}'",
            query, echoed
        )));
    }

    let results = body["results"]
        .as_array()
        .filter(|r| !r.is_empty())
        .ok_or_else(|| {
            ProbeError::UnexpectedPayload(format!("no results returned for '{}'", query))
        })?;

    for field in ["title", "content", "source"] {
        if results[0].get(field).is_none() {
            return Err(ProbeError::UnexpectedPayload(format!(
                "missing '{}' in first result for '{}'",
                field, query
            )));
        }
    }

    Ok(results.len())
}

#[async_trait]
impl Probe for SearchProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> ProbeResult {
        let start = Instant::now();
        let mut total = 0;

        for query in &self.queries {
            match self.query(query).await {
                Ok(count) => {
                    debug!(probe = %self.name, query = %query, results = count, "Search query ok");
                    total += count;
                }
                Err(e) => {
                    return ProbeResult::fail(
                        &self.name,
                        e.to_string(),
                        start.elapsed().as_millis() as u64,
                    )
                }
            }
        }

        ProbeResult::pass(
            &self.name,
            format!("{} queries, {} results", self.queries.len(), total),
            start.elapsed().as_millis() as u64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_payload_valid() {
        let body = json!({
            "query": "Critical Photons",
            "status": "success",
            "results": [
                {"title": "Critical Photons", "content": "Produced by ray receivers", "source": "wiki"}
            ]
        });
        assert_eq!(check_search_payload("Critical Photons", &body).unwrap(), 1);
    }

    #[test]
    fn test_search_payload_missing_field() {
        let body = json!({"query": "Critical Photons", "results": []});
        let err = check_search_payload("Critical Photons", &body).unwrap_err();
        assert!(err.to_string().contains("'status'"));
    }

    #[test]
    fn test_search_payload_query_mismatch() {
        let body = json!({"query": "other", "status": "success", "results": [{}]});
        let err = check_search_payload("Critical Photons", &body).unwrap_err();
        assert!(err.to_string().contains("query mismatch"));
    }

    #[test]
    fn test_search_payload_empty_results() {
        let body = json!({"query": "q", "status": "success", "results": []});
        let err = check_search_payload("q", &body).unwrap_err();
        assert!(err.to_string().contains("no results"));
    }

    #[test]
    fn test_search_payload_incomplete_result() {
        let body = json!({"query": "q", "status": "success", "results": [{"title": "t", "content": "c"}]});
        let err = check_search_payload("q", &body).unwrap_err();
        assert!(err.to_string().contains("'source'"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails() {
        let client = build_client(2).unwrap();
        let probe = HttpProbe::new("rag", "http://127.0.0.1:9", "/health", client);
        assert_eq!(probe.url(), "http://127.0.0.1:9/health");

        let result = probe.run().await;
        assert!(!result.passed);
        assert_eq!(result.name, "http:rag");
    }
}
