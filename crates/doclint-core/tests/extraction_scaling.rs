//! Extraction over large, repetitive documents.

use doclint_core::extract::{bash_blocks, docker_commands, localhost_urls};
use doclint_core::{CheckProfile, DocLinter, Document, RuleSet};
use std::time::{Duration, Instant};

const REPLICATION_FACTOR: usize = 120;

const BASE_SNIPPET: &str = r#"
## Quick Diagnosis

### System Health Check
```bash
# One-command system validation
./docker/validate-infrastructure.sh

# Quick status check
docker ps --filter "name=dsp" --format "table {{.Names}}\t{{.Status}}\t{{.Ports}}"
```

curl http://localhost:3001/health
curl http://localhost:3002/health
curl http://localhost:3004/health
curl http://localhost:6333/
"#;

/// Test: extraction finds every replicated block and URL within budget
#[test]
fn test_extraction_over_replicated_snippet() {
    let large = BASE_SNIPPET.repeat(REPLICATION_FACTOR);

    let start = Instant::now();
    let blocks: Vec<_> = bash_blocks(&large).collect();
    let urls = localhost_urls(&large).count();
    let docker = docker_commands(&large).count();
    let elapsed = start.elapsed();

    assert_eq!(blocks.len(), REPLICATION_FACTOR);
    assert_eq!(urls, 4 * REPLICATION_FACTOR);
    assert_eq!(docker, REPLICATION_FACTOR);
    assert!(
        elapsed < Duration::from_secs(2),
        "extraction exceeded time budget: {:?}",
        elapsed
    );
}

/// Test: comment filtering keeps only commands
#[test]
fn test_block_processing_strips_comments() {
    let large = BASE_SNIPPET.repeat(REPLICATION_FACTOR);

    let processed: Vec<String> = bash_blocks(&large)
        .map(|b| b.code_lines().collect::<Vec<_>>().join("\n"))
        .collect();

    assert_eq!(processed.len(), REPLICATION_FACTOR);
    assert!(processed.iter().all(|p| !p.contains("# ")));
    assert!(processed[0].starts_with("./docker/validate-infrastructure.sh"));
}

/// Test: a full text lint of a large document stays within budget
#[tokio::test]
async fn test_text_lint_budget_grows_with_size() {
    let linter = DocLinter::new(CheckProfile::dsp(), RuleSet::text_only());

    for factor in [10usize, 100, 500] {
        let doc = Document::from_text(BASE_SNIPPET.repeat(factor));
        let start = Instant::now();
        let report = linter.lint_document(&doc).await;
        let elapsed = start.elapsed();

        assert_eq!(report.outcomes.len(), RuleSet::text_only().rules.len());
        assert!(
            elapsed < Duration::from_millis(20 * factor as u64 + 500),
            "lint of {}x snippet took {:?}",
            factor,
            elapsed
        );
    }
}
