//! doclint - consistency checker for the DSP troubleshooting runbook
//!
//! ## Commands
//!
//! - `check`: Lint the runbook (structure, references, shell syntax)
//! - `blocks`: List the extracted bash blocks
//! - `profile`: Print the effective check profile as TOML
//! - `probe`: Probe the services the runbook documents
//!
//! Exit codes: 0 passed or skipped, 1 failed, 2 error.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use doclint_core::extract::{docker_commands, localhost_urls};
use doclint_core::{
    CheckProfile, CodeBlock, DocLinter, DocRule, Document, LintStatus, RuleSet, DEFAULT_DOC_PATH,
};
use doclint_probe::{ProbeConfig, ProbeSuite};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "doclint")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Consistency checker for the DSP troubleshooting runbook", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint the runbook
    Check {
        /// Runbook to check
        #[arg(short, long, env = "DOCLINT_DOC", default_value = DEFAULT_DOC_PATH)]
        doc: PathBuf,

        /// TOML profile overriding the built-in DSP profile
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Skip the shell syntax check
        #[arg(long)]
        no_shell: bool,

        /// Rule to skip (repeatable)
        #[arg(long = "skip", value_name = "RULE")]
        skip: Vec<DocRule>,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List the bash blocks extracted from the runbook
    Blocks {
        /// Runbook to read
        #[arg(short, long, env = "DOCLINT_DOC", default_value = DEFAULT_DOC_PATH)]
        doc: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the effective check profile as TOML
    Profile {
        /// TOML profile to merge over the defaults
        #[arg(short, long)]
        profile: Option<PathBuf>,
    },

    /// Probe the services the runbook documents
    Probe {
        /// Project root for the client config and compose file
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Also run real search queries against the bridges
        #[arg(long)]
        e2e: bool,

        /// Per-probe timeout in seconds
        #[arg(long, default_value = "5")]
        timeout: u64,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    doclint_core::init_tracing(cli.json_logs, level);

    match run(cli.command).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns whether the command succeeded.
async fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::Check {
            doc,
            profile,
            no_shell,
            skip,
            format,
        } => {
            let status = cmd_check(&doc, profile.as_deref(), no_shell, &skip, format).await?;
            Ok(status != LintStatus::Failed)
        }
        Commands::Blocks { doc, format } => cmd_blocks(&doc, format).map(|_| true),
        Commands::Profile { profile } => cmd_profile(profile.as_deref()).map(|_| true),
        Commands::Probe {
            root,
            e2e,
            timeout,
            format,
        } => cmd_probe(&root, e2e, timeout, format).await,
    }
}

/// `from_toml_file` validates; the built-in profile is always valid.
fn load_profile(path: Option<&Path>) -> Result<CheckProfile> {
    match path {
        Some(path) => CheckProfile::from_toml_file(path)
            .with_context(|| format!("Failed to load profile {}", path.display())),
        None => Ok(CheckProfile::dsp()),
    }
}

fn rule_set(no_shell: bool, skip: &[DocRule]) -> RuleSet {
    let base = if no_shell {
        RuleSet::text_only()
    } else {
        RuleSet::standard()
    };
    skip.iter().fold(base, |rules, rule| rules.without(*rule))
}

async fn cmd_check(
    doc: &Path,
    profile: Option<&Path>,
    no_shell: bool,
    skip: &[DocRule],
    format: OutputFormat,
) -> Result<LintStatus> {
    let linter = DocLinter::new(load_profile(profile)?, rule_set(no_shell, skip));
    debug!(rules = linter.rules().rules.len(), "Rule set prepared");

    let report = linter
        .lint_path(doc)
        .await
        .with_context(|| format!("Failed to lint {}", doc.display()))?;

    match format {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(report.status)
}

fn cmd_blocks(doc: &Path, format: OutputFormat) -> Result<()> {
    let document =
        Document::load(doc).with_context(|| format!("Failed to read {}", doc.display()))?;

    match format {
        OutputFormat::Text => {
            for block in document.bash_blocks() {
                let docker = docker_subcommands(&block);
                if docker.is_empty() {
                    println!("#{} (line {})", block.index, block.line);
                } else {
                    println!("#{} (line {}) docker: {}", block.index, block.line, docker.join(", "));
                }
                for line in block.lines() {
                    println!("    {}", line);
                }
                println!();
            }
        }
        OutputFormat::Json => {
            let blocks: Vec<_> = document.bash_blocks().map(|b| block_json(&b)).collect();
            println!("{}", serde_json::to_string_pretty(&blocks)?);
        }
    }
    Ok(())
}

/// Docker subcommands a block invokes, in order, without repeats.
fn docker_subcommands(block: &CodeBlock<'_>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for command in docker_commands(block.text) {
        if let Some(sub) = command.split_whitespace().nth(1) {
            if !seen.iter().any(|s| s == sub) {
                seen.push(sub.to_string());
            }
        }
    }
    seen
}

fn block_json(block: &CodeBlock<'_>) -> serde_json::Value {
    serde_json::json!({
        "index": block.index,
        "line": block.line,
        "text": block.text,
        "docker": docker_subcommands(block),
        "urls": localhost_urls(block.text).collect::<Vec<_>>(),
    })
}

fn cmd_profile(profile: Option<&Path>) -> Result<()> {
    let profile = load_profile(profile)?;
    print!("{}", profile.to_toml_string()?);
    Ok(())
}

/// Returns whether every probe passed.
async fn cmd_probe(root: &Path, e2e: bool, timeout: u64, format: OutputFormat) -> Result<bool> {
    let config = ProbeConfig::from_env().rooted_at(root).with_timeout(timeout);
    let suite = ProbeSuite::from_config(&config, e2e).context("Failed to build probe suite")?;

    let report = suite.run().await;
    match format {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(report.passed)
}
