//! Probes that shell out to the Docker CLI.

use crate::error::{ProbeError, Result};
use crate::probe::{Probe, ProbeResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// Captured output of an external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code (-1 when killed by a signal).
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Run `program args...` and capture its output, bounded by `timeout_secs`
/// (0 disables the bound).
pub async fn run_command(program: &str, args: &[String], timeout_secs: u64) -> Result<CommandOutput> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ProbeError::CommandFailed {
            program: program.to_string(),
            message: e.to_string(),
        })?;

    let output = if timeout_secs > 0 {
        tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait_with_output())
            .await
            .map_err(|_| ProbeError::Timeout(timeout_secs))??
    } else {
        child.wait_with_output().await?
    };

    Ok(CommandOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Checks that a container with the given name is running.
pub struct ContainerProbe {
    name: String,
    container: String,
    docker_program: String,
    timeout_secs: u64,
}

impl ContainerProbe {
    pub fn new(container: &str, docker_program: &str, timeout_secs: u64) -> Self {
        Self {
            name: format!("container:{}", container),
            container: container.to_string(),
            docker_program: docker_program.to_string(),
            timeout_secs,
        }
    }

    fn args(&self) -> Vec<String> {
        vec![
            "ps".to_string(),
            "--filter".to_string(),
            format!("name={}", self.container),
            "--format".to_string(),
            "{{.Names}}".to_string(),
        ]
    }
}

#[async_trait]
impl Probe for ContainerProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> ProbeResult {
        let start = Instant::now();
        let result = run_command(&self.docker_program, &self.args(), self.timeout_secs).await;
        let elapsed = start.elapsed().as_millis() as u64;

        match result {
            Ok(out) if !out.success() => ProbeResult::fail(
                &self.name,
                format!("Docker command failed: {}", out.stderr.trim()),
                elapsed,
            ),
            Ok(out) if out.stdout.contains(&self.container) => {
                ProbeResult::pass(&self.name, format!("{} running", self.container), elapsed)
            }
            Ok(out) => ProbeResult::fail(
                &self.name,
                format!(
                    "Container '{}' not running. Found: {}",
                    self.container,
                    out.stdout.trim()
                ),
                elapsed,
            ),
            Err(e) => ProbeResult::fail(&self.name, e.to_string(), elapsed),
        }
    }
}

/// Checks that the compose file is accepted by `<compose> -f <file> config`.
pub struct ComposeConfigProbe {
    compose_file: PathBuf,
    compose_program: String,
    timeout_secs: u64,
}

impl ComposeConfigProbe {
    pub fn new(compose_file: PathBuf, compose_program: &str, timeout_secs: u64) -> Self {
        Self {
            compose_file,
            compose_program: compose_program.to_string(),
            timeout_secs,
        }
    }
}

#[async_trait]
impl Probe for ComposeConfigProbe {
    fn name(&self) -> &str {
        "compose:config"
    }

    async fn run(&self) -> ProbeResult {
        let start = Instant::now();
        if !self.compose_file.exists() {
            return ProbeResult::fail(
                self.name(),
                format!("{} not found", self.compose_file.display()),
                0,
            );
        }

        let args = vec![
            "-f".to_string(),
            self.compose_file.to_string_lossy().to_string(),
            "config".to_string(),
        ];
        let result = run_command(&self.compose_program, &args, self.timeout_secs).await;
        let elapsed = start.elapsed().as_millis() as u64;
        debug!(file = %self.compose_file.display(), "Compose config check finished");

        match result {
            Ok(out) if out.success() => {
                ProbeResult::pass(self.name(), "compose file is valid", elapsed)
            }
            Ok(out) => ProbeResult::fail(
                self.name(),
                format!("compose file is invalid: {}", out.stderr.trim()),
                elapsed,
            ),
            Err(e) => ProbeResult::fail(self.name(), e.to_string(), elapsed),
        }
    }
}
