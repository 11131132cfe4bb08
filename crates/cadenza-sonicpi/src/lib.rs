// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sonic Pi audio sink.
//!
//! Every call spawns the configured command (`sonic_pi4` by default), writes
//! the code to its stdin and waits for it to exit. A non-zero exit status
//! is reported with the command's stderr.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error};

use cadenza_config::model::SonicPiConfig;
use cadenza_core::{AdapterType, AudioSink, CadenzaError, HealthStatus, PluginAdapter};

/// Runs code through the Sonic Pi command-line client.
pub struct SonicPiSink {
    command: String,
    args: Vec<String>,
    stop_code: String,
    timeout: Duration,
}

impl SonicPiSink {
    pub fn new(config: &SonicPiConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            stop_code: config.stop_code.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    async fn run(&self, code: &str) -> Result<(), CadenzaError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CadenzaError::Sink {
                message: format!("failed to start {}: {e}", self.command),
                source: Some(Box::new(e)),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(code.as_bytes()).await {
                // The exit status below carries the real failure.
                debug!(error = %e, "sonic pi closed stdin early");
            }
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| CadenzaError::Sink {
                message: format!(
                    "{} did not finish within {}s",
                    self.command,
                    self.timeout.as_secs()
                ),
                source: None,
            })?
            .map_err(|e| CadenzaError::Sink {
                message: format!("failed to wait for {}: {e}", self.command),
                source: Some(Box::new(e)),
            })?;

        if output.status.success() {
            debug!(
                stdout = %String::from_utf8_lossy(&output.stdout).trim(),
                "sonic pi accepted code"
            );
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            match output.status.code() {
                Some(code) => format!("{} exited with status {code}", self.command),
                None => format!("{} was terminated by a signal", self.command),
            }
        } else {
            stderr
        };
        error!(command = %self.command, error = %message, "sonic pi rejected code");
        Err(CadenzaError::Sink {
            message,
            source: None,
        })
    }
}

#[async_trait]
impl PluginAdapter for SonicPiSink {
    fn name(&self) -> &str {
        "sonic-pi"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sink
    }

    async fn health_check(&self) -> Result<HealthStatus, CadenzaError> {
        if command_available(&self.command) {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy(format!(
                "{} not found on PATH",
                self.command
            )))
        }
    }

    async fn shutdown(&self) -> Result<(), CadenzaError> {
        Ok(())
    }
}

#[async_trait]
impl AudioSink for SonicPiSink {
    async fn execute(&self, code: &str) -> Result<(), CadenzaError> {
        debug!(bytes = code.len(), "executing sonic pi code");
        self.run(code).await
    }

    async fn stop(&self) -> Result<(), CadenzaError> {
        debug!("stopping sonic pi");
        self.run(&self.stop_code).await
    }
}

fn command_available(command: &str) -> bool {
    let path = Path::new(command);
    if path.components().count() > 1 {
        return path.is_file();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(command).is_file()))
        .unwrap_or(false)
}
