//! kubectl invocation
//!
//! Every Kubernetes interaction in the smoke helpers goes through the
//! `kubectl` binary, exactly as an operator would type it. Process spawning
//! sits behind [`CommandRunner`] so tests can script the CLI.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use crate::config::KubectlConfig;
use crate::delay::{Delay, TokioDelay};
use crate::eventually::{eventually, ConditionError, Probe};
use crate::wait::WaitError;

/// Error type for kubectl operations
#[derive(Debug, thiserror::Error)]
pub enum KubectlError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Unexpected kubectl output: {0}")]
    InvalidOutput(String),

    #[error("{0}")]
    Wait(#[from] WaitError),
}

/// Captured result of a process run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Successful run with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        }
    }

    /// Failed run (exit code 1) with the given stderr
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            success: false,
            code: Some(1),
        }
    }
}

/// Runs external programs
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, feeding `stdin` if given
    ///
    /// Only spawn and I/O failures are errors; a non-zero exit is reported
    /// through [`CommandOutput::success`].
    async fn run(
        &self,
        program: &str,
        args: &[String],
        stdin: Option<&str>,
    ) -> Result<CommandOutput, KubectlError>;
}

/// Runner that spawns real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        stdin: Option<&str>,
    ) -> Result<CommandOutput, KubectlError> {
        let spawn_err = |source| KubectlError::Spawn {
            program: program.to_string(),
            source,
        };

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        let mut child = cmd.spawn().map_err(spawn_err)?;

        if let Some(input) = stdin {
            if let Some(mut handle) = child.stdin.take() {
                handle.write_all(input.as_bytes()).await.map_err(spawn_err)?;
                // Dropping the handle closes the pipe so kubectl sees EOF
            }
        }

        let output = child.wait_with_output().await.map_err(spawn_err)?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// kubectl wrapper bound to one kubeconfig/context
#[derive(Clone)]
pub struct Kubectl {
    runner: Arc<dyn CommandRunner>,
    config: KubectlConfig,
    delay: Arc<dyn Delay>,
    poll_interval: Duration,
}

impl Kubectl {
    /// kubectl from `config`, spawning real processes
    pub fn new(config: KubectlConfig) -> Self {
        Self::with_runner(config, Arc::new(SystemRunner))
    }

    /// kubectl backed by a custom runner
    pub fn with_runner(config: KubectlConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            config,
            delay: Arc::new(TokioDelay),
            poll_interval: Duration::from_secs(1),
        }
    }

    /// Set the delay used between polls
    #[must_use]
    pub fn delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub(crate) fn poll_delay(&self) -> Arc<dyn Delay> {
        self.delay.clone()
    }

    pub(crate) fn poll_every(&self) -> Duration {
        self.poll_interval
    }

    async fn run(&self, args: &[&str], stdin: Option<&str>) -> Result<CommandOutput, KubectlError> {
        let mut full_args = self.config.global_args();
        full_args.extend(args.iter().map(|s| (*s).to_string()));

        debug!(command = %format!("{} {}", self.config.binary, full_args.join(" ")), "Running kubectl");
        self.runner.run(&self.config.binary, &full_args, stdin).await
    }

    /// Run `args` and fail on a non-zero exit
    async fn run_checked(
        &self,
        args: &[&str],
        stdin: Option<&str>,
    ) -> Result<CommandOutput, KubectlError> {
        let output = self.run(args, stdin).await?;

        if !output.success {
            return Err(KubectlError::CommandFailed {
                command: format!("{} {}", self.config.binary, args.join(" ")),
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(output)
    }

    /// Run an arbitrary kubectl command
    ///
    /// The exit status is reported, not judged.
    pub async fn execute(&self, args: &[&str]) -> Result<CommandOutput, KubectlError> {
        self.run(args, None).await
    }

    /// Check whether a namespace exists
    pub async fn namespace_exists(&self, namespace: &str) -> Result<bool, KubectlError> {
        let output = self
            .run(&["get", "namespace", namespace, "-o", "name"], None)
            .await?;
        Ok(output.success)
    }

    /// Check whether `kind/name` exists in `namespace`
    pub async fn object_exists(
        &self,
        namespace: &str,
        kind: &str,
        name: &str,
    ) -> Result<bool, KubectlError> {
        let output = self
            .run(&["get", kind, name, "-n", namespace, "-o", "name"], None)
            .await?;
        Ok(output.success)
    }

    /// Apply a manifest into `namespace` via stdin
    #[instrument(skip(self, manifest))]
    pub async fn apply_manifest(&self, namespace: &str, manifest: &str) -> Result<(), KubectlError> {
        let output = self
            .run_checked(&["apply", "-n", namespace, "-f", "-"], Some(manifest))
            .await?;

        info!(applied = %output.stdout.trim(), "Applied manifest");
        Ok(())
    }

    /// Delete `kind/name` from `namespace`
    #[instrument(skip(self))]
    pub async fn delete(&self, namespace: &str, kind: &str, name: &str) -> Result<(), KubectlError> {
        self.run_checked(&["delete", kind, name, "-n", namespace], None)
            .await?;

        info!("Deleted {}/{}", kind, name);
        Ok(())
    }

    /// Query a jsonpath expression, returning stdout unvalidated
    pub async fn get_jsonpath(
        &self,
        namespace: &str,
        kind: &str,
        name: &str,
        path: &str,
    ) -> Result<String, KubectlError> {
        let jsonpath = format!("jsonpath={path}");
        let output = self
            .run(&["get", kind, name, "-n", namespace, "-o", &jsonpath], None)
            .await?;
        Ok(output.stdout)
    }

    /// Fetch `kind/name` as JSON and deserialize it
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        namespace: &str,
        kind: &str,
        name: &str,
    ) -> Result<T, KubectlError> {
        let output = self
            .run_checked(&["get", kind, name, "-n", namespace, "-o", "json"], None)
            .await?;

        serde_json::from_str(&output.stdout)
            .map_err(|e| KubectlError::InvalidOutput(format!("{kind}/{name}: {e}")))
    }

    /// Poll until `kind/name` exists in `namespace`
    ///
    /// Checks once per poll interval until `timeout` is used up. A kubectl
    /// that cannot be run ends the wait at once with that error.
    #[instrument(skip(self))]
    pub async fn wait_for(
        &self,
        namespace: &str,
        kind: &str,
        name: &str,
        timeout: Duration,
    ) -> Result<(), KubectlError> {
        let result = eventually(|| async move {
            match self.object_exists(namespace, kind, name).await {
                Ok(true) => Probe::Done(()),
                Ok(false) => Probe::Waiting("not found".to_string()),
                Err(e) => Probe::Failed(e),
            }
        })
        .timeout(timeout)
        .interval(self.poll_interval)
        .delay(self.delay.clone())
        .await_condition()
        .await;

        match result {
            Ok(()) => {
                debug!("{}/{} is present", kind, name);
                Ok(())
            }
            Err(ConditionError::EventuallyFailed {
                attempts,
                elapsed,
                last_state,
            }) => {
                warn!(attempts, "Gave up waiting for {}/{}", kind, name);
                Err(WaitError::new(format!("{kind}/{name}"), namespace, timeout, elapsed)
                    .with_state(last_state)
                    .with_attempts(attempts)
                    .into())
            }
            Err(ConditionError::Aborted(e)) => Err(e),
        }
    }
}
