// src/exec/runner.rs

//! Single command runner.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::command::{ProcessResult, ResolvedCommand};
use crate::errors::ProcessError;
use crate::exec::ProcessBackend;
use crate::types::RunRole;

/// Runs one fully resolved command, logs its output and applies the bail
/// policy to failures.
///
/// - `bail = true`: a failure is logged and then returned as `Err`.
/// - `bail = false`: a failure is logged and swallowed; the caller gets
///   `Ok(None)` and sibling commands keep running.
pub struct CommandRunner<B> {
    backend: Arc<B>,
    bail: bool,
}

impl<B> Clone for CommandRunner<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            bail: self.bail,
        }
    }
}

impl<B: ProcessBackend> CommandRunner<B> {
    pub fn new(backend: Arc<B>, bail: bool) -> Self {
        Self { backend, bail }
    }

    /// Run `command` on the calling thread.
    pub fn run_blocking(
        &self,
        command: &ResolvedCommand,
        role: RunRole,
    ) -> Result<Option<ProcessResult>, ProcessError> {
        announce(command, role);
        match self.backend.run_blocking(command) {
            Ok(result) => {
                report_output(command, &result);
                Ok(Some(result))
            }
            Err(err) => self.handle_failure(command, err),
        }
    }

    /// Run `command` and await its completion.
    pub async fn run(
        &self,
        command: &ResolvedCommand,
        role: RunRole,
    ) -> Result<Option<ProcessResult>, ProcessError> {
        announce(command, role);
        match self.backend.run(command).await {
            Ok(result) => {
                report_output(command, &result);
                Ok(Some(result))
            }
            Err(err) => self.handle_failure(command, err),
        }
    }

    fn handle_failure(
        &self,
        command: &ResolvedCommand,
        err: ProcessError,
    ) -> Result<Option<ProcessResult>, ProcessError> {
        error!(
            command = %command,
            bail = self.bail,
            "{}",
            describe_failure(command, &err)
        );

        if self.bail { Err(err) } else { Ok(None) }
    }
}

fn announce(command: &ResolvedCommand, role: RunRole) {
    match role {
        RunRole::Command => info!(command = %command, "running command"),
        RunRole::Argument => info!(
            command = %command,
            "running command (its output will be used as an argument)"
        ),
    }
}

fn report_output(command: &ResolvedCommand, result: &ProcessResult) {
    if !result.stdout.is_empty() {
        info!(command = %command, "stdout: {}", result.stdout);
    }
    if !result.stderr.is_empty() {
        warn!(command = %command, "stderr: {}", result.stderr);
    }
}

/// Human-readable failure report with the full command line.
///
/// Includes the captured stderr for non-zero exits, since that is usually
/// where the reason is.
pub fn describe_failure(command: &ResolvedCommand, err: &ProcessError) -> String {
    let mut message = format!("command \"{command}\" failed: {err}");
    if let ProcessError::Exit { stderr, .. } = err {
        if !stderr.is_empty() {
            message.push_str(": ");
            message.push_str(stderr);
        }
    }
    message
}
