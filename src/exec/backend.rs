// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! The runner talks to a `ProcessBackend` instead of spawning processes
//! directly. This makes it easy to swap in a fake backend in tests while
//! keeping the production implementation here.
//!
//! - `SystemBackend` is the default implementation used by `hookrun`. It
//!   spawns real OS processes with `std::process` (blocking) and
//!   `tokio::process` (async).
//! - Tests can provide their own `ProcessBackend` that, for example, records
//!   invocations and returns canned output.

use std::future::Future;
use std::pin::Pin;
use std::process::{Command, Output, Stdio};

use crate::command::{ProcessResult, ResolvedCommand};
use crate::errors::ProcessError;

pub type ProcessFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ProcessResult, ProcessError>> + Send + 'a>>;

/// Trait abstracting how a resolved command is turned into a process.
///
/// Implementations must discard stdin and capture both stdout and stderr
/// rather than inheriting them from the parent. A non-zero exit is reported
/// as [`ProcessError::Exit`], a failure to start as [`ProcessError::Spawn`].
pub trait ProcessBackend: Send + Sync + 'static {
    /// Spawn and wait, blocking the calling thread.
    fn run_blocking(&self, command: &ResolvedCommand) -> Result<ProcessResult, ProcessError>;

    /// Spawn and return a future that resolves when the process exits.
    fn run<'a>(&'a self, command: &'a ResolvedCommand) -> ProcessFuture<'a>;
}

/// Real process backend used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBackend;

impl SystemBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessBackend for SystemBackend {
    fn run_blocking(&self, command: &ResolvedCommand) -> Result<ProcessResult, ProcessError> {
        let output = build_command(command)
            .output()
            .map_err(|e| spawn_error(command, &e))?;
        collect_output(command, output)
    }

    fn run<'a>(&'a self, command: &'a ResolvedCommand) -> ProcessFuture<'a> {
        Box::pin(async move {
            let output = tokio::process::Command::from(build_command(command))
                .output()
                .await
                .map_err(|e| spawn_error(command, &e))?;
            collect_output(command, output)
        })
    }
}

/// Build a std command with captured output and the command's options applied.
fn build_command(command: &ResolvedCommand) -> Command {
    let mut cmd = Command::new(&command.executable);
    cmd.args(&command.arguments)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(cwd) = &command.options.cwd {
        cmd.current_dir(cwd);
    }
    if !command.options.extend_env {
        cmd.env_clear();
    }
    cmd.envs(&command.options.env);

    cmd
}

fn spawn_error(command: &ResolvedCommand, err: &std::io::Error) -> ProcessError {
    ProcessError::Spawn {
        executable: command.executable.clone(),
        reason: err.to_string(),
    }
}

fn collect_output(command: &ResolvedCommand, output: Output) -> Result<ProcessResult, ProcessError> {
    let strip = command.options.strip_final_newline;
    let stdout = decode(&output.stdout, strip);
    let stderr = decode(&output.stderr, strip);
    let code = output.status.code().unwrap_or(-1);

    if output.status.success() {
        Ok(ProcessResult {
            stdout,
            stderr,
            exit_code: code,
        })
    } else {
        Err(ProcessError::Exit {
            executable: command.executable.clone(),
            code,
            stdout,
            stderr,
        })
    }
}

fn decode(bytes: &[u8], strip_final_newline: bool) -> String {
    let mut text = String::from_utf8_lossy(bytes).into_owned();
    if strip_final_newline && text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}
