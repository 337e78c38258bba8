use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Deserialize;

/// How a host lifecycle phase expects its hooks to run.
///
/// - `Sync`: the host blocks on the hook; commands run strictly one after
///   another on the calling thread.
/// - `Async`: the host awaits a completion; commands run as concurrent units
///   bounded by the executor's concurrency cap.
/// - `Reserved`: the phase exists but commands may not be bound to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Sync,
    Async,
    Reserved,
}

impl PhaseKind {
    pub fn is_async(self) -> bool {
        matches!(self, PhaseKind::Async)
    }
}

impl FromStr for PhaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sync" => Ok(PhaseKind::Sync),
            "async" => Ok(PhaseKind::Async),
            "reserved" => Ok(PhaseKind::Reserved),
            other => Err(format!(
                "invalid phase kind: {other} (expected \"sync\", \"async\" or \"reserved\")"
            )),
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PhaseKind::Sync => "sync",
            PhaseKind::Async => "async",
            PhaseKind::Reserved => "reserved",
        };
        f.write_str(s)
    }
}

/// Why a command is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunRole {
    /// A top-level command of a batch.
    Command,
    /// A nested command whose stdout becomes an argument of its parent.
    Argument,
}

/// Log verbosity, shared by `--log-level` and `[config].log_level`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
