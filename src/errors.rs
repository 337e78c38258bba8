// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HookrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Phase error: {0}")]
    PhaseError(String),

    #[error(transparent)]
    Process(#[from] ProcessError),

    /// A nested command used as an argument failed while `bail` was set, so
    /// the parent command was never dispatched.
    #[error("argument {position} of \"{parent}\" could not be resolved: {source}")]
    NestedArgument {
        parent: String,
        position: usize,
        source: ProcessError,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure reported by the process layer for a single command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// The program could not be started at all (missing binary, bad cwd...).
    #[error("failed to spawn \"{executable}\": {reason}")]
    Spawn { executable: String, reason: String },

    /// The program ran but exited unsuccessfully. Signal deaths use `-1`.
    #[error("\"{executable}\" exited with code {code}")]
    Exit {
        executable: String,
        code: i32,
        stdout: String,
        stderr: String,
    },
}

impl ProcessError {
    pub fn executable(&self) -> &str {
        match self {
            ProcessError::Spawn { executable, .. } | ProcessError::Exit { executable, .. } => {
                executable
            }
        }
    }
}

impl HookrunError {
    /// Wrap a failure raised while resolving argument `position` of `parent`.
    ///
    /// Only the innermost process failure is wrapped; an error that is already
    /// a `NestedArgument` passes through untouched so the report names the
    /// command that actually failed.
    pub(crate) fn nested(parent: &str, position: usize, err: HookrunError) -> HookrunError {
        match err {
            HookrunError::Process(source) => HookrunError::NestedArgument {
                parent: parent.to_string(),
                position,
                source,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, HookrunError>;
