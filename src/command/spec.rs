// src/command/spec.rs

//! Declarative command descriptions and their resolved form.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;

/// Identity of a [`CommandSpec`], used by the execution registry.
///
/// Every spec built through [`CommandSpec::new`] or deserialized from config
/// gets a fresh id. Clones keep the id of the original, so a spec shared
/// between several phases is the same spec as far as "executed" goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecId(u64);

impl SpecId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SpecId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// One command to run: executable, positional arguments, options.
///
/// Arguments may themselves be commands; those are run first and their
/// stdout takes their place in the argument list.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSpec {
    #[serde(skip, default = "SpecId::next")]
    id: SpecId,

    /// Program name or path.
    #[serde(alias = "cmd")]
    pub executable: String,

    #[serde(default, alias = "args")]
    pub arguments: Vec<Argument>,

    #[serde(default)]
    pub options: CommandOptions,
}

/// A single positional argument.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawArgument")]
pub enum Argument {
    Literal(String),
    Command(Box<CommandSpec>),
}

/// What TOML allows in an argument slot.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawArgument {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Command(Box<CommandSpec>),
}

impl From<RawArgument> for Argument {
    fn from(raw: RawArgument) -> Self {
        match raw {
            RawArgument::Text(s) => Argument::Literal(s),
            RawArgument::Integer(i) => Argument::Literal(i.to_string()),
            RawArgument::Float(f) => Argument::Literal(f.to_string()),
            RawArgument::Bool(b) => Argument::Literal(b.to_string()),
            RawArgument::Command(spec) => Argument::Command(spec),
        }
    }
}

/// Per-command process options. Defaults inherit everything from the host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommandOptions {
    /// Working directory override.
    pub cwd: Option<PathBuf>,

    /// Extra environment variables.
    pub env: BTreeMap<String, String>,

    /// If false, the child starts from an empty environment plus `env`.
    pub extend_env: bool,

    /// Drop a single trailing newline from captured stdout/stderr.
    pub strip_final_newline: bool,
}

impl Default for CommandOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            env: BTreeMap::new(),
            extend_env: true,
            strip_final_newline: true,
        }
    }
}

impl CommandSpec {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            id: SpecId::next(),
            executable: executable.into(),
            arguments: Vec::new(),
            options: CommandOptions::default(),
        }
    }

    pub fn id(&self) -> SpecId {
        self.id
    }

    /// Append a literal argument.
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.arguments.push(Argument::Literal(value.into()));
        self
    }

    /// Append a nested command whose stdout becomes the argument.
    pub fn arg_from(mut self, command: CommandSpec) -> Self {
        self.arguments.push(Argument::Command(Box::new(command)));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.env.insert(key.into(), value.into());
        self
    }

    pub fn options(mut self, options: CommandOptions) -> Self {
        self.options = options;
        self
    }

    /// Nested commands directly in this spec's argument list, with their
    /// positions.
    pub fn nested(&self) -> impl Iterator<Item = (usize, &CommandSpec)> {
        self.arguments
            .iter()
            .enumerate()
            .filter_map(|(position, argument)| match argument {
                Argument::Command(spec) => Some((position, spec.as_ref())),
                Argument::Literal(_) => None,
            })
    }
}

/// A command whose arguments are all literal values, ready for the process
/// layer. Produced by the executor; the originating spec is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    pub executable: String,
    pub arguments: Vec<String>,
    pub options: CommandOptions,
}

impl ResolvedCommand {
    pub fn new(spec: &CommandSpec, arguments: Vec<String>) -> Self {
        Self {
            executable: spec.executable.clone(),
            arguments,
            options: spec.options.clone(),
        }
    }
}

/// Renders as the command line, e.g. `echo a b`.
impl fmt::Display for ResolvedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.executable)?;
        for arg in &self.arguments {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
