// src/config/model.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::command::CommandSpec;
use crate::exec::{ExecutorSettings, default_concurrency};
use crate::hooks::PhaseTable;
use crate::types::{LogLevel, PhaseKind};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// bail = true
/// dev = true
/// log_level = "info"
///
/// [phases]
/// on_deploy = "async"
///
/// [commands.revision]
/// executable = "git"
/// arguments = ["rev-parse", "HEAD"]
///
/// [hooks]
/// on_before_run = ["revision"]
///
/// [[hooks.on_done]]
/// executable = "echo"
/// arguments = ["built", { executable = "git", arguments = ["rev-parse", "HEAD"] }]
/// ```
///
/// All sections are optional at this level; validation requires at least one
/// hook binding.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Global behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Additions to / overrides of the built-in phase table.
    #[serde(default)]
    pub phases: BTreeMap<String, PhaseKind>,

    /// Named commands that hook lists can reference by name.
    #[serde(default)]
    pub commands: BTreeMap<String, CommandSpec>,

    /// Phase name (`on_*`) -> ordered batch of commands.
    #[serde(default)]
    pub hooks: BTreeMap<String, Vec<HookEntry>>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Abort on the first failing command. `None` inherits the host's own
    /// fail-fast setting.
    #[serde(default)]
    pub bail: Option<bool>,

    /// Skip commands that already ran during this process' lifetime.
    #[serde(default = "default_dev")]
    pub dev: bool,

    /// Max concurrently running processes for async phases.
    #[serde(default)]
    pub max_concurrency: Option<usize>,

    /// Log level when neither `--log-level` nor `HOOKRUN_LOG` is set.
    #[serde(default)]
    pub log_level: Option<LogLevel>,
}

fn default_dev() -> bool {
    true
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            bail: None,
            dev: default_dev(),
            max_concurrency: None,
            log_level: None,
        }
    }
}

impl ConfigSection {
    pub fn effective_bail(&self, host_bail: bool) -> bool {
        self.bail.unwrap_or(host_bail)
    }

    pub fn executor_settings(&self, host_bail: bool) -> ExecutorSettings {
        ExecutorSettings {
            bail: self.effective_bail(host_bail),
            dev: self.dev,
            max_concurrency: self.max_concurrency.unwrap_or_else(default_concurrency),
        }
    }
}

/// One element of a hook list: an inline command or the name of a
/// `[commands.<name>]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HookEntry {
    Named(String),
    Inline(CommandSpec),
}

/// Validated configuration.
///
/// Named references are resolved: every mention of the same
/// `[commands.<name>]` entry points at one shared spec.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub phases: PhaseTable,
    pub hooks: BTreeMap<String, Vec<Arc<CommandSpec>>>,
}

impl ConfigFile {
    /// Build from a raw config that already passed validation.
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        let phases = PhaseTable::with_overrides(&raw.phases);

        let shared: BTreeMap<String, Arc<CommandSpec>> = raw
            .commands
            .into_iter()
            .map(|(name, spec)| (name, Arc::new(spec)))
            .collect();

        let hooks = raw
            .hooks
            .into_iter()
            .map(|(phase, entries)| {
                let batch = entries
                    .into_iter()
                    .filter_map(|entry| match entry {
                        HookEntry::Named(name) => shared.get(&name).cloned(),
                        HookEntry::Inline(spec) => Some(Arc::new(spec)),
                    })
                    .collect();
                (phase, batch)
            })
            .collect();

        Self {
            config: raw.config,
            phases,
            hooks,
        }
    }

    /// Commands bound to `phase`, if any.
    pub fn batch(&self, phase: &str) -> Option<&[Arc<CommandSpec>]> {
        self.hooks.get(phase).map(Vec::as_slice)
    }
}
