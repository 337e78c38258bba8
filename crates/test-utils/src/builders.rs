#![allow(dead_code)]

use std::sync::Arc;

use hookrun::command::CommandSpec;
use hookrun::config::{ConfigFile, HookEntry, RawConfigFile};
use hookrun::types::PhaseKind;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    /// Append an inline command to `phase`.
    pub fn with_hook(mut self, phase: &str, spec: CommandSpec) -> Self {
        self.config
            .hooks
            .entry(phase.to_string())
            .or_default()
            .push(HookEntry::Inline(spec));
        self
    }

    /// Append a reference to a named command to `phase`.
    pub fn with_hook_ref(mut self, phase: &str, name: &str) -> Self {
        self.config
            .hooks
            .entry(phase.to_string())
            .or_default()
            .push(HookEntry::Named(name.to_string()));
        self
    }

    pub fn with_command(mut self, name: &str, spec: CommandSpec) -> Self {
        self.config.commands.insert(name.to_string(), spec);
        self
    }

    pub fn with_phase(mut self, phase: &str, kind: PhaseKind) -> Self {
        self.config.phases.insert(phase.to_string(), kind);
        self
    }

    pub fn bail(mut self, val: bool) -> Self {
        self.config.config.bail = Some(val);
        self
    }

    pub fn dev(mut self, val: bool) -> Self {
        self.config.config.dev = val;
        self
    }

    pub fn max_concurrency(mut self, val: usize) -> Self {
        self.config.config.max_concurrency = Some(val);
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for `Arc::new(CommandSpec::new(exe).arg(..)...)`.
pub fn shared(executable: &str, args: &[&str]) -> Arc<CommandSpec> {
    Arc::new(command(executable, args))
}

pub fn command(executable: &str, args: &[&str]) -> CommandSpec {
    args.iter()
        .fold(CommandSpec::new(executable), |spec, arg| spec.arg(*arg))
}
