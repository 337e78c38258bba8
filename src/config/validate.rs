// src/config/validate.rs

use tracing::warn;

use crate::command::CommandSpec;
use crate::config::model::{ConfigFile, HookEntry, RawConfigFile};
use crate::errors::{HookrunError, Result};
use crate::hooks::{HOOK_PREFIX, PhaseTable};
use crate::types::PhaseKind;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::HookrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

/// Check every invariant `ConfigFile` relies on.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_hooks(cfg)?;
    validate_global_config(cfg)?;
    validate_phase_overrides(cfg)?;
    validate_hook_phases(cfg, &PhaseTable::with_overrides(&cfg.phases))?;
    validate_commands(cfg)?;
    warn_on_empty_hooks(cfg);
    Ok(())
}

fn ensure_has_hooks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.hooks.is_empty() {
        return Err(HookrunError::ConfigError(format!(
            "no lifecycle hooks found: [hooks] must contain at least one `{HOOK_PREFIX}*` key"
        )));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.max_concurrency == Some(0) {
        return Err(HookrunError::ConfigError(
            "[config].max_concurrency must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_phase_overrides(cfg: &RawConfigFile) -> Result<()> {
    for phase in cfg.phases.keys() {
        if !phase.starts_with(HOOK_PREFIX) {
            return Err(HookrunError::ConfigError(format!(
                "[phases] key '{phase}' must start with '{HOOK_PREFIX}'"
            )));
        }
    }
    Ok(())
}

fn validate_hook_phases(cfg: &RawConfigFile, table: &PhaseTable) -> Result<()> {
    for phase in cfg.hooks.keys() {
        if !phase.starts_with(HOOK_PREFIX) {
            return Err(HookrunError::ConfigError(format!(
                "hook '{phase}' is not a lifecycle hook binding (expected a '{HOOK_PREFIX}' prefix)"
            )));
        }

        match table.lookup(phase) {
            None => {
                return Err(HookrunError::ConfigError(format!(
                    "hook '{phase}' does not match any known phase"
                )));
            }
            Some(PhaseKind::Reserved) => {
                return Err(HookrunError::ConfigError(format!(
                    "hook '{phase}' binds a reserved phase; commands cannot run there"
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn validate_commands(cfg: &RawConfigFile) -> Result<()> {
    for (name, spec) in cfg.commands.iter() {
        check_spec(spec, &format!("commands.{name}"))?;
    }

    for (phase, entries) in cfg.hooks.iter() {
        for (index, entry) in entries.iter().enumerate() {
            match entry {
                HookEntry::Named(name) => {
                    if !cfg.commands.contains_key(name) {
                        return Err(HookrunError::ConfigError(format!(
                            "hook '{phase}' references unknown command '{name}'"
                        )));
                    }
                }
                HookEntry::Inline(spec) => check_spec(spec, &format!("hooks.{phase}[{index}]"))?,
            }
        }
    }
    Ok(())
}

/// Executables must be non-empty at every nesting depth.
fn check_spec(spec: &CommandSpec, location: &str) -> Result<()> {
    if spec.executable.trim().is_empty() {
        return Err(HookrunError::ConfigError(format!(
            "{location}: `executable` must not be empty"
        )));
    }

    for (position, nested) in spec.nested() {
        check_spec(nested, &format!("{location}.arguments[{position}]"))?;
    }
    Ok(())
}

fn warn_on_empty_hooks(cfg: &RawConfigFile) {
    for (phase, entries) in cfg.hooks.iter() {
        if entries.is_empty() {
            warn!(phase = %phase, "hook has no commands; nothing will run for this phase");
        }
    }
}
