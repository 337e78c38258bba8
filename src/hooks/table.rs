// src/hooks/table.rs

//! Known host lifecycle phases and how each one dispatches its hooks.

use std::collections::BTreeMap;

use crate::types::PhaseKind;

/// Every hook key starts with this prefix.
pub const HOOK_PREFIX: &str = "on_";

/// Built-in phases in lifecycle order.
pub const DEFAULT_PHASES: &[(&str, PhaseKind)] = &[
    ("on_environment", PhaseKind::Sync),
    ("on_after_environment", PhaseKind::Sync),
    ("on_entry_option", PhaseKind::Sync),
    ("on_after_plugins", PhaseKind::Sync),
    ("on_after_resolvers", PhaseKind::Sync),
    ("on_before_run", PhaseKind::Async),
    ("on_run", PhaseKind::Async),
    ("on_watch_run", PhaseKind::Async),
    ("on_normal_module_factory", PhaseKind::Sync),
    ("on_context_module_factory", PhaseKind::Sync),
    ("on_before_compile", PhaseKind::Async),
    ("on_compile", PhaseKind::Sync),
    ("on_this_compilation", PhaseKind::Sync),
    ("on_compilation", PhaseKind::Sync),
    ("on_make", PhaseKind::Async),
    ("on_after_compile", PhaseKind::Async),
    ("on_should_emit", PhaseKind::Sync),
    ("on_emit", PhaseKind::Async),
    ("on_after_emit", PhaseKind::Async),
    ("on_additional_pass", PhaseKind::Async),
    ("on_done", PhaseKind::Async),
    ("on_failed", PhaseKind::Sync),
    ("on_invalid", PhaseKind::Sync),
    ("on_watch_close", PhaseKind::Sync),
    // The host's logger hook: commands there would log into themselves.
    ("on_infrastructure_log", PhaseKind::Reserved),
];

/// Ordered phase name -> kind table.
///
/// Order is lifecycle order and decides the order in which the CLI fires
/// bound phases. Overrides replace an entry in place; new phases are
/// appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTable {
    entries: Vec<(String, PhaseKind)>,
}

impl PhaseTable {
    /// The built-in table with `overrides` applied on top.
    pub fn with_overrides(overrides: &BTreeMap<String, PhaseKind>) -> Self {
        let mut table = Self::default();
        for (phase, kind) in overrides {
            table.insert(phase.clone(), *kind);
        }
        table
    }

    pub fn insert(&mut self, phase: impl Into<String>, kind: PhaseKind) {
        let phase = phase.into();
        match self.entries.iter_mut().find(|(name, _)| *name == phase) {
            Some(entry) => entry.1 = kind,
            None => self.entries.push((phase, kind)),
        }
    }

    pub fn lookup(&self, phase: &str) -> Option<PhaseKind> {
        self.entries
            .iter()
            .find(|(name, _)| name == phase)
            .map(|(_, kind)| *kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, PhaseKind)> {
        self.entries.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PhaseTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_PHASES
                .iter()
                .map(|(name, kind)| (name.to_string(), *kind))
                .collect(),
        }
    }
}
