// src/hooks/plugin.rs

//! Binds configured batches to host phases and fires them.

use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, info};

use crate::command::CommandSpec;
use crate::config::ConfigFile;
use crate::errors::{HookrunError, Result};
use crate::exec::{Executor, ProcessBackend};
use crate::hooks::PhaseTable;
use crate::types::PhaseKind;

/// Settings the host build tool contributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostSettings {
    /// The host's own fail-fast flag, inherited when `[config].bail` is unset.
    pub bail: bool,
}

/// One phase with the commands bound to it.
#[derive(Debug, Clone)]
pub struct PhaseBinding {
    pub phase: String,
    pub kind: PhaseKind,
    pub batch: Vec<Arc<CommandSpec>>,
}

/// The plugin as the host sees it: a set of phase bindings sharing one
/// executor (and therefore one execution registry).
pub struct HookPlugin<B> {
    executor: Executor<B>,
    table: PhaseTable,
    bindings: Vec<PhaseBinding>,
}

impl<B: ProcessBackend> HookPlugin<B> {
    /// Bind every hook of `config` to its phase, in lifecycle order.
    pub fn new(config: ConfigFile, backend: B, host: HostSettings) -> Self {
        let settings = config.config.executor_settings(host.bail);
        let executor = Executor::new(backend, settings);
        Self::with_executor(config, executor)
    }

    pub fn with_executor(config: ConfigFile, executor: Executor<B>) -> Self {
        let ConfigFile { phases, mut hooks, .. } = config;

        let bindings = phases
            .iter()
            .filter_map(|(phase, kind)| {
                hooks.remove(phase).map(|batch| PhaseBinding {
                    phase: phase.to_string(),
                    kind,
                    batch,
                })
            })
            .collect();

        Self {
            executor,
            table: phases,
            bindings,
        }
    }

    pub fn executor(&self) -> &Executor<B> {
        &self.executor
    }

    pub fn phases(&self) -> &PhaseTable {
        &self.table
    }

    /// Bound phases in lifecycle order.
    pub fn bindings(&self) -> &[PhaseBinding] {
        &self.bindings
    }

    pub fn binding(&self, phase: &str) -> Option<&PhaseBinding> {
        self.bindings.iter().find(|b| b.phase == phase)
    }

    /// Entry point for a synchronous host phase.
    ///
    /// Blocks until every command of the phase has run. Rejects async phases,
    /// which must go through [`Self::fire`].
    pub fn fire_blocking(&self, phase: &str) -> Result<()> {
        let Some(binding) = self.lookup(phase)? else {
            return Ok(());
        };

        if binding.kind.is_async() {
            return Err(HookrunError::PhaseError(format!(
                "phase '{phase}' is asynchronous and cannot be fired synchronously"
            )));
        }

        info!(phase = %phase, kind = %binding.kind, "firing phase");
        self.executor.execute_blocking(&binding.batch)?;
        debug!(phase = %phase, "phase complete");
        Ok(())
    }

    /// Fire `phase` with the dispatch kind the phase table gives it, and
    /// resolve once its whole batch has completed.
    ///
    /// Sync phases still run strictly in order, on the blocking pool.
    pub async fn fire(&self, phase: &str) -> Result<()> {
        let Some(binding) = self.lookup(phase)? else {
            return Ok(());
        };

        info!(phase = %phase, kind = %binding.kind, "firing phase");

        if binding.kind.is_async() {
            self.executor.execute(&binding.batch).await?;
        } else {
            let executor = self.executor.clone();
            let batch = binding.batch.clone();
            tokio::task::spawn_blocking(move || executor.execute_blocking(&batch))
                .await
                .map_err(|e| HookrunError::Other(anyhow!("phase '{phase}' panicked: {e}")))??;
        }

        debug!(phase = %phase, "phase complete");
        Ok(())
    }

    /// Fire `phases` in order, `cycles` times, like a host rebuilding in
    /// watch mode.
    ///
    /// With `reset_between_cycles`, the record of executed commands is
    /// cleared before every cycle after the first, so dev mode only skips
    /// repeats within a cycle. The first fatal failure stops the lifecycle.
    pub async fn run_lifecycle(
        &self,
        phases: &[String],
        cycles: u32,
        reset_between_cycles: bool,
    ) -> Result<()> {
        let registry = self.executor.registry();

        for cycle in 1..=cycles {
            if cycle > 1 && reset_between_cycles && !registry.is_empty() {
                debug!(cycle, forgotten = registry.len(), "resetting executed commands");
                registry.reset();
            }

            debug!(cycle, "lifecycle cycle started");
            for phase in phases {
                self.fire(phase).await?;
            }
            debug!(cycle, executed = registry.len(), "lifecycle cycle complete");
        }

        Ok(())
    }

    /// The binding for `phase`; `None` for known phases nothing is bound to.
    fn lookup(&self, phase: &str) -> Result<Option<&PhaseBinding>> {
        match self.table.lookup(phase) {
            None => Err(HookrunError::PhaseError(format!("unknown phase '{phase}'"))),
            Some(_) => Ok(self.binding(phase)),
        }
    }
}
