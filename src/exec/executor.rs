// src/exec/executor.rs

//! Batch executor: nested argument resolution, dispatch order, concurrency
//! cap and the dev-mode skip policy.

use std::future::Future;
use std::num::NonZeroUsize;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::command::{
    Argument, CommandSpec, ProcessResult, ResolvedCommand, SpecId, stdout_or_empty,
};
use crate::errors::{HookrunError, Result};
use crate::exec::{CommandRunner, ExecutionRegistry, ProcessBackend};
use crate::types::RunRole;

type ResolveFuture<'a> = Pin<Box<dyn Future<Output = Result<ResolvedCommand>> + Send + 'a>>;

/// Default cap on concurrently running processes: one less than the number
/// of cores, but at least one.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

/// Executor behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorSettings {
    /// Abort the batch on the first failing command.
    pub bail: bool,
    /// Skip commands that already ran in this process.
    pub dev: bool,
    /// Max processes in flight for an async batch.
    pub max_concurrency: usize,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            bail: false,
            dev: true,
            max_concurrency: default_concurrency(),
        }
    }
}

/// Runs batches of [`CommandSpec`]s.
///
/// Cloning is cheap; clones share the backend and the execution registry.
pub struct Executor<B> {
    runner: CommandRunner<B>,
    registry: Arc<ExecutionRegistry>,
    settings: ExecutorSettings,
}

impl<B> Clone for Executor<B> {
    fn clone(&self) -> Self {
        Self {
            runner: self.runner.clone(),
            registry: Arc::clone(&self.registry),
            settings: self.settings,
        }
    }
}

impl<B: ProcessBackend> Executor<B> {
    pub fn new(backend: B, settings: ExecutorSettings) -> Self {
        Self::with_backend(Arc::new(backend), settings)
    }

    pub fn with_backend(backend: Arc<B>, settings: ExecutorSettings) -> Self {
        let settings = ExecutorSettings {
            max_concurrency: settings.max_concurrency.max(1),
            ..settings
        };
        Self {
            runner: CommandRunner::new(backend, settings.bail),
            registry: Arc::new(ExecutionRegistry::new()),
            settings,
        }
    }

    pub fn settings(&self) -> ExecutorSettings {
        self.settings
    }

    pub fn registry(&self) -> &ExecutionRegistry {
        &self.registry
    }

    /// Whether `spec` (or a clone of it) has already run to completion.
    pub fn is_executed(&self, spec: &CommandSpec) -> bool {
        self.registry.is_executed(spec.id())
    }

    /// Run a batch on the calling thread, strictly in declaration order.
    ///
    /// Each command, including the resolution of its nested arguments,
    /// completes before the next one starts. Returns one entry per command
    /// that was dispatched; `None` marks a swallowed failure.
    pub fn execute_blocking(&self, batch: &[Arc<CommandSpec>]) -> Result<Vec<Option<ProcessResult>>> {
        let pending = self.select_pending(batch);
        debug!(commands = pending.len(), "executing batch (sync)");

        let mut results = Vec::with_capacity(pending.len());
        for (index, spec) in pending.iter().enumerate() {
            let outcome = self.run_top_level_blocking(spec);
            self.registry.finish(spec.id());
            match outcome {
                Ok(result) => results.push(result),
                Err(err) => {
                    for skipped in &pending[index + 1..] {
                        self.registry.release(skipped.id());
                    }
                    return Err(err);
                }
            }
        }

        Ok(results)
    }

    /// Run a batch as concurrent units, bounded by `max_concurrency`.
    ///
    /// Every unit runs to completion even after a failure; the first fatal
    /// failure observed is returned once all units have settled. Results are
    /// in declaration order.
    pub async fn execute(&self, batch: &[Arc<CommandSpec>]) -> Result<Vec<Option<ProcessResult>>> {
        let pending = self.select_pending(batch);
        let total = pending.len();
        debug!(
            commands = total,
            max_concurrency = self.settings.max_concurrency,
            "executing batch (async)"
        );

        let limiter = Arc::new(Semaphore::new(self.settings.max_concurrency));
        let mut units = JoinSet::new();

        for (index, spec) in pending.into_iter().enumerate() {
            let executor = self.clone();
            let limiter = Arc::clone(&limiter);
            units.spawn(async move {
                let _finish = FinishOnDrop {
                    registry: &executor.registry,
                    id: spec.id(),
                };
                let outcome = executor.run_top_level(&spec, &limiter).await;
                (index, outcome)
            });
        }

        let mut results = vec![None; total];
        let mut first_failure: Option<HookrunError> = None;

        while let Some(joined) = units.join_next().await {
            let failure = match joined {
                Ok((index, Ok(result))) => {
                    results[index] = result;
                    continue;
                }
                Ok((_, Err(err))) => err,
                Err(join_err) => HookrunError::Other(anyhow!("command unit aborted: {join_err}")),
            };

            if first_failure.is_none() {
                first_failure = Some(failure);
            } else {
                warn!(error = %failure, "additional failure in batch");
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(results),
        }
    }

    /// Commands of `batch` that should run now.
    ///
    /// In dev mode every returned spec is claimed in the registry. Specs that
    /// already ran, that another batch is running, or that appear earlier in
    /// the same batch are dropped.
    fn select_pending(&self, batch: &[Arc<CommandSpec>]) -> Vec<Arc<CommandSpec>> {
        if !self.settings.dev {
            return batch.to_vec();
        }

        batch
            .iter()
            .filter(|spec| {
                let claimed = self.registry.try_claim(spec.id());
                if !claimed {
                    info!(executable = %spec.executable, "skipping command that already ran");
                }
                claimed
            })
            .cloned()
            .collect()
    }

    fn run_top_level_blocking(&self, spec: &CommandSpec) -> Result<Option<ProcessResult>> {
        let command = self.resolve_blocking(spec)?;
        Ok(self.runner.run_blocking(&command, RunRole::Command)?)
    }

    /// Resolve every nested argument of `spec`, innermost first.
    fn resolve_blocking(&self, spec: &CommandSpec) -> Result<ResolvedCommand> {
        let mut arguments = Vec::with_capacity(spec.arguments.len());

        for (position, argument) in spec.arguments.iter().enumerate() {
            let value = match argument {
                Argument::Literal(value) => value.clone(),
                Argument::Command(nested) => self
                    .run_nested_blocking(nested)
                    .map_err(|e| HookrunError::nested(&spec.executable, position, e))?,
            };
            arguments.push(value);
        }

        Ok(ResolvedCommand::new(spec, arguments))
    }

    fn run_nested_blocking(&self, nested: &CommandSpec) -> Result<String> {
        let command = self.resolve_blocking(nested)?;
        let result = self.runner.run_blocking(&command, RunRole::Argument)?;
        Ok(stdout_or_empty(result.as_ref()).to_owned())
    }

    async fn run_top_level(
        &self,
        spec: &CommandSpec,
        limiter: &Semaphore,
    ) -> Result<Option<ProcessResult>> {
        let command = self.resolve(spec, limiter).await?;
        self.dispatch(&command, RunRole::Command, limiter).await
    }

    /// Async counterpart of [`Self::resolve_blocking`].
    ///
    /// Nested arguments of one command resolve left to right; the permit for
    /// a nested process is taken only while that process runs, so a unit
    /// never holds a permit while it waits for another one.
    fn resolve<'a>(&'a self, spec: &'a CommandSpec, limiter: &'a Semaphore) -> ResolveFuture<'a> {
        Box::pin(async move {
            let mut arguments = Vec::with_capacity(spec.arguments.len());

            for (position, argument) in spec.arguments.iter().enumerate() {
                let value = match argument {
                    Argument::Literal(value) => value.clone(),
                    Argument::Command(nested) => self
                        .run_nested(nested, limiter)
                        .await
                        .map_err(|e| HookrunError::nested(&spec.executable, position, e))?,
                };
                arguments.push(value);
            }

            Ok(ResolvedCommand::new(spec, arguments))
        })
    }

    async fn run_nested(&self, nested: &CommandSpec, limiter: &Semaphore) -> Result<String> {
        let command = self.resolve(nested, limiter).await?;
        let result = self.dispatch(&command, RunRole::Argument, limiter).await?;
        Ok(stdout_or_empty(result.as_ref()).to_owned())
    }

    async fn dispatch(
        &self,
        command: &ResolvedCommand,
        role: RunRole,
        limiter: &Semaphore,
    ) -> Result<Option<ProcessResult>> {
        let _permit = limiter
            .acquire()
            .await
            .map_err(|e| HookrunError::Other(anyhow!("concurrency limiter closed: {e}")))?;
        Ok(self.runner.run(command, role).await?)
    }
}

/// Marks a unit's spec finished when the unit ends, including when it panics
/// or its batch is dropped mid-flight, so no claim is left behind.
struct FinishOnDrop<'a> {
    registry: &'a ExecutionRegistry,
    id: SpecId,
}

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        self.registry.finish(self.id);
    }
}
