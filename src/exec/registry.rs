// src/exec/registry.rs

//! Tracks which command specs have already run in this process.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::command::SpecId;

#[derive(Debug, Default)]
struct Ledger {
    /// Specs that ran to completion (either outcome).
    executed: HashSet<SpecId>,
    /// Specs some batch has claimed and not finished yet.
    running: HashSet<SpecId>,
}

/// Shared record of spec identities that ran or are running.
///
/// One registry belongs to one executor and is shared by every phase that
/// executor serves, so a spec referenced from several phases is claimed once
/// and then skipped everywhere while dev mode is on, even when those phases
/// fire concurrently.
#[derive(Debug, Default)]
pub struct ExecutionRegistry {
    ledger: Mutex<Ledger>,
}

impl ExecutionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_executed(&self, id: SpecId) -> bool {
        self.lock().executed.contains(&id)
    }

    /// Claim `id` for a run.
    ///
    /// Returns false if `id` already ran or another batch holds the claim.
    /// Checking and claiming happen under one lock.
    pub fn try_claim(&self, id: SpecId) -> bool {
        let mut ledger = self.lock();
        if ledger.executed.contains(&id) {
            return false;
        }
        ledger.running.insert(id)
    }

    /// Record that `id` ran to completion, dropping its claim if it had one.
    pub fn finish(&self, id: SpecId) {
        let mut ledger = self.lock();
        ledger.running.remove(&id);
        ledger.executed.insert(id);
    }

    /// Drop a claim for a spec that will not run after all.
    pub fn release(&self, id: SpecId) {
        self.lock().running.remove(&id);
    }

    /// Forget every completed spec, so the next cycle runs them again.
    ///
    /// Claims of batches still in flight are kept.
    pub fn reset(&self) {
        self.lock().executed.clear();
    }

    /// Number of specs that ran to completion.
    pub fn len(&self) -> usize {
        self.lock().executed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().executed.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        // The ledger stays consistent even if a holder panicked.
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
