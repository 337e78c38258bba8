// src/hooks/mod.rs

//! Host lifecycle glue.
//!
//! - [`table`] is the phase table: which phases exist and whether each one
//!   runs its hooks synchronously or asynchronously.
//! - [`plugin`] binds configured batches to phases and fires them through
//!   the executor.

pub mod plugin;
pub mod table;

pub use plugin::{HookPlugin, HostSettings, PhaseBinding};
pub use table::{DEFAULT_PHASES, HOOK_PREFIX, PhaseTable};
