// src/exec/mod.rs

//! Command execution layer.
//!
//! - [`backend`] provides the `ProcessBackend` trait and the production
//!   `SystemBackend`; tests replace it with a fake.
//! - [`runner`] runs one resolved command and applies the bail policy.
//! - [`executor`] resolves nested arguments and dispatches whole batches,
//!   sequentially or as a bounded set of concurrent units.
//! - [`registry`] remembers which specs already ran (dev-mode skipping).

pub mod backend;
pub mod executor;
pub mod registry;
pub mod runner;

pub use backend::{ProcessBackend, ProcessFuture, SystemBackend};
pub use executor::{Executor, ExecutorSettings, default_concurrency};
pub use registry::ExecutionRegistry;
pub use runner::{CommandRunner, describe_failure};
