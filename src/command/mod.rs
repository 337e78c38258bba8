// src/command/mod.rs

//! Command data model.
//!
//! - [`spec`] holds the declarative `CommandSpec` (possibly nested) and the
//!   `ResolvedCommand` the executor produces from it.
//! - [`result`] holds `ProcessResult` and output extraction.

pub mod result;
pub mod spec;

pub use result::{ProcessResult, stdout_or_empty};
pub use spec::{Argument, CommandOptions, CommandSpec, ResolvedCommand, SpecId};
