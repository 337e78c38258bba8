// src/config/mod.rs

//! Configuration loading and validation for hookrun.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate hook bindings and commands (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, parse_and_validate};
pub use model::{ConfigFile, ConfigSection, HookEntry, RawConfigFile};
pub use validate::validate_config;
