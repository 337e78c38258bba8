// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::Parser;

use crate::types::LogLevel;

/// Command-line arguments for `hookrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hookrun",
    version,
    about = "Run external commands at build lifecycle phases.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Hookrun.toml")]
    pub config: String,

    /// Fire only this phase (repeatable, fired in the given order).
    ///
    /// Without it, every bound phase fires in lifecycle order.
    #[arg(long = "phase", value_name = "NAME")]
    pub phases: Vec<String>,

    /// Run the lifecycle this many times, like successive watch rebuilds.
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub cycles: u32,

    /// The host's fail-fast setting, used when `[config].bail` is unset.
    #[arg(long)]
    pub host_bail: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HOOKRUN_LOG`, then `[config].log_level`, then `warn`
    /// is used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Forget which commands already ran before each cycle after the first,
    /// so dev mode only skips repeats within one cycle.
    #[arg(long)]
    pub reset_between_cycles: bool,

    /// Parse + validate, print phase bindings, but don't run any commands.
    #[arg(long)]
    pub dry_run: bool,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
