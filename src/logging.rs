// src/logging.rs

//! Logging setup for `hookrun` using `tracing` + `tracing-subscriber`.
//!
//! Command output is reported through the log (stdout at info, stderr at
//! warn, failures at error), so the level decides how chatty hooks are.
//! The default is `warn`: only stderr and failures show up.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

use crate::types::LogLevel;

/// Environment variable consulted when `--log-level` is not given.
pub const LOG_ENV: &str = "HOOKRUN_LOG";

/// Pick the effective level.
///
/// First match wins: the CLI flag, `HOOKRUN_LOG` (any name or number
/// `tracing::Level` parses), `[config].log_level`, then `warn`. An
/// unparsable `HOOKRUN_LOG` is ignored.
pub fn resolve_level(
    cli_level: Option<LogLevel>,
    env_level: Option<&str>,
    config_level: Option<LogLevel>,
) -> Level {
    cli_level
        .map(Level::from)
        .or_else(|| env_level.and_then(|s| s.trim().parse().ok()))
        .or_else(|| config_level.map(Level::from))
        .unwrap_or(Level::WARN)
}

/// Initialise the global subscriber, writing to stderr.
///
/// Call once at startup, after the config file is read so its
/// `log_level` can take part.
pub fn init_logging(cli_level: Option<LogLevel>, config_level: Option<LogLevel>) -> Result<()> {
    let env_level = std::env::var(LOG_ENV).ok();
    let level = resolve_level(cli_level, env_level.as_deref(), config_level);

    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
