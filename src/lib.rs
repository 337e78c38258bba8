// src/lib.rs

pub mod cli;
pub mod command;
pub mod config;
pub mod errors;
pub mod exec;
pub mod hooks;
pub mod logging;
pub mod types;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::command::{Argument, CommandSpec};
use crate::config::{ConfigFile, RawConfigFile};
use crate::exec::SystemBackend;
use crate::hooks::{HookPlugin, HostSettings};

/// High-level entry point used by `main.rs`.
///
/// This plays the host build tool:
/// - validates the already-parsed config
/// - binds hooks to phases
/// - fires the requested phases (or every bound phase) `--cycles` times
pub async fn run(args: CliArgs, raw: RawConfigFile) -> Result<()> {
    let cfg = ConfigFile::try_from(raw)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let host = HostSettings {
        bail: args.host_bail,
    };
    let plugin = HookPlugin::new(cfg, SystemBackend::new(), host);

    let phases: Vec<String> = if args.phases.is_empty() {
        plugin.bindings().iter().map(|b| b.phase.clone()).collect()
    } else {
        args.phases.clone()
    };
    info!(?phases, cycles = args.cycles, "running lifecycle");

    plugin
        .run_lifecycle(&phases, args.cycles, args.reset_between_cycles)
        .await?;

    Ok(())
}

/// Simple dry-run output: print settings and the bound phases.
fn print_dry_run(cfg: &ConfigFile) {
    println!("hookrun dry-run");
    println!("  config.bail = {:?}", cfg.config.bail);
    println!("  config.dev = {}", cfg.config.dev);
    println!("  config.max_concurrency = {:?}", cfg.config.max_concurrency);
    println!("  config.log_level = {:?}", cfg.config.log_level);
    println!();

    for (phase, kind) in cfg.phases.iter() {
        let Some(batch) = cfg.batch(phase) else {
            continue;
        };
        println!("{phase} ({kind}, {} commands):", batch.len());
        for spec in batch {
            println!("  - {}", render_spec(spec));
        }
    }

    debug!("dry-run complete (no execution)");
}

/// `echo a $(date +%s)`-style rendering of an unresolved spec.
fn render_spec(spec: &CommandSpec) -> String {
    let mut line = spec.executable.clone();
    for argument in &spec.arguments {
        line.push(' ');
        match argument {
            Argument::Literal(value) => line.push_str(value),
            Argument::Command(nested) => {
                line.push_str("$(");
                line.push_str(&render_spec(nested));
                line.push(')');
            }
        }
    }
    line
}
