// tests/hook_plugin.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, command};
use crate::common::{init_tracing, with_timeout};

use std::time::Duration;

use hookrun::errors::HookrunError;
use hookrun::hooks::{HookPlugin, HostSettings};
use hookrun::types::PhaseKind;
use hookrun_test_utils::FakeBackend;

fn host(bail: bool) -> HostSettings {
    HostSettings { bail }
}

#[test]
fn bindings_follow_lifecycle_order() {
    let cfg = ConfigFileBuilder::new()
        .with_hook("on_done", command("echo", &["done"]))
        .with_hook("on_environment", command("echo", &["env"]))
        .with_hook("on_compile", command("echo", &["compile"]))
        .build();

    let plugin = HookPlugin::new(cfg, FakeBackend::new(), host(false));
    let phases: Vec<_> = plugin.bindings().iter().map(|b| b.phase.as_str()).collect();

    assert_eq!(phases, vec!["on_environment", "on_compile", "on_done"]);
    assert_eq!(plugin.binding("on_compile").unwrap().kind, PhaseKind::Sync);
    assert_eq!(plugin.binding("on_done").unwrap().kind, PhaseKind::Async);
}

#[test]
fn sync_phase_fires_blocking_in_order() {
    init_tracing();

    let backend = FakeBackend::new();
    let cfg = ConfigFileBuilder::new()
        .with_hook("on_compile", command("first", &[]))
        .with_hook("on_compile", command("second", &[]))
        .build();
    let plugin = HookPlugin::new(cfg, backend.clone(), host(false));

    plugin.fire_blocking("on_compile").unwrap();

    assert_eq!(backend.executables(), vec!["first", "second"]);
}

#[test]
fn async_phase_cannot_fire_blocking() {
    let backend = FakeBackend::new();
    let cfg = ConfigFileBuilder::new()
        .with_hook("on_done", command("echo", &[]))
        .build();
    let plugin = HookPlugin::new(cfg, backend.clone(), host(false));

    let err = plugin.fire_blocking("on_done").unwrap_err();

    assert!(matches!(err, HookrunError::PhaseError(_)));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn async_phase_fires_every_command() {
    init_tracing();

    let backend = FakeBackend::new().with_delay(Duration::from_millis(5));
    let cfg = ConfigFileBuilder::new()
        .with_hook("on_done", command("a", &[]))
        .with_hook("on_done", command("b", &[]))
        .with_hook("on_done", command("c", &[]))
        .max_concurrency(2)
        .build();
    let plugin = HookPlugin::new(cfg, backend.clone(), host(false));

    with_timeout(plugin.fire("on_done")).await.unwrap();

    let mut ran = backend.executables();
    ran.sort();
    assert_eq!(ran, vec!["a", "b", "c"]);
    assert!(backend.max_in_flight() <= 2);
}

#[tokio::test]
async fn sync_phase_fired_through_the_async_entry_point_stays_sequential() {
    init_tracing();

    let backend = FakeBackend::new();
    let cfg = ConfigFileBuilder::new()
        .with_hook("on_compile", command("first", &[]))
        .with_hook("on_compile", command("second", &[]))
        .with_hook("on_compile", command("third", &[]))
        .build();
    let plugin = HookPlugin::new(cfg, backend.clone(), host(false));

    with_timeout(plugin.fire("on_compile")).await.unwrap();

    assert_eq!(backend.executables(), vec!["first", "second", "third"]);
    assert_eq!(backend.max_in_flight(), 0);
}

#[tokio::test]
async fn unknown_phase_is_an_error_and_unbound_phase_is_a_noop() {
    let backend = FakeBackend::new();
    let cfg = ConfigFileBuilder::new()
        .with_hook("on_done", command("echo", &[]))
        .build();
    let plugin = HookPlugin::new(cfg, backend.clone(), host(false));

    let err = plugin.fire("on_teleport").await.unwrap_err();
    assert!(matches!(err, HookrunError::PhaseError(_)));

    plugin.fire("on_emit").await.unwrap();
    plugin.fire_blocking("on_compile").unwrap();
    assert!(backend.calls().is_empty());
}

#[test]
fn bail_is_inherited_from_the_host() {
    let cfg = ConfigFileBuilder::new()
        .with_hook("on_done", command("echo", &[]))
        .build();

    let plugin = HookPlugin::new(cfg, FakeBackend::new(), host(true));

    assert!(plugin.executor().settings().bail);
}

#[test]
fn config_bail_overrides_the_host() {
    let cfg = ConfigFileBuilder::new()
        .with_hook("on_done", command("echo", &[]))
        .bail(false)
        .build();

    let plugin = HookPlugin::new(cfg, FakeBackend::new(), host(true));

    assert!(!plugin.executor().settings().bail);
}

#[tokio::test]
async fn shared_command_runs_once_across_phases_in_dev_mode() {
    init_tracing();

    let backend = FakeBackend::new();
    let cfg = ConfigFileBuilder::new()
        .with_command("stamp", command("date", &[]))
        .with_hook_ref("on_compile", "stamp")
        .with_hook_ref("on_done", "stamp")
        .build();
    let plugin = HookPlugin::new(cfg, backend.clone(), host(false));

    with_timeout(plugin.fire("on_compile")).await.unwrap();
    with_timeout(plugin.fire("on_done")).await.unwrap();
    with_timeout(plugin.fire("on_done")).await.unwrap();

    assert_eq!(backend.count_of("date"), 1);
}

#[tokio::test]
async fn shared_command_reruns_without_dev_mode() {
    init_tracing();

    let backend = FakeBackend::new();
    let cfg = ConfigFileBuilder::new()
        .with_command("stamp", command("date", &[]))
        .with_hook_ref("on_compile", "stamp")
        .with_hook_ref("on_done", "stamp")
        .dev(false)
        .build();
    let plugin = HookPlugin::new(cfg, backend.clone(), host(false));

    with_timeout(plugin.fire("on_compile")).await.unwrap();
    with_timeout(plugin.fire("on_done")).await.unwrap();

    assert_eq!(backend.count_of("date"), 2);
}

#[tokio::test]
async fn fatal_failures_surface_from_both_phase_kinds() {
    init_tracing();

    let backend = FakeBackend::new().fail("broken", 1);
    let cfg = ConfigFileBuilder::new()
        .with_hook("on_compile", command("broken", &[]))
        .with_hook("on_compile", command("never", &[]))
        .with_hook("on_done", command("broken", &[]))
        .bail(true)
        .build();
    let plugin = HookPlugin::new(cfg, backend.clone(), host(false));

    let sync_err = with_timeout(plugin.fire("on_compile")).await.unwrap_err();
    let async_err = with_timeout(plugin.fire("on_done")).await.unwrap_err();

    assert!(matches!(sync_err, HookrunError::Process(_)));
    assert!(matches!(async_err, HookrunError::Process(_)));
    assert_eq!(backend.count_of("never"), 0);
}

#[tokio::test]
async fn swallowed_failures_let_the_phase_complete() {
    init_tracing();

    let backend = FakeBackend::new().fail("broken", 1);
    let cfg = ConfigFileBuilder::new()
        .with_hook("on_compile", command("broken", &[]))
        .with_hook("on_compile", command("after", &[]))
        .build();
    let plugin = HookPlugin::new(cfg, backend.clone(), host(false));

    with_timeout(plugin.fire("on_compile")).await.unwrap();

    assert_eq!(backend.count_of("after"), 1);
}

#[tokio::test]
async fn repeated_cycles_skip_commands_that_already_ran() {
    init_tracing();

    let backend = FakeBackend::new();
    let cfg = ConfigFileBuilder::new()
        .with_hook("on_compile", command("compile", &[]))
        .with_hook("on_done", command("notify", &[]))
        .build();
    let plugin = HookPlugin::new(cfg, backend.clone(), host(false));
    let phases = vec!["on_compile".to_string(), "on_done".to_string()];

    with_timeout(plugin.run_lifecycle(&phases, 3, false))
        .await
        .unwrap();

    assert_eq!(backend.executables(), vec!["compile", "notify"]);
    assert_eq!(plugin.executor().registry().len(), 2);
}

#[tokio::test]
async fn resetting_between_cycles_reruns_every_cycle() {
    init_tracing();

    let backend = FakeBackend::new();
    let cfg = ConfigFileBuilder::new()
        .with_command("stamp", command("date", &[]))
        .with_hook_ref("on_compile", "stamp")
        .with_hook_ref("on_done", "stamp")
        .build();
    let plugin = HookPlugin::new(cfg, backend.clone(), host(false));
    let phases = vec!["on_compile".to_string(), "on_done".to_string()];

    with_timeout(plugin.run_lifecycle(&phases, 3, true))
        .await
        .unwrap();

    // Once per cycle: the shared spec is still skipped within a cycle.
    assert_eq!(backend.count_of("date"), 3);
}

#[tokio::test]
async fn lifecycle_stops_at_the_first_fatal_failure() {
    init_tracing();

    let backend = FakeBackend::new().fail("broken", 1);
    let cfg = ConfigFileBuilder::new()
        .with_hook("on_compile", command("broken", &[]))
        .with_hook("on_done", command("notify", &[]))
        .bail(true)
        .build();
    let plugin = HookPlugin::new(cfg, backend.clone(), host(false));
    let phases = vec!["on_compile".to_string(), "on_done".to_string()];

    let err = with_timeout(plugin.run_lifecycle(&phases, 2, true))
        .await
        .unwrap_err();

    assert!(matches!(err, HookrunError::Process(_)));
    assert_eq!(backend.executables(), vec!["broken"]);
}
