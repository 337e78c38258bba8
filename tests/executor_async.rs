// tests/executor_async.rs

mod common;
use crate::common::builders::shared;
use crate::common::{init_tracing, with_timeout};

use std::sync::Arc;
use std::time::Duration;

use hookrun::command::CommandSpec;
use hookrun::errors::{HookrunError, ProcessError};
use hookrun::exec::{Executor, ExecutorSettings, default_concurrency};
use hookrun_test_utils::FakeBackend;

fn capped(bail: bool, max_concurrency: usize) -> ExecutorSettings {
    ExecutorSettings {
        bail,
        dev: true,
        max_concurrency,
    }
}

fn independent_batch(n: usize) -> Vec<Arc<CommandSpec>> {
    (0..n).map(|i| shared(&format!("cmd{i}"), &[])).collect()
}

fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names
}

#[tokio::test]
async fn in_flight_processes_never_exceed_the_cap() {
    init_tracing();

    let backend = FakeBackend::new().with_delay(Duration::from_millis(30));
    let executor = Executor::new(backend.clone(), capped(false, 2));
    let batch = independent_batch(6);

    let results = with_timeout(executor.execute(&batch)).await.unwrap();

    assert_eq!(results.len(), 6);
    assert_eq!(backend.max_in_flight(), 2);
    for i in 0..6 {
        assert_eq!(backend.count_of(&format!("cmd{i}")), 1);
    }
}

#[tokio::test]
async fn default_cap_is_cores_minus_one() {
    init_tracing();

    let backend = FakeBackend::new().with_delay(Duration::from_millis(10));
    let executor = Executor::new(backend.clone(), ExecutorSettings::default());
    let batch = independent_batch(12);

    with_timeout(executor.execute(&batch)).await.unwrap();

    let cap = default_concurrency();
    assert!(cap >= 1);
    assert!(backend.max_in_flight() <= cap);
    assert_eq!(backend.calls().len(), 12);
}

#[tokio::test]
async fn nested_commands_share_the_cap_without_deadlock() {
    init_tracing();

    let backend = FakeBackend::new().with_delay(Duration::from_millis(10));
    let executor = Executor::new(backend.clone(), capped(false, 2));
    let batch: Vec<_> = (0..4)
        .map(|i| {
            Arc::new(
                CommandSpec::new(format!("outer{i}"))
                    .arg_from(CommandSpec::new("echo").arg(format!("a{i}")))
                    .arg_from(CommandSpec::new("echo").arg(format!("b{i}"))),
            )
        })
        .collect();

    with_timeout(executor.execute(&batch)).await.unwrap();

    assert!(backend.max_in_flight() <= 2);
    for i in 0..4 {
        assert_eq!(
            backend.arguments_of(&format!("outer{i}")).unwrap(),
            vec![format!("a{i}"), format!("b{i}")]
        );
    }
}

#[tokio::test]
async fn results_follow_declaration_order() {
    init_tracing();

    let backend = FakeBackend::new().with_delay(Duration::from_millis(5));
    let executor = Executor::new(backend, capped(false, 3));
    let batch = vec![
        shared("echo", &["one"]),
        shared("echo", &["two"]),
        shared("echo", &["three"]),
    ];

    let results = with_timeout(executor.execute(&batch)).await.unwrap();
    let stdout: Vec<_> = results
        .iter()
        .map(|r| r.as_ref().unwrap().stdout.as_str())
        .collect();

    assert_eq!(stdout, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn bail_reports_failure_after_all_units_settle() {
    init_tracing();

    let backend = FakeBackend::new()
        .with_delay(Duration::from_millis(5))
        .fail("broken", 3);
    let executor = Executor::new(backend.clone(), capped(true, 2));
    let batch = vec![
        shared("a", &[]),
        shared("broken", &[]),
        shared("c", &[]),
        shared("d", &[]),
    ];

    let err = with_timeout(executor.execute(&batch)).await.unwrap_err();

    match err {
        HookrunError::Process(ProcessError::Exit { executable, code, .. }) => {
            assert_eq!(executable, "broken");
            assert_eq!(code, 3);
        }
        other => panic!("expected process error, got: {other:?}"),
    }
    assert_eq!(sorted(backend.executables()), vec!["a", "broken", "c", "d"]);
    for spec in &batch {
        assert!(executor.is_executed(spec));
    }
}

#[tokio::test]
async fn first_of_several_failures_is_reported() {
    init_tracing();

    let backend = FakeBackend::new().fail("broken1", 1).fail("broken2", 2);
    let executor = Executor::new(backend.clone(), capped(true, 4));
    let batch = vec![shared("broken1", &[]), shared("ok", &[]), shared("broken2", &[])];

    let err = with_timeout(executor.execute(&batch)).await.unwrap_err();

    match err {
        HookrunError::Process(e) => assert!(e.executable().starts_with("broken")),
        other => panic!("expected process error, got: {other:?}"),
    }
    assert_eq!(backend.calls().len(), 3);
}

#[tokio::test]
async fn swallowed_failures_complete_the_batch() {
    init_tracing();

    let backend = FakeBackend::new().missing("not-found-binary");
    let executor = Executor::new(backend.clone(), capped(false, 2));
    let batch = vec![
        shared("echo", &["hi"]),
        shared("not-found-binary", &[]),
        shared("echo", &["there"]),
    ];

    let results = with_timeout(executor.execute(&batch)).await.unwrap();

    assert!(results[0].is_some());
    assert!(results[1].is_none());
    assert_eq!(results[2].as_ref().unwrap().stdout, "there");
}

#[tokio::test]
async fn empty_batch_completes_immediately() {
    let executor = Executor::new(FakeBackend::new(), capped(true, 1));

    let results = with_timeout(executor.execute(&[])).await.unwrap();

    assert!(results.is_empty());
}
