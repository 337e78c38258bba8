// tests/executor_blocking.rs

mod common;
use crate::common::builders::shared;
use crate::common::{init_tracing, settings};

use hookrun::command::ProcessResult;
use hookrun::errors::{HookrunError, ProcessError};
use hookrun::exec::Executor;
use hookrun_test_utils::FakeBackend;

#[test]
fn runs_commands_in_declaration_order() {
    init_tracing();

    let backend = FakeBackend::new();
    let executor = Executor::new(backend.clone(), settings(false, true));
    let batch = vec![
        shared("first", &[]),
        shared("second", &["x", "y"]),
        shared("third", &[]),
    ];

    let results = executor.execute_blocking(&batch).unwrap();

    assert_eq!(backend.executables(), vec!["first", "second", "third"]);
    assert_eq!(results.len(), 3);
    assert_eq!(results[1].as_ref().unwrap().stdout, "x y");
}

#[test]
fn returns_captured_stdout_and_stderr() {
    init_tracing();

    let backend = FakeBackend::new().respond_with_stderr("noisy", "out", "err");
    let executor = Executor::new(backend, settings(false, true));

    let results = executor.execute_blocking(&[shared("noisy", &[])]).unwrap();

    assert_eq!(results, vec![Some(ProcessResult::new("out", "err"))]);
}

#[test]
fn bail_propagates_error_and_stops_remaining_siblings() {
    init_tracing();

    let backend = FakeBackend::new().fail("broken", 2);
    let executor = Executor::new(backend.clone(), settings(true, true));
    let batch = vec![
        shared("ok", &[]),
        shared("broken", &["--flag"]),
        shared("after", &[]),
    ];

    let err = executor.execute_blocking(&batch).unwrap_err();

    match err {
        HookrunError::Process(ProcessError::Exit { executable, code, .. }) => {
            assert_eq!(executable, "broken");
            assert_eq!(code, 2);
        }
        other => panic!("expected process error, got: {other:?}"),
    }
    assert_eq!(backend.executables(), vec!["ok", "broken"]);
}

#[test]
fn swallowed_failure_yields_absent_result_and_batch_continues() {
    init_tracing();

    let backend = FakeBackend::new().fail("broken", 1);
    let executor = Executor::new(backend.clone(), settings(false, true));
    let batch = vec![
        shared("ok", &["1"]),
        shared("broken", &[]),
        shared("after", &["3"]),
    ];

    let results = executor.execute_blocking(&batch).unwrap();

    assert_eq!(backend.executables(), vec!["ok", "broken", "after"]);
    assert!(results[0].is_some());
    assert!(results[1].is_none());
    assert_eq!(results[2].as_ref().unwrap().stdout, "3");
}

#[test]
fn spawn_failure_is_swallowed_without_bail() {
    init_tracing();

    let backend = FakeBackend::new().missing("not-found-binary");
    let executor = Executor::new(backend, settings(false, true));

    let results = executor
        .execute_blocking(&[shared("not-found-binary", &[])])
        .unwrap();

    assert_eq!(results, vec![None]);
}

#[test]
fn completed_commands_are_marked_executed_whatever_the_outcome() {
    init_tracing();

    let backend = FakeBackend::new().fail("broken", 1);
    let executor = Executor::new(backend, settings(true, false));
    let batch = vec![shared("ok", &[]), shared("broken", &[]), shared("never", &[])];

    assert!(executor.execute_blocking(&batch).is_err());

    assert!(executor.is_executed(&batch[0]));
    assert!(executor.is_executed(&batch[1]));
    assert!(!executor.is_executed(&batch[2]));
}

#[test]
fn zero_concurrency_setting_is_clamped_to_one() {
    let mut s = settings(false, true);
    s.max_concurrency = 0;

    let executor = Executor::new(FakeBackend::new(), s);

    assert_eq!(executor.settings().max_concurrency, 1);
}
