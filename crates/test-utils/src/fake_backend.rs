use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hookrun::command::{ProcessResult, ResolvedCommand};
use hookrun::errors::ProcessError;
use hookrun::exec::{ProcessBackend, ProcessFuture};

/// One invocation seen by the fake backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub executable: String,
    pub arguments: Vec<String>,
}

#[derive(Debug, Clone)]
enum Behaviour {
    Output { stdout: String, stderr: String },
    Exit(i32),
    Missing,
}

#[derive(Default)]
struct Inner {
    behaviours: Mutex<HashMap<String, Behaviour>>,
    calls: Mutex<Vec<RecordedCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// A fake process backend that:
/// - records every invocation in start order
/// - behaves like `echo` (stdout = arguments joined by spaces) unless an
///   executable was scripted otherwise
/// - in async mode, optionally sleeps to keep processes "in flight" and
///   tracks the highest number of concurrent processes.
///
/// Clones share recorded state, so keep one clone for assertions and hand
/// the other to the executor.
#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Inner>,
    delay: Duration,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Async runs sleep this long before completing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// `executable` succeeds with this stdout.
    pub fn respond(self, executable: &str, stdout: &str) -> Self {
        self.script(
            executable,
            Behaviour::Output {
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        )
    }

    /// `executable` succeeds with this stdout and stderr.
    pub fn respond_with_stderr(self, executable: &str, stdout: &str, stderr: &str) -> Self {
        self.script(
            executable,
            Behaviour::Output {
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        )
    }

    /// `executable` exits with a non-zero `code`.
    pub fn fail(self, executable: &str, code: i32) -> Self {
        self.script(executable, Behaviour::Exit(code))
    }

    /// `executable` cannot be spawned.
    pub fn missing(self, executable: &str) -> Self {
        self.script(executable, Behaviour::Missing)
    }

    fn script(self, executable: &str, behaviour: Behaviour) -> Self {
        self.inner
            .behaviours
            .lock()
            .unwrap()
            .insert(executable.to_string(), behaviour);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.calls.lock().unwrap().clone()
    }

    /// Executables in invocation order.
    pub fn executables(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.executable).collect()
    }

    /// Arguments of the first call to `executable`.
    pub fn arguments_of(&self, executable: &str) -> Option<Vec<String>> {
        self.calls()
            .into_iter()
            .find(|c| c.executable == executable)
            .map(|c| c.arguments)
    }

    pub fn count_of(&self, executable: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.executable == executable)
            .count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, command: &ResolvedCommand) {
        self.inner.calls.lock().unwrap().push(RecordedCall {
            executable: command.executable.clone(),
            arguments: command.arguments.clone(),
        });
    }

    fn outcome(&self, command: &ResolvedCommand) -> Result<ProcessResult, ProcessError> {
        let behaviour = self
            .inner
            .behaviours
            .lock()
            .unwrap()
            .get(&command.executable)
            .cloned();

        match behaviour {
            None => Ok(ProcessResult::new(command.arguments.join(" "), "")),
            Some(Behaviour::Output { stdout, stderr }) => Ok(ProcessResult::new(stdout, stderr)),
            Some(Behaviour::Exit(code)) => Err(ProcessError::Exit {
                executable: command.executable.clone(),
                code,
                stdout: String::new(),
                stderr: format!("{} failed", command.executable),
            }),
            Some(Behaviour::Missing) => Err(ProcessError::Spawn {
                executable: command.executable.clone(),
                reason: "No such file or directory (os error 2)".to_string(),
            }),
        }
    }
}

impl ProcessBackend for FakeBackend {
    fn run_blocking(&self, command: &ResolvedCommand) -> Result<ProcessResult, ProcessError> {
        self.record(command);
        self.outcome(command)
    }

    fn run<'a>(&'a self, command: &'a ResolvedCommand) -> ProcessFuture<'a> {
        Box::pin(async move {
            self.record(command);

            let now = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.inner.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.outcome(command)
        })
    }
}
