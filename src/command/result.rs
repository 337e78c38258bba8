// src/command/result.rs

/// Captured output of a process that exited successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ProcessResult {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code: 0,
        }
    }
}

/// The stdout of `result`, or `""` when there is no result.
///
/// This is the value a nested command contributes to its parent's argument
/// list. stderr never flows into arguments.
pub fn stdout_or_empty(result: Option<&ProcessResult>) -> &str {
    result.map_or("", |r| r.stdout.as_str())
}
