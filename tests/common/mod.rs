#![allow(dead_code)]

pub use hookrun_test_utils::builders;
pub use hookrun_test_utils::{init_tracing, with_timeout};

use hookrun::exec::ExecutorSettings;

/// Executor settings with a fixed concurrency cap so tests don't depend on
/// the machine's core count.
pub fn settings(bail: bool, dev: bool) -> ExecutorSettings {
    ExecutorSettings {
        bail,
        dev,
        max_concurrency: 4,
    }
}
