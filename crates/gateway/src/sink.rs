//! Failure sinks

use kiwi_ports::FailureSink;
use log::error;

/// Reports failures through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFailureSink;

impl FailureSink for LogFailureSink {
    fn report_failure(&self, operation: &str, detail: &str) {
        error!("[{}] {}", operation, detail);
    }

    fn name(&self) -> &str {
        "LogFailureSink"
    }
}
