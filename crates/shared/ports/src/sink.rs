/// Port for failure reporting
///
/// The bridge never raises failures to its callers as panics; every failure is
/// reported here (as a side effect) and returned as a value.
pub trait FailureSink: Send + Sync {
    /// Report a failure of `operation` (e.g. "BUY_ORDER")
    fn report_failure(&self, operation: &str, detail: &str);

    /// Get the sink's name for debugging
    fn name(&self) -> &str {
        "FailureSink"
    }
}
