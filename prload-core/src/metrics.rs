/// Metric names emitted for a single transaction function.
#[derive(Copy, Clone, Debug)]
pub struct TransactionLabels {
    pub success: &'static str,
    pub error: &'static str,
    pub latency: &'static str,
}

/// Counter incremented for every passing check, labelled with `check`.
pub const CHECKS_PASSED: &str = "checks_passed";

/// Counter incremented for every failing check, labelled with `check`.
pub const CHECKS_FAILED: &str = "checks_failed";

/// Counter incremented for every completed iteration.
pub const ITERATIONS: &str = "iterations";
