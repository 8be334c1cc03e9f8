use std::fmt;
use std::time::Duration;

/// Pass/fail tally for a single named check
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckSummary {
    pub name: String,
    pub passes: u64,
    pub fails: u64,
}

impl CheckSummary {
    pub fn total(&self) -> u64 {
        self.passes + self.fails
    }
}

/// Run Statistics for a given Scenario
#[derive(Clone, Debug)]
pub struct RunStatistics {
    pub name: String,
    pub vus: usize,
    pub elapsed: Duration,
    /// Iterations which ran to completion
    pub iterations: u64,
    /// Iterations still in flight when the graceful stop window closed
    pub interrupted_iterations: u64,
    pub transactions_ok: u64,
    pub transactions_err: u64,
    pub latency_p50: Duration,
    pub latency_p90: Duration,
    pub latency_p99: Duration,
    /// Checks sorted by name
    pub checks: Vec<CheckSummary>,
}

impl RunStatistics {
    pub fn check(&self, name: &str) -> Option<&CheckSummary> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// Ratio of passing checks across every check recorded in the run.
    ///
    /// A run which recorded no checks has nothing to fail and reports `1.0`.
    pub fn check_pass_rate(&self) -> f64 {
        let (passes, total) = self
            .checks
            .iter()
            .fold((0, 0), |(p, t), c| (p + c.passes, t + c.total()));

        if total == 0 {
            1.
        } else {
            passes as f64 / total as f64
        }
    }

    pub fn error_rate(&self) -> f64 {
        let total = self.transactions_ok + self.transactions_err;
        if total == 0 {
            0.
        } else {
            self.transactions_err as f64 / total as f64
        }
    }

    pub fn iterations_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0. {
            self.iterations as f64 / secs
        } else {
            0.
        }
    }

    /// Whether the check pass rate reaches `min_check_rate`.
    pub fn meets(&self, min_check_rate: f64) -> bool {
        self.check_pass_rate() >= min_check_rate
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "scenario {}: {} vus for {}",
            self.name,
            self.vus,
            humantime::format_duration(round_millis(self.elapsed))
        )?;
        writeln!(
            f,
            "  iterations.....: {} ({:.2}/s), interrupted {}",
            self.iterations,
            self.iterations_per_second(),
            self.interrupted_iterations
        )?;
        writeln!(
            f,
            "  transactions...: {} ok, {} failed ({:.2}% errors)",
            self.transactions_ok,
            self.transactions_err,
            self.error_rate() * 100.
        )?;
        writeln!(
            f,
            "  latency........: p50={:?} p90={:?} p99={:?}",
            self.latency_p50, self.latency_p90, self.latency_p99
        )?;
        write!(
            f,
            "  checks.........: {:.2}% passed",
            self.check_pass_rate() * 100.
        )?;
        for check in &self.checks {
            write!(
                f,
                "\n    {} {}: {} passed, {} failed",
                if check.fails == 0 { "✓" } else { "✗" },
                check.name,
                check.passes,
                check.fails
            )?;
        }
        Ok(())
    }
}

fn round_millis(dur: Duration) -> Duration {
    Duration::from_millis(dur.as_millis() as u64)
}
