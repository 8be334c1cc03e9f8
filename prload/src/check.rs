//! Named assertions recorded against the running scenario
use crate::transaction::RUN_HOOK;
use prload_core::CheckSummary;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
#[allow(unused)]
use tracing::{debug, warn};

/// Record a named check for the current run and return `passed`.
///
/// A failing check is tallied in the run statistics; it never interrupts the scenario.
///
/// # Example
/// ```no_run
/// use prload::prelude::*;
///
/// #[scenario]
/// async fn my_scenario(ctx: VuContext) {
///     let status = 201;
///     check("created", status == 201);
/// }
/// ```
pub fn check(name: &str, passed: bool) -> bool {
    if RUN_HOOK
        .try_with(|hook| hook.checks.record(name, passed))
        .is_err()
    {
        warn!("Check `{name}` recorded outside of a running scenario.");
    }

    #[cfg(feature = "metrics")]
    {
        let counter = if passed {
            prload_core::CHECKS_PASSED
        } else {
            prload_core::CHECKS_FAILED
        };
        metrics::counter!(counter, "check" => name.to_string()).increment(1);
    }

    if !passed {
        debug!("Check `{name}` failed");
    }

    passed
}

#[derive(Default, Debug, Clone, Copy)]
struct Tally {
    passes: u64,
    fails: u64,
}

#[derive(Default, Debug)]
pub(crate) struct CheckRegistry {
    checks: Mutex<BTreeMap<String, Tally>>,
}

impl CheckRegistry {
    pub fn record(&self, name: &str, passed: bool) {
        let mut checks = self.checks.lock().unwrap_or_else(PoisonError::into_inner);

        let tally = checks.entry(name.to_string()).or_default();

        if passed {
            tally.passes += 1;
        } else {
            tally.fails += 1;
        }
    }

    pub fn summary(&self) -> Vec<CheckSummary> {
        self.checks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, tally)| CheckSummary {
                name: name.clone(),
                passes: tally.passes,
                fails: tally.fails,
            })
            .collect()
    }
}
